use assert_cmd::Command;
use predicates::prelude::*;

fn commanderize(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("commanderize").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_server_start_with_flags() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .args(["-addr=0.0.0.0", "-port=9000", "-timeout=1m30s", "Server:Start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("listening on 0.0.0.0:9000"))
        .stdout(predicate::str::contains("timeout 1m30s"))
        .stdout(predicate::str::contains("request logging").not());
}

#[test]
fn test_bare_bool_and_lowercase_token() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .args(["-verbose", "server:start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("listening on 127.0.0.1:8080"))
        .stdout(predicate::str::contains("request logging enabled"));
}

#[test]
fn test_client_ping_uses_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .args(["-retries", "-1", "Client:Ping"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "pinging 127.0.0.1:8080 with -1 retries (backoff x1.5, wait 0s)",
        ));
}

#[test]
fn test_missing_token_prints_usage() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("Attempts before giving up"))
        .stdout(predicate::str::contains("--token").not())
        .stderr(predicate::str::contains("No command given."));
}

#[test]
fn test_malformed_and_unknown_tokens() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .arg("Server")
        .assert()
        .failure()
        .stderr(predicate::str::contains("(Got: Server)"));

    commanderize(temp_dir.path())
        .arg("Proxy:Start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Command <Proxy> not found."));

    commanderize(temp_dir.path())
        .arg("Server:Stop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stop"));
}

#[test]
fn test_bad_flag_value_is_a_usage_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    commanderize(temp_dir.path())
        .args(["-port=eighty", "Server:Start"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("eighty"));
}

#[test]
fn test_namespaced_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("commanderize.json"),
        r#"{ "namespaced": true }"#,
    )
    .unwrap();

    commanderize(temp_dir.path())
        .args(["-server.port=1", "Server:Status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("server 127.0.0.1:1 verbose=false"));

    commanderize(temp_dir.path())
        .args(["-port=1", "Server:Status"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_broken_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("commanderize.json"), "not json").unwrap();

    commanderize(temp_dir.path())
        .arg("Server:Start")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
