use colored::Colorize;
use commanderize::value::format_duration;
use commanderize::{Commander, CommanderError, Options, Record, Result, behaviors};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => {}
        Err(CommanderError::Flags(e)) => e.exit(),
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let options = Options::load(&cwd)?;

    let mut server = Server::default();
    let mut client = Client::default();

    Commander::new(options)
        .command(&mut server)
        .command(&mut client)
        .run()
}

#[derive(Record)]
pub struct Server {
    #[cmd = "Address to bind"]
    pub addr: String,
    #[cmd = "Port to listen on"]
    pub port: u32,
    #[cmd = "Idle connection timeout"]
    pub timeout: Duration,
    #[cmd = "Log every request"]
    pub verbose: bool,
    #[cmd = "-"]
    pub token: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".to_string(),
            port: 8080,
            timeout: Duration::from_secs(30),
            verbose: false,
            token: String::new(),
        }
    }
}

#[behaviors]
impl Server {
    pub fn start(&mut self) {
        println!(
            "{} listening on {}:{} (timeout {})",
            "server".green(),
            self.addr,
            self.port,
            format_duration(self.timeout)
        );
        if self.verbose {
            println!("{} request logging enabled", "server".green());
        }
    }

    pub fn status(&self) {
        println!(
            "{} {}:{} verbose={}",
            "server".green(),
            self.addr,
            self.port,
            self.verbose
        );
    }
}

#[derive(Record)]
pub struct Client {
    #[cmd = "Server address to reach"]
    pub target: String,
    #[cmd = "Attempts before giving up"]
    pub retries: i64,
    #[cmd = "Backoff multiplier between attempts"]
    pub backoff: f64,
    #[cmd = "Wait before the first attempt"]
    pub wait: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:8080".to_string(),
            retries: 3,
            backoff: 1.5,
            wait: Duration::ZERO,
        }
    }
}

#[behaviors]
impl Client {
    pub fn ping(&self) {
        println!(
            "{} pinging {} with {} retries (backoff x{}, wait {})",
            "client".cyan(),
            self.target,
            self.retries,
            self.backoff,
            format_duration(self.wait)
        );
    }
}
