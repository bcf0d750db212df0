use crate::error::{CommanderError, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

const CONFIG_FILENAME: &str = "commanderize.json";

/// Binding options, stored in commanderize.json
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct Options {
    /// Prefix every flag with its record's type name (`-server.port`)
    #[serde(default)]
    pub namespaced: bool,
}

impl Options {
    /// Flat flag names; same-named fields of different records collide.
    pub const DEFAULT: Options = Options { namespaced: false };

    pub fn namespaced() -> Self {
        Self { namespaced: true }
    }

    /// Reads `commanderize.json` from `dir`. A missing file means defaults;
    /// missing keys take their default values.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILENAME);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::DEFAULT),
            Err(e) => Err(CommanderError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_is_flat() {
        assert_eq!(Options::default(), Options::DEFAULT);
        assert!(!Options::DEFAULT.namespaced);
        assert!(Options::namespaced().namespaced);
    }

    #[test]
    fn load_missing_config() {
        let temp = TempDir::new().unwrap();
        let options = Options::load(temp.path()).unwrap();
        assert_eq!(options, Options::DEFAULT);
    }

    #[test]
    fn load_namespaced_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), r#"{ "namespaced": true }"#).unwrap();
        assert_eq!(Options::load(temp.path()).unwrap(), Options::namespaced());
    }

    #[test]
    fn config_path_that_is_a_directory_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(CONFIG_FILENAME)).unwrap();
        assert!(matches!(
            Options::load(temp.path()),
            Err(CommanderError::Io(_))
        ));
    }

    #[test]
    fn empty_object_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "{}").unwrap();
        assert_eq!(Options::load(temp.path()).unwrap(), Options::DEFAULT);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "{ namespaced: ").unwrap();
        assert!(matches!(
            Options::load(temp.path()),
            Err(CommanderError::Serialization(_))
        ));
    }
}
