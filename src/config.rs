//! Server configuration, loaded from TOML.
//!
//! Every field is optional:
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! template_dir = "templates"
//! debug = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory [`Templates`](crate::Templates) reads from.
    pub template_dir: PathBuf,
    /// Log one line per request.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
            template_dir: PathBuf::from("templates"),
            debug: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// `host:port`, ready for [`Server::bind`](crate::Server::bind).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "127.0.0.1:5000");
    }

    #[test]
    fn fields_override_defaults() {
        let config = Config::from_toml_str("port = 8080\ndebug = true\ntemplate_dir = \"views\"").unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.debug);
        assert_eq!(config.template_dir, PathBuf::from("views"));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(Config::from_toml_str("prot = 1"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml_str("port = \"x\""), Err(Error::Config(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        fs::write(&path, "host = \"0.0.0.0\"").unwrap();
        assert_eq!(Config::load(&path).unwrap().addr(), "0.0.0.0:5000");
        assert!(matches!(Config::load(dir.path().join("missing.toml")), Err(Error::Io(_))));
    }
}
