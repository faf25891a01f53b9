use std::{env, path::PathBuf};

use thiserror::Error;

pub const DEFAULT_MANIFEST_PATH: &str = "server.json";

/// Process bootstrap settings.
///
/// Only [`Config::from_env`] reads the environment, and only `main` calls it.
/// The registry, dispatcher and transport receive the manifest path through their
/// constructors and never consult environment variables themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub manifest_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_SERVER_MANIFEST must not be empty when set")]
    EmptyManifestPath,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let manifest_path = match env::var("MCP_SERVER_MANIFEST") {
            Ok(value) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(ConfigError::EmptyManifestPath);
                }
                PathBuf::from(value)
            }
            Err(_) => PathBuf::from(DEFAULT_MANIFEST_PATH),
        };

        Ok(Self { manifest_path })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}
