use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::net::{Ipv4Addr, SocketAddr};
use serde::Deserialize;

use crate::storage::local::LocalStorageConfig;

const LOCAL_CONFIG_PATH: &str = "./config.toml";

/// Loads the configuration.
///
/// An explicit path must exist. Without one, `./config.toml` is used
/// if present, otherwise the built-in defaults.
pub async fn load(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None if Path::new(LOCAL_CONFIG_PATH).is_file() => PathBuf::from(LOCAL_CONFIG_PATH),
        None => {
            tracing::info!("No config file found, using defaults");
            return Ok(Config::default());
        }
    };

    let data = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = from_str(&data)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

/// Parses a TOML configuration.
pub fn from_str(data: &str) -> Result<Config> {
    Ok(toml::from_str(data)?)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Socket address to listen on.
    #[serde(default = "default_listen_address")]
    pub listen: SocketAddr,
    /// Maximum accepted request body, in bytes.
    ///
    /// Unlimited if unset.
    #[serde(rename = "max-upload-size")]
    #[serde(default)]
    pub max_upload_size: Option<usize>,
    /// Storage.
    #[serde(default)]
    pub storage: StorageConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_address(),
            max_upload_size: None,
            storage: StorageConfig::default(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Local file storage.
    #[serde(rename = "local")]
    Local(LocalStorageConfig),
}
impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local(LocalStorageConfig::default())
    }
}

fn default_listen_address() -> SocketAddr {
    (Ipv4Addr::UNSPECIFIED, 8000).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = from_str("").unwrap();

        assert_eq!(config.listen, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.max_upload_size, None);

        let StorageConfig::Local(local) = config.storage;
        assert_eq!(local.path, PathBuf::from("received.jpg"));
        assert!(!local.atomic);
    }

    #[test]
    fn test_full_config() {
        let config = from_str(
            r#"
            listen = "127.0.0.1:9000"
            max-upload-size = 1048576

            [storage]
            type = "local"
            path = "/var/lib/filedrop/latest.bin"
            atomic = true
            "#,
        )
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.max_upload_size, Some(1024 * 1024));

        let StorageConfig::Local(local) = config.storage;
        assert_eq!(local.path, PathBuf::from("/var/lib/filedrop/latest.bin"));
        assert!(local.atomic);
    }

    #[test]
    fn test_unknown_fields() {
        assert!(from_str("port = 80").is_err());
        assert!(from_str("[storage]\ntype = \"s3\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = tokio_test::block_on(load(Some(PathBuf::from("/nonexistent/filedrop.toml"))));
        assert!(result.is_err());
    }
}
