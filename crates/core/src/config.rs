//! Configuration management
//!
//! The configuration is a JSON file holding the credentials and the bucket
//! every operation runs against. It is loaded once at startup and never
//! written back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Application directory name under the user config directory
const APP_DIR: &str = "s3h";

/// Connection settings for the bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Bucket all operations run against
    pub bucket_name: String,

    /// Custom endpoint URL for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Bucket lookup style: "auto", "path", or "dns"
    #[serde(default = "default_bucket_lookup")]
    pub bucket_lookup: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket_lookup() -> String {
    "auto".to_string()
}

impl Config {
    /// Create a configuration with required fields
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket_name: bucket_name.into(),
            endpoint: None,
            region: default_region(),
            bucket_lookup: default_bucket_lookup(),
        }
    }

    /// Whether requests should use path-style addressing
    pub fn force_path_style(&self) -> bool {
        match self.bucket_lookup.as_str() {
            "path" => true,
            "dns" => false,
            _ => self.endpoint.is_some(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(Error::Config("bucket_name cannot be empty".into()));
        }
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(Error::Config(
                "access_key and secret_key cannot be empty".into(),
            ));
        }
        if !matches!(self.bucket_lookup.as_str(), "auto" | "path" | "dns") {
            return Err(Error::Config(format!(
                "bucket_lookup must be one of auto, path, dns (got '{}')",
                self.bucket_lookup
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }
        Ok(())
    }
}

/// Configuration manager resolves and loads the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Resolve the configuration path
    ///
    /// An explicit path is used as-is. Otherwise `config.json` in the working
    /// directory wins, falling back to the user config directory.
    pub fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::with_path(path.to_path_buf());
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::with_path(local);
        }

        match dirs::config_dir() {
            Some(dir) => Self::with_path(dir.join(APP_DIR).join(DEFAULT_CONFIG_FILE)),
            None => Self::with_path(local),
        }
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing file is an error: there is no usable default bucket.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {}",
                self.config_path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!(
            path = %self.config_path.display(),
            bucket = %config.bucket_name,
            "Loaded configuration"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        std::fs::write(&config_path, content).unwrap();
        (ConfigManager::with_path(config_path), temp_dir)
    }

    #[test]
    fn test_load_minimal_config() {
        let (manager, _temp_dir) = write_config(
            r#"{"access_key": "AKID", "secret_key": "SECRET", "bucket_name": "photos"}"#,
        );
        let config = manager.load().unwrap();
        assert_eq!(config.access_key, "AKID");
        assert_eq!(config.bucket_name, "photos");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket_lookup, "auto");
        assert!(config.endpoint.is_none());
        assert!(!config.force_path_style());
    }

    #[test]
    fn test_load_with_endpoint() {
        let (manager, _temp_dir) = write_config(
            r#"{
                "access_key": "minioadmin",
                "secret_key": "minioadmin",
                "bucket_name": "data",
                "endpoint": "http://localhost:9000",
                "region": "eu-west-1"
            }"#,
        );
        let config = manager.load().unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.region, "eu-west-1");
        assert!(config.force_path_style());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("absent.json"));
        let err = manager.load().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_malformed_json() {
        let (manager, _temp_dir) = write_config("{ not json");
        assert!(matches!(manager.load().unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn test_missing_key() {
        let (manager, _temp_dir) = write_config(r#"{"access_key": "a", "secret_key": "b"}"#);
        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("bucket_name"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let (manager, _temp_dir) = write_config(
            r#"{"access_key": "a", "secret_key": "b", "bucket_name": "c", "endpoint": "not a url"}"#,
        );
        assert!(matches!(manager.load().unwrap_err(), Error::InvalidUrl(_)));
    }

    #[test]
    fn test_invalid_bucket_lookup() {
        let (manager, _temp_dir) = write_config(
            r#"{"access_key": "a", "secret_key": "b", "bucket_name": "c", "bucket_lookup": "vhost"}"#,
        );
        assert!(matches!(manager.load().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_dns_lookup_overrides_endpoint() {
        let mut config = Config::new("a", "b", "c");
        config.endpoint = Some("https://s3.example.com".into());
        config.bucket_lookup = "dns".into();
        assert!(!config.force_path_style());
    }

    #[test]
    fn test_locate_explicit_path() {
        let manager = ConfigManager::locate(Some(Path::new("/etc/s3h/custom.json")));
        assert_eq!(manager.config_path(), Path::new("/etc/s3h/custom.json"));
    }
}
