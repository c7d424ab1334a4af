// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration for bento-mirror.
//!
//! Settings are read from `~/.bento-mirror/config.json`. The file is optional
//! and every field has a default, so a partial file only overrides what it
//! names:
//!
//! ```json
//! {
//!   "destination": "/srv/boxes",
//!   "boxes": [{ "os": "centos", "requirement": "~> 7.0" }]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Public bucket the boxes are published to.
pub const DEFAULT_BUCKET_URL: &str = "http://opscode-vm-bento.s3.amazonaws.com";

const CONFIG_DIR_NAME: &str = ".bento-mirror";
const CONFIG_FILE_NAME: &str = "config.json";

/// One row of the box registry: an OS and a version requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub os: String,
    #[serde(default)]
    pub requirement: String,
}

impl BoxSpec {
    pub fn new(os: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            requirement: requirement.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bucket endpoint serving both the listing and the boxes
    #[serde(default = "default_bucket_url")]
    pub bucket_url: String,
    /// Local root; each box is stored at `<destination>/<key>`
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// Registry of boxes to keep in sync
    #[serde(default = "default_boxes")]
    pub boxes: Vec<BoxSpec>,
    /// TCP connect timeout for listing and transfers (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_url: default_bucket_url(),
            destination: default_destination(),
            boxes: default_boxes(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_bucket_url() -> String {
    DEFAULT_BUCKET_URL.to_string()
}

fn default_destination() -> PathBuf {
    PathBuf::from(".")
}

fn default_boxes() -> Vec<BoxSpec> {
    vec![
        BoxSpec::new("centos", "~> 5.0"),
        BoxSpec::new("centos", "~> 6.0"),
        BoxSpec::new("centos", "~> 7.0"),
        BoxSpec::new("ubuntu", "14.04"),
        BoxSpec::new("debian", "~> 7.0"),
    ]
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Blocking HTTP client shared by the listing and the transfers.
    ///
    /// Only the connect phase is bounded; box downloads can take a long time.
    pub fn http_client(&self) -> reqwest::Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(None::<Duration>)
            .user_agent(concat!("bento-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

/// `~/.bento-mirror/config.json`, if a home directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the configuration from the default location, falling back to
/// defaults when there is no file.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bucket_url, DEFAULT_BUCKET_URL);
        assert_eq!(config.destination, PathBuf::from("."));
        assert_eq!(config.boxes.len(), 5);
        assert_eq!(config.boxes[3], BoxSpec::new("ubuntu", "14.04"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"destination": "/srv/boxes", "boxes": [{"os": "centos", "requirement": "~> 7.0"}]}"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.destination, PathBuf::from("/srv/boxes"));
        assert_eq!(config.boxes, vec![BoxSpec::new("centos", "~> 7.0")]);
        assert_eq!(config.bucket_url, DEFAULT_BUCKET_URL);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn test_http_client_builds() {
        assert!(Config::default().http_client().is_ok());
    }
}
