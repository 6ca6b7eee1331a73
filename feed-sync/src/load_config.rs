//! `load_config` module: builds the [`SyncConfig`] from the environment and an
//! optional YAML file.
//!
//! # Responsibilities
//! - Read non-secret settings (feed URL, collection id, API base, delay) from YAML when a path is given
//! - Let environment variables override the file; the API key comes from the environment only
//! - Fail before any network activity when a required value is missing
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.

use anyhow::{bail, Context, Result};
use feed_sync_core::config::{CmsConfig, SyncConfig, DEFAULT_API_BASE, DEFAULT_DELAY};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

pub const ENV_FEED_URL: &str = "RSS_URL";
pub const ENV_API_KEY: &str = "WEBFLOW_API_KEY";
pub const ENV_COLLECTION_ID: &str = "WEBFLOW_COLLECTION_ID";
pub const ENV_API_BASE: &str = "WEBFLOW_API_BASE";
pub const ENV_DELAY_SECS: &str = "SYNC_DELAY_SECS";

/// Static, secret-free settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub feed_url: Option<String>,
    pub collection_id: Option<String>,
    pub api_base: Option<String>,
    pub delay_secs: Option<u64>,
}

pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    let file = match path {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    // Checked in this order so the first missing one is reported.
    let api_key = required(env_var(ENV_API_KEY), ENV_API_KEY)?;
    let collection_id = required(env_var(ENV_COLLECTION_ID).or(file.collection_id), ENV_COLLECTION_ID)?;
    let feed_url = required(env_var(ENV_FEED_URL).or(file.feed_url), ENV_FEED_URL)?;

    let api_base = env_var(ENV_API_BASE)
        .or(file.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let delay = match env_var(ENV_DELAY_SECS) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(e) => {
                error!(error = ?e, raw = %raw, "SYNC_DELAY_SECS must be a whole number of seconds");
                bail!("{ENV_DELAY_SECS} must be a whole number of seconds: {e}");
            }
        },
        None => file.delay_secs.map(Duration::from_secs).unwrap_or(DEFAULT_DELAY),
    };

    let config = SyncConfig {
        feed_url,
        cms: CmsConfig {
            api_base,
            api_key,
            collection_id,
        },
        delay,
    };
    config.trace_loaded();
    Ok(config)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = fs::read_to_string(path).with_context(|| {
        error!(config_path = ?path, "Failed to read config file");
        format!("Failed to read config file {path:?}")
    })?;
    match serde_yaml::from_str::<FileConfig>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Unset and blank are the same thing here.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => {
            error!(var = name, "Required configuration missing");
            bail!("missing env var {name}")
        }
    }
}
