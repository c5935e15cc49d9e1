//! Uploader configuration management.
//!
//! Configuration is stored as TOML:
//! - Unix: `$XDG_CONFIG_HOME/flory/uploader.toml`, else `~/.config/flory/uploader.toml`
//! - Windows: `%APPDATA%/flory/uploader.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use flory_deploy::UploadOptions;
use flory_protocol::DEFAULT_DEVICE_BASE_URL;
use flory_transfer::CollectOptions;
use serde::{Deserialize, Serialize};

/// Uploader configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// Device base URL.
    pub host: String,
    /// Attempts per file.
    pub retries: u32,
    /// Pause between files, in milliseconds.
    pub delay_ms: u64,
    /// Per-request timeout, in milliseconds.
    pub timeout_ms: u64,
    /// First retry backoff; retry `n` waits `n` times this.
    pub retry_base_delay_ms: u64,
    pub wipe_first: bool,
    pub restart_after: bool,
    /// Pause the device's SD logger while uploading.
    pub suppress_device_logging: bool,
    pub ensure_root_prefix: bool,
    pub root_prefix: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        let upload = UploadOptions::default();
        let collect = CollectOptions::default();
        Self {
            host: DEFAULT_DEVICE_BASE_URL.into(),
            retries: upload.max_attempts,
            delay_ms: millis(upload.inter_file_delay),
            timeout_ms: millis(upload.request_timeout),
            retry_base_delay_ms: millis(upload.retry_base_delay),
            wipe_first: upload.wipe_first,
            restart_after: upload.restart_after,
            suppress_device_logging: upload.suppress_device_logging,
            ensure_root_prefix: collect.ensure_root_prefix,
            root_prefix: collect.root_prefix,
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}

impl UploaderConfig {
    /// Loads configuration from `path`, or the platform default.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: UploaderConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Saves the configuration to `path`, or the platform default.
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(path)
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            max_attempts: self.retries.max(1),
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
            inter_file_delay: Duration::from_millis(self.delay_ms),
            request_timeout: Duration::from_millis(self.timeout_ms),
            wipe_first: self.wipe_first,
            suppress_device_logging: self.suppress_device_logging,
            restart_after: self.restart_after,
            ..UploadOptions::default()
        }
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            ensure_root_prefix: self.ensure_root_prefix,
            root_prefix: self.root_prefix.clone(),
            ..CollectOptions::default()
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    };
    let base = base.context("no config directory: neither HOME nor APPDATA is set")?;
    Ok(base.join("flory").join("uploader.toml"))
}
