use std::path::PathBuf;

use clap::Parser;

use crate::config::UploaderConfig;

/// Upload a static web UI build to a Flory device.
#[derive(Debug, Parser)]
#[command(name = "flory-upload", version, about)]
pub struct Cli {
    /// Folder (usually the `out/` export) or single file to upload.
    pub source: PathBuf,

    /// Device base URL.
    #[arg(long)]
    pub host: Option<String>,

    /// Attempts per file before giving up.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Pause between files.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Per-request timeout.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Keep existing files on the device instead of wiping first.
    #[arg(long)]
    pub no_wipe: bool,

    /// Do not restart the device afterwards.
    #[arg(long)]
    pub no_restart: bool,

    /// Leave the device's SD logger running during the upload.
    #[arg(long)]
    pub keep_logging: bool,

    /// Upload paths exactly as collected.
    #[arg(long, conflicts_with = "root_prefix")]
    pub no_root_prefix: bool,

    /// Directory name every uploaded path must start with.
    #[arg(long, value_name = "NAME")]
    pub root_prefix: Option<String>,

    /// List the files that would be uploaded and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective settings back to the config file.
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Overrides file settings with the flags that were given.
    pub fn apply(&self, config: &mut UploaderConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(delay) = self.delay_ms {
            config.delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = timeout;
        }
        if self.no_wipe {
            config.wipe_first = false;
        }
        if self.no_restart {
            config.restart_after = false;
        }
        if self.keep_logging {
            config.suppress_device_logging = false;
        }
        if self.no_root_prefix {
            config.ensure_root_prefix = false;
        }
        if let Some(prefix) = &self.root_prefix {
            config.ensure_root_prefix = true;
            config.root_prefix = prefix.clone();
        }
    }
}
