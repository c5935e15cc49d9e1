//! Device URL construction from an explicit base URL.

use flory_protocol::{
    DEFAULT_DEVICE_BASE_URL, RESTART_PATH, SD_UPLOAD_PATH, SD_WIPE_PATH, SETTINGS_PATH,
    WIPE_FORCE_QUERY,
};

/// Errors produced when validating a device base URL.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid device URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Absolute URLs of the device endpoints used by the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    base: String,
}

impl Default for DeviceEndpoints {
    fn default() -> Self {
        Self {
            base: DEFAULT_DEVICE_BASE_URL.to_string(),
        }
    }
}

impl DeviceEndpoints {
    /// Builds endpoints from a base URL such as `http://flory.local`.
    ///
    /// A bare host (`192.168.0.27`) is taken as `http://`. Trailing
    /// slashes are dropped.
    pub fn new(base_url: &str) -> Result<Self, EndpointError> {
        let trimmed = base_url.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let invalid = |reason: String| EndpointError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = reqwest::Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".into()));
        }

        Ok(Self {
            base: candidate.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn upload(&self) -> String {
        format!("{}{SD_UPLOAD_PATH}", self.base)
    }

    pub fn wipe(&self) -> String {
        format!("{}{SD_WIPE_PATH}?{WIPE_FORCE_QUERY}", self.base)
    }

    pub fn settings(&self) -> String {
        format!("{}{SETTINGS_PATH}", self.base)
    }

    pub fn restart(&self) -> String {
        format!("{}{RESTART_PATH}", self.base)
    }
}
