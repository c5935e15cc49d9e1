/// Base URL the device answers on when mDNS is available on the LAN.
pub const DEFAULT_DEVICE_BASE_URL: &str = "http://flory.local";

/// Multipart upload into the hosted web-app directory on the SD card.
pub const SD_UPLOAD_PATH: &str = "/sd/upload";

/// Recursive delete of the hosted web-app directory.
pub const SD_WIPE_PATH: &str = "/sd/wipe";

/// Query string the wipe handler requires before it deletes anything.
pub const WIPE_FORCE_QUERY: &str = "force=1";

/// Device configuration document (GET reads, POST merges a partial object).
pub const SETTINGS_PATH: &str = "/api/settings";

/// Reboots the device. The response is usually cut short by the reboot.
pub const RESTART_PATH: &str = "/api/restart";

/// Name of the multipart part that carries the file bytes.
///
/// The part's `filename` parameter is the destination path relative to
/// the SD web root.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// Text field repeating the destination path for handlers that read it
/// separately from the part filename.
pub const PATH_FIELD: &str = "path";
