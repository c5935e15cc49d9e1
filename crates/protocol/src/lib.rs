//! HTTP contract of the Flory irrigation device.
//!
//! Only the parts of the device API that the uploader depends on are
//! modelled here: endpoint paths, the multipart field names accepted by
//! the SD upload handler, and the settings JSON document.

pub mod constants;
pub mod settings;

pub use constants::{
    DEFAULT_DEVICE_BASE_URL, PATH_FIELD, RESTART_PATH, SD_UPLOAD_PATH, SD_WIPE_PATH,
    SETTINGS_PATH, UPLOAD_FILE_FIELD, WIPE_FORCE_QUERY,
};
pub use settings::{DeviceSettings, SettingsPatch};
