//! Device settings document served at `/api/settings`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Full settings document as returned by `GET /api/settings`.
///
/// Every field is optional because older firmware omits some of them.
/// Fields this crate does not know about are kept in `extra` so a
/// document can be read and written back without losing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_baseline: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_dry_raw: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_wet_raw: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watering_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_pwm_duty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_water_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone_start_hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone_end_hour: Option<u8>,
    /// Interval of the on-device SD logger. `0` disables logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_update_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ota_hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ota_password: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceSettings {
    /// Logging interval, treating a missing field as disabled.
    pub fn logging_interval(&self) -> u64 {
        self.logging_interval_ms.unwrap_or(0)
    }
}

/// Partial settings update for `POST /api/settings`.
///
/// Only the fields that are set are serialized; the device leaves the
/// rest of its configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_interval_ms: Option<u64>,
}

impl SettingsPatch {
    /// Patch that only changes the logger interval.
    pub fn logging_interval(interval_ms: u64) -> Self {
        Self {
            logging_interval_ms: Some(interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_firmware_document() {
        let json = r#"{
            "soilBaseline": 1200,
            "wateringThreshold": 35,
            "pumpDurationMs": 4000,
            "autoWaterEnabled": true,
            "loggingIntervalMs": 60000,
            "otaHostname": "flory"
        }"#;
        let settings: DeviceSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.logging_interval(), 60000);
        assert_eq!(settings.watering_threshold, Some(35));
        assert_eq!(settings.auto_water_enabled, Some(true));
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn missing_interval_reads_as_disabled() {
        let settings: DeviceSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.logging_interval(), 0);
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let json = r#"{"loggingIntervalMs":0,"waterMapVersion":3}"#;
        let settings: DeviceSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.extra.get("waterMapVersion"), Some(&Value::from(3)));

        let out = serde_json::to_value(&settings).unwrap();
        assert_eq!(out["waterMapVersion"], 3);
        assert_eq!(out["loggingIntervalMs"], 0);
    }

    #[test]
    fn patch_serializes_only_changed_fields() {
        let patch = SettingsPatch::logging_interval(0);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"loggingIntervalMs":0}"#
        );
        assert_eq!(serde_json::to_string(&SettingsPatch::default()).unwrap(), "{}");
    }
}
