fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use flory_protocol::{DeviceSettings, SettingsPatch};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    fn read_fixture(name: &str) -> Value {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name);
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("{} is not JSON: {e}", path.display()))
    }

    /// Rewrites every number as f64 so `1500` and `1500.0` compare equal.
    ///
    /// ArduinoJson prints whole floats without a fraction.
    fn canonical(value: Value) -> Value {
        match value {
            Value::Number(n) => n.as_f64().map_or(Value::Number(n), |f| serde_json::json!(f)),
            Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, v)| (key, canonical(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Parses a device fixture as `T`, writes it back and requires the
    /// same document to come out.
    fn assert_roundtrip<T: DeserializeOwned + Serialize>(name: &str) -> T {
        let original = read_fixture(name);
        let parsed: T = serde_json::from_value(original.clone())
            .unwrap_or_else(|e| panic!("{name}: cannot parse: {e}"));
        let written = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("{name}: cannot serialize: {e}"));

        assert_eq!(
            canonical(original.clone()),
            canonical(written.clone()),
            "{name} changed in a round trip\n  device: {original}\n  ours:   {written}"
        );
        parsed
    }

    #[test]
    fn fixture_settings_full() {
        let settings = assert_roundtrip::<DeviceSettings>("settings_full.json");
        assert_eq!(settings.logging_interval(), 60000);
        assert_eq!(settings.deadzone_start_hour, Some(22));
        assert_eq!(settings.ota_hostname.as_deref(), Some("flory"));
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn fixture_settings_unknown_fields_survive() {
        let settings = assert_roundtrip::<DeviceSettings>("settings_unknown_fields.json");
        assert_eq!(settings.logging_interval(), 0);
        assert_eq!(settings.extra.len(), 3);
        assert!(settings.extra.contains_key("wifiSsid"));
    }

    #[test]
    fn fixture_settings_patch() {
        let patch = assert_roundtrip::<SettingsPatch>("settings_patch.json");
        assert_eq!(patch, SettingsPatch::logging_interval(0));
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let value = serde_json::to_value(SettingsPatch::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
