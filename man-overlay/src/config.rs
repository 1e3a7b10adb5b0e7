use crate::color_domain::RampVariant;
use crate::interaction::DOUBLE_CLICK_WINDOW_MS;
use anyhow::Context;
use man_core::filter::DEFAULT_MEASUREMENT_TYPE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub double_click_window_ms: u64,
    pub ramp: RampVariant,
    pub marker_radius: f64,
    pub highlight_radius: f64,
    pub idle_fill_opacity: f64,
    pub dimmed_opacity: f64,
    pub default_measurement_type: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            double_click_window_ms: DOUBLE_CLICK_WINDOW_MS,
            ramp: RampVariant::SevenStop,
            marker_radius: 4.0,
            highlight_radius: 8.0,
            idle_fill_opacity: 0.9,
            dimmed_opacity: 0.3,
            default_measurement_type: DEFAULT_MEASUREMENT_TYPE.to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config =
            OverlayConfig::from_json(r#"{"ramp": "six_stop", "double_click_window_ms": 500}"#)
                .unwrap();
        assert_eq!(config.ramp, RampVariant::SixStop);
        assert_eq!(config.double_click_window_ms, 500);
        assert_eq!(config.highlight_radius, 8.0);
        assert_eq!(config.default_measurement_type, "aod_500nm");
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(OverlayConfig::from_json("{}").unwrap(), OverlayConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(OverlayConfig::load(Path::new("/nonexistent/overlay.json")).is_err());
    }
}
