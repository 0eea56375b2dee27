//! Layer configuration.
//!
//! Defaults match a stock Solr heatmap layer: facet on `geo` over all
//! documents, green to red ramp at half opacity, 10px blur, linear curve.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use heatmap_common::{HeatmapError, HeatmapResult};
use renderer::{ColorRamp, InterpolationMethod, RenderOptions};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Spatial field to facet on
    pub field: String,

    /// Extra request parameters (`q`, `fq`, ...)
    pub query: BTreeMap<String, String>,

    /// Blur radius in pixels
    pub blur: f64,

    /// Layer opacity in [0, 1]
    pub opacity: f64,

    /// Ramp start and end as hex strings
    pub colors: [String; 2],

    /// Interpolation method name: `linear` (`lin`), `exp` or `log`
    pub interp: String,

    /// Quiet period after the last viewport change before fetching
    pub debounce_ms: u64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        let mut query = BTreeMap::new();
        query.insert("q".to_string(), "*:*".to_string());

        Self {
            field: "geo".to_string(),
            query,
            blur: 10.0,
            opacity: 0.5,
            colors: ["00ff00".to_string(), "ff0000".to_string()],
            interp: "linear".to_string(),
            debounce_ms: 200,
        }
    }
}

impl LayerConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HeatmapError::InvalidConfig(format!("invalid layer config: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HeatmapError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Defaults overlaid with `HEATMAP_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (keyed by `HEATMAP_*` variable name).
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HEATMAP_FIELD") {
            self.field = val;
        }

        if let Some(val) = lookup("HEATMAP_BLUR") {
            match val.parse() {
                Ok(blur) => self.blur = blur,
                Err(_) => warn!(value = %val, "Ignoring unparseable HEATMAP_BLUR"),
            }
        }

        if let Some(val) = lookup("HEATMAP_OPACITY") {
            match val.parse() {
                Ok(opacity) => self.opacity = opacity,
                Err(_) => warn!(value = %val, "Ignoring unparseable HEATMAP_OPACITY"),
            }
        }

        if let Some(val) = lookup("HEATMAP_COLORS") {
            match val.split_once(',') {
                Some((start, end)) => {
                    self.colors = [start.trim().to_string(), end.trim().to_string()];
                }
                None => warn!(value = %val, "HEATMAP_COLORS needs two comma-separated colors"),
            }
        }

        if let Some(val) = lookup("HEATMAP_INTERP") {
            self.interp = val;
        }

        if let Some(val) = lookup("HEATMAP_DEBOUNCE_MS") {
            match val.parse() {
                Ok(ms) => self.debounce_ms = ms,
                Err(_) => warn!(value = %val, "Ignoring unparseable HEATMAP_DEBOUNCE_MS"),
            }
        }

        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Resolve the ramp and curve into renderer options.
    pub fn style(&self) -> HeatmapResult<RenderOptions> {
        let ramp = ColorRamp::from_hex(&self.colors[0], &self.colors[1])?;
        let method: InterpolationMethod = self.interp.parse()?;

        Ok(RenderOptions {
            ramp,
            method,
            opacity: self.opacity,
            blur_px: self.blur,
        })
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        if self.field.trim().is_empty() {
            return Err(HeatmapError::InvalidConfig("field must not be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(HeatmapError::InvalidConfig(format!(
                "opacity must be in [0, 1], got {}",
                self.opacity
            )));
        }

        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(HeatmapError::InvalidConfig(format!(
                "blur must be a non-negative number of pixels, got {}",
                self.blur
            )));
        }

        self.style().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayerConfig::default();
        assert_eq!(config.field, "geo");
        assert_eq!(config.query.get("q").map(String::as_str), Some("*:*"));
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlay_ignores_bad_numbers() {
        let config = LayerConfig::default().overlay(|key| match key {
            "HEATMAP_BLUR" => Some("lots".to_string()),
            "HEATMAP_OPACITY" => Some("0.8".to_string()),
            _ => None,
        });
        assert_eq!(config.blur, 10.0);
        assert_eq!(config.opacity, 0.8);
    }
}
