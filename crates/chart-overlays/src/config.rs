// File: crates/chart-overlays/src/config.rs
// Summary: Overlay configuration; every field optional in JSON, falling back to built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::overlays::{HeatmapOptions, VolumeProfileOptions, DEFAULT_PROFILE_WIDTH};
use crate::theme::{self, Theme};
use crate::tools::shape::ToolOptions;
use crate::tools::tooltip::DeltaTooltipOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Theme preset name; unknown names fall back to dark.
    pub theme: String,
    pub rectangle: ToolOptions,
    pub trend_line: ToolOptions,
    pub volume_profile: VolumeProfileOptions,
    /// Pixel width of the widest volume bar.
    pub profile_width: f32,
    pub profile_buckets: usize,
    pub heatmap: HeatmapOptions,
    pub tooltip: DeltaTooltipOptions,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            rectangle: ToolOptions::rectangle(),
            trend_line: ToolOptions::trend_line(),
            volume_profile: VolumeProfileOptions::default(),
            profile_width: DEFAULT_PROFILE_WIDTH,
            profile_buckets: 15,
            heatmap: HeatmapOptions::default(),
            tooltip: DeltaTooltipOptions::default(),
        }
    }
}

impl OverlayConfig {
    /// Overlay colors left out of the JSON follow the chosen theme.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let mut config: Self = serde_json::from_value(value.clone())?;
        let theme = config.theme();
        if value.get("volumeProfile").is_none() {
            config.volume_profile = VolumeProfileOptions::from_theme(&theme);
        }
        if value.get("heatmap").is_none() {
            config.heatmap = HeatmapOptions::from_theme(&theme);
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn theme(&self) -> Theme { theme::find(&self.theme) }
}
