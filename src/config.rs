//! Engine configuration

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::BoxType;

/// Engine tunables persisted between sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest box edge in normalized units; draws below this are discarded
    /// and resizes cannot shrink past it
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,
    /// Delay before a pending load surfaces the loading indicator
    #[serde(default = "default_loading_delay_ms")]
    pub loading_delay_ms: u64,
    /// Category for newly drawn boxes
    #[serde(default)]
    pub default_draw_type: BoxType,
    /// Cap on detector candidates ingested per page
    #[serde(default = "default_max_boxes")]
    pub max_boxes: usize,
}

fn default_min_box_size() -> f32 {
    0.01
}

fn default_loading_delay_ms() -> u64 {
    100
}

fn default_max_boxes() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_box_size: default_min_box_size(),
            loading_delay_ms: default_loading_delay_ms(),
            default_draw_type: BoxType::default(),
            max_boxes: default_max_boxes(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, or fall back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing config {}", path.display()))
    }
}
