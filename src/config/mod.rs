//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::canvas::render::DEFAULT_RENDER_EVERY_N_POINTS;
use crate::canvas::snapshot::{DEFAULT_CROP_PADDING, DEFAULT_MIN_CROP_SIZE, DEFAULT_STROKE_WIDTH};
use crate::canvas::ExportOptions;
use crate::recognition::{ModelKind, RecognitionConfig};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Recognition settings sent with every request
    #[serde(default)]
    pub recognition: ModelSettings,
    /// Drawing canvas settings
    #[serde(default)]
    pub canvas: CanvasSettings,
}

impl AppConfig {
    /// Snapshot of the options a recognition request is sent with
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            enhance_image: self.recognition.enhance_image,
            post_process: self.recognition.post_process,
            model: self.recognition.selected_model,
        }
    }
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Base URL of the recognition service
    pub server_url: String,
    /// Keep a local copy of every recognized image
    pub keep_diagnostic_copies: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            keep_diagnostic_copies: true,
        }
    }
}

/// Model selection and processing flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSettings {
    pub selected_model: ModelKind,
    pub enhance_image: bool,
    pub post_process: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            selected_model: ModelKind::Cnn,
            enhance_image: true,
            post_process: true,
        }
    }
}

/// Drawing canvas settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Margin around the ink before cropping
    pub crop_padding: f32,
    /// Smaller padded regions export the whole canvas
    pub min_crop_size: f32,
    pub stroke_width: f32,
    /// Redraw the in-progress stroke every N samples
    pub render_every_n_points: usize,
    /// Canvas height in points
    pub height: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            crop_padding: DEFAULT_CROP_PADDING,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            render_every_n_points: DEFAULT_RENDER_EVERY_N_POINTS,
            height: 300.0,
        }
    }
}

impl CanvasSettings {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            padding: self.crop_padding,
            min_crop_size: self.min_crop_size,
            stroke_width: self.stroke_width,
            ..ExportOptions::default()
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
