//! Configuration file support for plotbooth.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/plotbooth/config.toml`. Settings include the plotter link, the
//! drawable area and draw timing, the capture workflow and the compute backend.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::PipelineMode;
pub use types::{
    CaptureConfig, DeviceConfig, DrawingConfig, PipelineSettings, RemoteConfig, SamplerConfig,
};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [device]
/// port = "/dev/ttyACM0"
///
/// [drawing]
/// width = 100.0
/// height = 100.0
/// draw_height = 125.0
///
/// [pipeline]
/// mode = "two-step"
/// countdown_seconds = 5
///
/// [remote]
/// base_url = "http://127.0.0.1:8000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
pub struct Config {
    /// Plotter link and servo settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Drawable area and draw timing
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Capture workflow (mode and countdown)
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Compute backend endpoints and parameters
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Snapshot source and archiving
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Handwriting sample collection
    #[serde(default)]
    pub sampler: SamplerConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `drawing.width` / `drawing.height` / `drawing.draw_height`: 10.0 - 1000.0
    /// - `drawing.settle_delay_ms` / `drawing.stroke_delay_ms`: 0 - 5000
    /// - `drawing.flatten_tolerance`: 0.01 - 5.0
    /// - `device.pen_up_pulse` / `device.pen_down_pulse`: 500 - 2500
    /// - `device.command_timeout_ms`: 100 - 60000
    /// - `pipeline.countdown_seconds`: 1 - 60
    /// - `remote.*line_width`: 1 - 500
    /// - `remote.request_timeout_secs`: 1 - 600
    pub(crate) fn validate_and_clamp(&mut self) {
        // Drawable area: 10.0 - 1000.0
        if !(10.0..=1000.0).contains(&self.drawing.width) {
            log::warn!(
                "Invalid drawing width {:.1}, clamping to 10.0-1000.0 range",
                self.drawing.width
            );
            self.drawing.width = self.drawing.width.clamp(10.0, 1000.0);
        }
        if !(10.0..=1000.0).contains(&self.drawing.height) {
            log::warn!(
                "Invalid drawing height {:.1}, clamping to 10.0-1000.0 range",
                self.drawing.height
            );
            self.drawing.height = self.drawing.height.clamp(10.0, 1000.0);
        }
        if !(10.0..=1000.0).contains(&self.drawing.draw_height) {
            log::warn!(
                "Invalid drawing draw_height {:.1}, clamping to 10.0-1000.0 range",
                self.drawing.draw_height
            );
            self.drawing.draw_height = self.drawing.draw_height.clamp(10.0, 1000.0);
        }
        if self.drawing.flip_y && self.drawing.height > self.drawing.draw_height {
            log::warn!(
                "Drawing height {:.1} exceeds draw_height {:.1}; flipped strokes will leave the page",
                self.drawing.height,
                self.drawing.draw_height
            );
        }

        if self.drawing.settle_delay_ms > 5000 {
            log::warn!(
                "Invalid settle_delay_ms {}, clamping to 0-5000 range",
                self.drawing.settle_delay_ms
            );
            self.drawing.settle_delay_ms = 5000;
        }
        if self.drawing.stroke_delay_ms > 5000 {
            log::warn!(
                "Invalid stroke_delay_ms {}, clamping to 0-5000 range",
                self.drawing.stroke_delay_ms
            );
            self.drawing.stroke_delay_ms = 5000;
        }

        if !(0.01..=5.0).contains(&self.drawing.flatten_tolerance) {
            log::warn!(
                "Invalid flatten_tolerance {:.3}, clamping to 0.01-5.0 range",
                self.drawing.flatten_tolerance
            );
            self.drawing.flatten_tolerance = self.drawing.flatten_tolerance.clamp(0.01, 5.0);
        }

        // Servo pulses: 500 - 2500
        for (name, pulse) in [
            ("pen_up_pulse", &mut self.device.pen_up_pulse),
            ("pen_down_pulse", &mut self.device.pen_down_pulse),
        ] {
            if !(500..=2500).contains(&*pulse) {
                log::warn!("Invalid {} {}, clamping to 500-2500 range", name, pulse);
                *pulse = (*pulse).clamp(500, 2500);
            }
        }
        if self.device.pen_up_pulse == self.device.pen_down_pulse {
            log::warn!(
                "pen_up_pulse and pen_down_pulse are both {}; the pen will never move",
                self.device.pen_up_pulse
            );
        }

        if !(100..=60_000).contains(&self.device.command_timeout_ms) {
            log::warn!(
                "Invalid command_timeout_ms {}, clamping to 100-60000 range",
                self.device.command_timeout_ms
            );
            self.device.command_timeout_ms = self.device.command_timeout_ms.clamp(100, 60_000);
        }

        if !(1..=60).contains(&self.pipeline.countdown_seconds) {
            log::warn!(
                "Invalid countdown_seconds {}, clamping to 1-60 range",
                self.pipeline.countdown_seconds
            );
            self.pipeline.countdown_seconds = self.pipeline.countdown_seconds.clamp(1, 60);
        }

        for (name, width) in [
            ("image_line_width", &mut self.remote.image_line_width),
            ("synthesis_line_width", &mut self.remote.synthesis_line_width),
        ] {
            if !(1..=500).contains(&*width) {
                log::warn!("Invalid {} {}, clamping to 1-500 range", name, width);
                *width = (*width).clamp(1, 500);
            }
        }

        if !(1..=600).contains(&self.remote.request_timeout_secs) {
            log::warn!(
                "Invalid request_timeout_secs {}, clamping to 1-600 range",
                self.remote.request_timeout_secs
            );
            self.remote.request_timeout_secs = self.remote.request_timeout_secs.clamp(1, 600);
        }

        if url::Url::parse(&self.remote.base_url).is_err() {
            log::warn!(
                "Invalid remote base_url '{}', falling back to '{}'",
                self.remote.base_url,
                types::default_base_url()
            );
            self.remote.base_url = types::default_base_url();
        }

        if self.capture.command.is_empty() && self.capture.still_image.is_none() {
            log::warn!("capture.command is empty and no still_image is set; snapshots will fail");
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/plotbooth/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("plotbooth");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file is missing.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to `config_path`, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Writes the documented example config to `config_path`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A config file already exists at the target path
    /// - The config directory cannot be created
    /// - The file cannot be written
    pub fn create_default_file(config_path: &Path) -> Result<()> {
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(config_path, default_config)?;

        info!("Created default config at {}", config_path.display());
        Ok(())
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.drawing.height, 100.0);
        assert_eq!(config.drawing.draw_height, 125.0);
        assert_eq!(config.pipeline.mode, PipelineMode::Direct);
        assert_eq!(config.remote.image_line_width, 52);
        assert_eq!(config.remote.synthesis_line_width, 70);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[pipeline]\nmode = \"two-step\"\n\n[device]\nport = \"/dev/ttyACM0\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pipeline.mode, PipelineMode::TwoStep);
        assert_eq!(config.device.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.device.pen_down_pulse, 1700);
        assert!(config.pipeline.countdown);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config = Config::default();
        config.drawing.height = 5000.0;
        config.device.pen_down_pulse = 9000;
        config.pipeline.countdown_seconds = 0;
        config.remote.base_url = "not a url".to_string();

        config.validate_and_clamp();

        assert_eq!(config.drawing.height, 1000.0);
        assert_eq!(config.device.pen_down_pulse, 2500);
        assert_eq!(config.pipeline.countdown_seconds, 1);
        assert_eq!(config.remote.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[drawing\nwidth = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn example_file_parses_and_save_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        Config::create_default_file(&path).unwrap();
        assert!(Config::create_default_file(&path).is_err());

        let loaded = Config::load_from(&path).unwrap();
        let copy = temp.path().join("copy.toml");
        loaded.save_to(&copy).unwrap();
        let reloaded = Config::load_from(&copy).unwrap();
        assert_eq!(reloaded.remote.base_url, loaded.remote.base_url);
        assert_eq!(reloaded.capture.command, loaded.capture.command);
    }

    #[test]
    fn schema_lists_top_level_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in ["device", "drawing", "pipeline", "remote", "capture", "sampler"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
