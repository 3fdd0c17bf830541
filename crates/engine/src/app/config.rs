use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::rendering::effects::EffectKind;
use super::rendering::Color;

pub const CONFIG_ENV_VAR: &str = "ARCADE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "assets/config.json";
const DEFAULT_MAXIMUM_DELTA_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Engine-wide tunables. Built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Seconds.
    pub maximum_delta_time: f32,
    pub background_color: Color,
    pub cursor_radius: f32,
    pub cursor_speed: f32,
    pub cursor_color: Color,
    pub joystick_deadzone: f32,
    pub effects: Vec<EffectKind>,
    pub effects_enabled: bool,
    pub bloom_intensity: f32,
    pub hub_scene: String,
    pub focus_sleep_ms: u64,
    pub screenshot_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: "Arcade".to_string(),
            window_width: 1280,
            window_height: 720,
            maximum_delta_time: DEFAULT_MAXIMUM_DELTA_MS as f32 / 1000.0,
            background_color: [0, 0, 0, 255],
            cursor_radius: 6.0,
            cursor_speed: 500.0,
            cursor_color: [255, 255, 255, 255],
            joystick_deadzone: 0.2,
            effects: vec![EffectKind::Bloom, EffectKind::Monitor],
            effects_enabled: true,
            bloom_intensity: 0.6,
            hub_scene: "Menu".to_string(),
            focus_sleep_ms: 10,
            screenshot_dir: PathBuf::from("screenshots"),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `ARCADE_CONFIG` or `assets/config.json`; a missing file means defaults.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_or_default(&path)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config_missing_using_defaults");
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        info!(path = %path.display(), "config_loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid {
                field: "window_width/window_height",
                message: format!("{}x{} has no area", self.window_width, self.window_height),
            });
        }
        let representable = Duration::try_from_secs_f32(self.maximum_delta_time).is_ok();
        if !(self.maximum_delta_time > 0.0 && representable) {
            return Err(ConfigError::Invalid {
                field: "maximum_delta_time",
                message: format!("{} is not a positive number of seconds", self.maximum_delta_time),
            });
        }
        if !(0.0..1.0).contains(&self.joystick_deadzone) {
            return Err(ConfigError::Invalid {
                field: "joystick_deadzone",
                message: format!("{} is outside [0, 1)", self.joystick_deadzone),
            });
        }
        if self.hub_scene.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "hub_scene",
                message: "must name a registered scene".to_string(),
            });
        }
        Ok(())
    }

    /// Falls back to the default step for values `validate` would reject.
    pub fn maximum_delta(&self) -> Duration {
        Duration::try_from_secs_f32(self.maximum_delta_time)
            .ok()
            .filter(|delta| !delta.is_zero())
            .unwrap_or(Duration::from_millis(DEFAULT_MAXIMUM_DELTA_MS))
    }

    pub fn minimum_window_size(&self) -> (u32, u32) {
        ((self.window_width / 2).max(1), (self.window_height / 2).max(1))
    }

    pub fn focus_sleep(&self) -> Duration {
        Duration::from_millis(self.focus_sleep_ms)
    }
}
