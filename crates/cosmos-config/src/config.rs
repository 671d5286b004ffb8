//! Configuration structs with defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration for the background host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Viewport the background is drawn into.
    pub display: DisplayConfig,
    /// Device description used to choose a profile.
    pub device: DeviceConfig,
    /// Simulation run settings.
    pub simulation: SimulationConfig,
    /// Adaptive quality thresholds.
    pub performance: PerformanceConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Viewport width in CSS pixels.
    pub viewport_width: u32,
    /// Viewport height in CSS pixels.
    pub viewport_height: u32,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f32,
}

/// Device configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Browser user agent string to classify.
    pub user_agent: String,
    /// Logical CPU count reported by the browser.
    pub hardware_concurrency: u32,
    /// Skip detection and use this class ("desktop", "mobile", "legacy").
    pub force_class: Option<String>,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of frames to run.
    pub frames: u32,
    /// RNG seed; a random seed is used when absent.
    pub seed: Option<u64>,
    /// Nebula vertical motion ("drift" or "anchored").
    pub nebula_motion: String,
    /// Frame at which to trigger a cosmic burst.
    pub burst_at_frame: Option<u32>,
    /// Amplitude in pixels of the synthetic pointer sweep.
    pub pointer_sweep: f32,
}

/// Adaptive quality configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Frame rates below this trigger optimization.
    pub low_fps_threshold: u32,
    /// Heap usage in megabytes above which optimization triggers.
    pub memory_limit_mb: f64,
    /// Viewports narrower than this hide the heavier background layers.
    pub narrow_viewport_width: u32,
    /// Heap usage sample to report during the run.
    pub simulated_memory_mb: Option<f64>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/126.0 Safari/537.36"
                .to_string(),
            hardware_concurrency: 8,
            force_class: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            seed: None,
            nebula_motion: "drift".to_string(),
            burst_at_frame: None,
            pointer_sweep: 400.0,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            low_fps_threshold: 30,
            memory_limit_mb: 100.0,
            narrow_viewport_width: 768,
            simulated_memory_mb: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl DisplayConfig {
    /// Whether the viewport is narrower than `threshold` pixels.
    pub fn is_narrow(&self, threshold: u32) -> bool {
        self.viewport_width < threshold
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("viewport_width: 1280"));
        assert!(ron_str.contains("low_fps_threshold: 30"));
        assert!(ron_str.contains("nebula_motion: \"drift\""));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(display: (viewport_width: 640))").unwrap();
        assert_eq!(config.display.viewport_width, 640);
        assert_eq!(config.display.viewport_height, 720);
        assert_eq!(config.performance, PerformanceConfig::default());
    }

    #[test]
    fn test_optional_fields_parse() {
        let config: Config =
            ron::from_str("(simulation: (seed: Some(42), burst_at_frame: Some(120)))").unwrap();
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.burst_at_frame, Some(120));
        assert_eq!(config.simulation.frames, 600);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_narrow_viewport() {
        let mut display = DisplayConfig::default();
        assert!(!display.is_narrow(768));
        display.viewport_width = 767;
        assert!(display.is_narrow(768));
        display.viewport_width = 768;
        assert!(!display.is_narrow(768), "threshold itself is not narrow");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.display.viewport_width = 390;
        config.device.force_class = Some("mobile".to_string());
        config.performance.simulated_memory_mb = Some(120.5);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.simulation.frames = 1200;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.simulation.frames), Some(1200));
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
