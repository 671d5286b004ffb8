//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Particle background simulator arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cosmos", about = "Headless particle background simulator")]
pub struct CliArgs {
    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// RNG seed for reproducible clouds.
    #[arg(long)]
    pub seed: Option<u64>,

    /// User agent string to classify.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Force a device class (desktop, mobile, legacy).
    #[arg(long)]
    pub device_class: Option<String>,

    /// Viewport width in CSS pixels.
    #[arg(long)]
    pub viewport_width: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(frames) = args.frames {
            self.simulation.frames = frames;
        }
        if let Some(seed) = args.seed {
            self.simulation.seed = Some(seed);
        }
        if let Some(ref ua) = args.user_agent {
            self.device.user_agent = ua.clone();
        }
        if let Some(ref class) = args.device_class {
            self.device.force_class = Some(class.clone());
        }
        if let Some(width) = args.viewport_width {
            self.display.viewport_width = width;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            frames: Some(30),
            seed: Some(7),
            device_class: Some("legacy".to_string()),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.simulation.frames, 30);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.device.force_class.as_deref(), Some("legacy"));
        // Non-overridden fields retain defaults
        assert_eq!(config.display.viewport_width, 1280);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from(["cosmos", "--frames", "90", "--viewport-width", "375"]);
        assert_eq!(args.frames, Some(90));
        assert_eq!(args.viewport_width, Some(375));
        assert!(args.user_agent.is_none());
    }
}
