//! Configuration for the particle background host.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Unknown or missing fields fall back to defaults so older and newer
//! config files keep loading.

mod cli;
mod config;
mod error;
mod paths;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, DeviceConfig, DisplayConfig, PerformanceConfig, SimulationConfig,
};
pub use error::ConfigError;
pub use paths::AppDirs;
