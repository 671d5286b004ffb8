//! Headless simulator for the particle background.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p cosmos-demo -- --frames 600 --seed 7` for a
//! reproducible run, or `--user-agent "<ua>"` to see which profile a device gets.

mod simulation;

use std::error::Error;

use clap::Parser;
use cosmos_config::{AppDirs, CliArgs, Config};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(config_dir) => AppDirs::with_config_dir(config_dir),
        None => AppDirs::resolve()?,
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let file_logging = cfg!(debug_assertions) || config.debug.log_to_file;
    cosmos_log::init_logging(Some(&dirs.log_dir), file_logging, Some(&config));

    match simulation::run(&config) {
        Ok(Some(summary)) => {
            info!(
                camera = ?summary.camera,
                uploads = summary.uploads,
                fps = ?summary.last_fps,
                trigger = ?summary.trigger,
                "Run complete"
            );
            Ok(())
        }
        Ok(None) => {
            info!("Particle background skipped for this device");
            Ok(())
        }
        Err(e) => {
            error!("Simulation failed: {e}");
            Err(e)
        }
    }
}
