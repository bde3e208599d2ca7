use std::env;
use std::error::Error;

use clap::Parser;

use crate::cli::Args;
use crate::config::Config;
use crate::input::manager::Manager;

mod cli;
mod config;
mod constants;
mod input;
mod overlay;
mod udev;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    let args = Args::parse();
    if cli::main_cli(&args)? {
        return Ok(());
    }

    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting gamepad-overlay v{}", VERSION);

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {e}");
            return Err(e.into());
        }
    };
    log::debug!("Loaded config: {config:?}");

    let mut manager = match Manager::new(&config, args.device_overrides()) {
        Ok(manager) => manager,
        Err(e) => {
            log::error!("Failed to start: {e}");
            return Err(e);
        }
    };
    if let Err(e) = manager.run().await {
        log::error!("Overlay stopped with error: {e}");
        return Err(e);
    }

    log::info!("gamepad-overlay stopped");

    Ok(())
}
