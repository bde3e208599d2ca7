pub mod devices;
pub mod keys;

use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::input::manager::DeviceOverrides;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a config file to use instead of the default search path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Touchscreen event device to use (e.g. /dev/input/event2)
    #[arg(long, short)]
    pub touchscreen: Option<PathBuf>,
    /// Start in landscape orientation
    #[arg(long, short)]
    pub landscape: bool,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the overlay (default)
    Run,
    /// List the keys widgets can be mapped to
    Keys,
    /// List input devices and what they can be used for
    Devices,
}

impl Args {
    pub fn device_overrides(&self) -> DeviceOverrides {
        DeviceOverrides {
            touchscreen: self.touchscreen.clone(),
            landscape: self.landscape,
        }
    }
}

/// Handle informational subcommands. Returns false if the overlay itself
/// should run.
pub fn main_cli(args: &Args) -> Result<bool, Box<dyn Error>> {
    match args.cmd {
        None | Some(Commands::Run) => return Ok(false),
        Some(Commands::Keys) => keys::handle_keys(),
        Some(Commands::Devices) => devices::handle_devices()?,
    }

    Ok(true)
}
