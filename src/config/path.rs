//! Module for searching for gamepad-overlay config files

use std::path::PathBuf;

use crate::constants::{CONFIG_FILE_NAME, PREFIX};

/// System-wide config directory used if no user config exists
const SYSTEM_CONFIG_PATH: &str = "/etc/gamepad-overlay";

/// Returns the candidate config files in load order.
/// E.g. ["~/.config/gamepad-overlay/config.yaml", "/etc/gamepad-overlay/config.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![];
    match xdg::BaseDirectories::with_prefix(PREFIX) {
        Ok(base_dirs) => paths.push(base_dirs.get_config_home().join(CONFIG_FILE_NAME)),
        Err(e) => log::warn!("Unable to determine XDG config home: {e}"),
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH).join(CONFIG_FILE_NAME));

    paths
}
