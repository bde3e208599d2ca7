use std::error::Error;

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::udev::discover_input_devices;

#[derive(Tabled)]
struct InputDeviceRow {
    path: String,
    name: String,
    roles: String,
}

pub fn handle_devices() -> Result<(), Box<dyn Error>> {
    let devices = discover_input_devices()?;
    let rows: Vec<InputDeviceRow> = devices
        .into_iter()
        .filter(|d| !d.roles.is_empty())
        .map(|d| InputDeviceRow {
            path: d.devnode.display().to_string(),
            name: d.name,
            roles: d.roles.describe(),
        })
        .collect();
    let count = rows.len();

    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Input Devices"));
    println!("{table}");
    println!("Found {count} usable device(s)");

    Ok(())
}
