use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::input::keys::MAPPABLE_KEYS;

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "#")]
    index: usize,
    label: &'static str,
    #[tabled(rename = "Key Code")]
    code: String,
}

pub fn handle_keys() {
    let rows: Vec<KeyRow> = MAPPABLE_KEYS
        .iter()
        .enumerate()
        .map(|(index, key)| KeyRow {
            index,
            label: key.label,
            code: format!("{:?}", key.code),
        })
        .collect();
    let count = rows.len();

    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Mappable Keys"));
    println!("{table}");
    println!("{count} key(s) can be assigned to widgets");
}
