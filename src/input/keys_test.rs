use std::collections::HashSet;

use evdev::KeyCode;

use crate::input::keys::{builtin, find_by_code, find_by_label, label_for, MAPPABLE_KEYS};

#[test]
fn test_table_is_unique() {
    let codes: HashSet<_> = MAPPABLE_KEYS.iter().map(|k| k.code).collect();
    let labels: HashSet<_> = MAPPABLE_KEYS.iter().map(|k| k.label).collect();
    assert_eq!(codes.len(), MAPPABLE_KEYS.len());
    assert_eq!(labels.len(), MAPPABLE_KEYS.len());
}

#[test]
fn test_grid_order() {
    assert_eq!(MAPPABLE_KEYS[0].code, KeyCode::KEY_A);
    assert_eq!(MAPPABLE_KEYS[9].label, "J");
    assert_eq!(MAPPABLE_KEYS[26].label, "1");
    assert_eq!(MAPPABLE_KEYS[35].label, "0");
    assert_eq!(MAPPABLE_KEYS[48].code, KeyCode::BTN_LEFT);
}

#[test]
fn test_lookups() {
    assert_eq!(find_by_label("spc").map(|k| k.code), Some(KeyCode::KEY_SPACE));
    assert_eq!(find_by_code(KeyCode::KEY_F1), None);
    assert_eq!(label_for(KeyCode::KEY_LEFTSHIFT), "Shft");
    assert_eq!(label_for(KeyCode::KEY_F1), "");
    assert_eq!(builtin(KeyCode::KEY_W).label, "W");
}
