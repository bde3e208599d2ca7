//! Keys that widgets can be mapped to, with the short labels shown on the
//! overlay and in the key selection grid.

#[cfg(test)]
#[path = "keys_test.rs"]
pub mod keys_test;

use evdev::KeyCode;

/// A key that can be assigned to a widget action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappableKey {
    pub code: KeyCode,
    pub label: &'static str,
}

const fn key(code: KeyCode, label: &'static str) -> MappableKey {
    MappableKey { code, label }
}

/// Every key offered by the key selection grid, in grid order
pub const MAPPABLE_KEYS: [MappableKey; 50] = [
    key(KeyCode::KEY_A, "A"),
    key(KeyCode::KEY_B, "B"),
    key(KeyCode::KEY_C, "C"),
    key(KeyCode::KEY_D, "D"),
    key(KeyCode::KEY_E, "E"),
    key(KeyCode::KEY_F, "F"),
    key(KeyCode::KEY_G, "G"),
    key(KeyCode::KEY_H, "H"),
    key(KeyCode::KEY_I, "I"),
    key(KeyCode::KEY_J, "J"),
    key(KeyCode::KEY_K, "K"),
    key(KeyCode::KEY_L, "L"),
    key(KeyCode::KEY_M, "M"),
    key(KeyCode::KEY_N, "N"),
    key(KeyCode::KEY_O, "O"),
    key(KeyCode::KEY_P, "P"),
    key(KeyCode::KEY_Q, "Q"),
    key(KeyCode::KEY_R, "R"),
    key(KeyCode::KEY_S, "S"),
    key(KeyCode::KEY_T, "T"),
    key(KeyCode::KEY_U, "U"),
    key(KeyCode::KEY_V, "V"),
    key(KeyCode::KEY_W, "W"),
    key(KeyCode::KEY_X, "X"),
    key(KeyCode::KEY_Y, "Y"),
    key(KeyCode::KEY_Z, "Z"),
    key(KeyCode::KEY_1, "1"),
    key(KeyCode::KEY_2, "2"),
    key(KeyCode::KEY_3, "3"),
    key(KeyCode::KEY_4, "4"),
    key(KeyCode::KEY_5, "5"),
    key(KeyCode::KEY_6, "6"),
    key(KeyCode::KEY_7, "7"),
    key(KeyCode::KEY_8, "8"),
    key(KeyCode::KEY_9, "9"),
    key(KeyCode::KEY_0, "0"),
    key(KeyCode::KEY_ESC, "Esc"),
    key(KeyCode::KEY_SPACE, "Spc"),
    key(KeyCode::KEY_ENTER, "Ent"),
    key(KeyCode::KEY_BACKSPACE, "Bk"),
    key(KeyCode::KEY_TAB, "Tab"),
    key(KeyCode::KEY_LEFTCTRL, "Ctrl"),
    key(KeyCode::KEY_LEFTSHIFT, "Shft"),
    key(KeyCode::KEY_LEFTALT, "Alt"),
    key(KeyCode::KEY_UP, "Up"),
    key(KeyCode::KEY_DOWN, "Dn"),
    key(KeyCode::KEY_LEFT, "Lt"),
    key(KeyCode::KEY_RIGHT, "Rt"),
    key(KeyCode::BTN_LEFT, "LMB"),
    key(KeyCode::BTN_RIGHT, "RMB"),
];

/// Keys the virtual device must advertise besides [MAPPABLE_KEYS]: the
/// trackpad click and the forwarded hardware volume keys.
pub const EXTRA_KEYS: [KeyCode; 4] = [
    KeyCode::BTN_LEFT,
    KeyCode::BTN_RIGHT,
    KeyCode::KEY_VOLUMEDOWN,
    KeyCode::KEY_VOLUMEUP,
];

/// Look up the mappable key for the given code
pub fn find_by_code(code: KeyCode) -> Option<MappableKey> {
    MAPPABLE_KEYS.iter().copied().find(|k| k.code == code)
}

/// Look up the mappable key with the given label (case-insensitive)
pub fn find_by_label(label: &str) -> Option<MappableKey> {
    MAPPABLE_KEYS
        .iter()
        .copied()
        .find(|k| k.label.eq_ignore_ascii_case(label))
}

/// Returns the label for the given code, or an empty string for keys that
/// are not in the table.
pub fn label_for(code: KeyCode) -> &'static str {
    find_by_code(code).map(|k| k.label).unwrap_or("")
}

/// Looks up a key that is known to be in the table
pub(crate) fn builtin(code: KeyCode) -> MappableKey {
    MappableKey {
        code,
        label: label_for(code),
    }
}
