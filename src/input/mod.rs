pub mod hotkey;
pub mod keys;
pub mod manager;
pub mod source;
pub mod target;
pub mod touch;
