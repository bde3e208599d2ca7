//! Long-press handling for the hardware keys that control the overlay.
//! Volume-down held past the threshold shows/hides the overlay, volume-up
//! held past it switches orientation. Short presses still reach the system
//! as ordinary volume key taps.

#[cfg(test)]
#[path = "hotkey_test.rs"]
pub mod hotkey_test;

use std::time::{Duration, Instant};

use evdev::KeyCode;

/// Key that shows and hides the overlay
pub const TOGGLE_KEY: KeyCode = KeyCode::KEY_VOLUMEDOWN;
/// Key that switches between portrait and landscape
pub const ORIENTATION_KEY: KeyCode = KeyCode::KEY_VOLUMEUP;

/// Result of feeding a key event or a timer tick to [Hotkeys]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Pass a key state through unchanged
    Forward(KeyCode, bool),
    /// Emit a full press and release of the key
    Tap(KeyCode),
    ToggleOverlay,
    ToggleOrientation,
}

/// Outcome of releasing a [LongPressKey]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Released before the threshold
    Short,
    /// Released after the threshold
    Long,
    /// Not pressed, or the long press already fired while held
    Ignored,
}

/// Timing state of a single key
#[derive(Debug, Clone, Copy)]
pub struct LongPressKey {
    threshold: Duration,
    pressed_at: Option<Instant>,
    fired: bool,
}

impl LongPressKey {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: None,
            fired: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    pub fn press(&mut self, now: Instant) {
        self.pressed_at = Some(now);
        self.fired = false;
    }

    pub fn release(&mut self, now: Instant) -> Release {
        let Some(pressed_at) = self.pressed_at.take() else {
            return Release::Ignored;
        };
        if std::mem::take(&mut self.fired) {
            return Release::Ignored;
        }
        if now.saturating_duration_since(pressed_at) < self.threshold {
            Release::Short
        } else {
            Release::Long
        }
    }

    /// Returns true exactly once while the key is held past the threshold
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.fired = true;
        true
    }

    /// When [LongPressKey::poll] will next fire, if the key is held
    pub fn deadline(&self) -> Option<Instant> {
        if self.fired {
            return None;
        }
        self.pressed_at.map(|t| t + self.threshold)
    }

    /// Forget the current press
    pub fn cancel(&mut self) {
        self.pressed_at = None;
        self.fired = false;
    }
}

/// Decides what the volume keys do
#[derive(Debug, Clone, Copy)]
pub struct Hotkeys {
    toggle: LongPressKey,
    orientation: LongPressKey,
}

impl Hotkeys {
    pub fn new(threshold: Duration) -> Self {
        Self {
            toggle: LongPressKey::new(threshold),
            orientation: LongPressKey::new(threshold),
        }
    }

    /// Handle a key event (`value` 1 = press, 0 = release, 2 = repeat)
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        value: i32,
        overlay_visible: bool,
        now: Instant,
    ) -> Option<HotkeyAction> {
        match (key, value) {
            (TOGGLE_KEY, 1) => {
                self.toggle.press(now);
                None
            }
            (TOGGLE_KEY, 0) => match self.toggle.release(now) {
                Release::Short => Some(HotkeyAction::Tap(TOGGLE_KEY)),
                Release::Long | Release::Ignored => None,
            },
            (ORIENTATION_KEY, 0 | 1) if !overlay_visible => {
                self.orientation.cancel();
                Some(HotkeyAction::Forward(ORIENTATION_KEY, value == 1))
            }
            (ORIENTATION_KEY, 1) => {
                self.orientation.press(now);
                None
            }
            (ORIENTATION_KEY, 0) => match self.orientation.release(now) {
                Release::Short => Some(HotkeyAction::Tap(ORIENTATION_KEY)),
                Release::Long => Some(HotkeyAction::ToggleOrientation),
                Release::Ignored => None,
            },
            _ => None,
        }
    }

    /// Fire the overlay toggle as soon as volume-down has been held long
    /// enough, without waiting for the release
    pub fn poll(&mut self, now: Instant) -> Option<HotkeyAction> {
        self.toggle
            .poll(now)
            .then_some(HotkeyAction::ToggleOverlay)
    }

    /// Next instant [Hotkeys::poll] needs to run
    pub fn deadline(&self) -> Option<Instant> {
        self.toggle.deadline()
    }
}
