use evdev::KeyCode;

use crate::{
    input::{
        target::recording::{Recorded, RecordingSink},
        touch::{AxisRange, SlotMode, TouchEvent},
    },
    overlay::{
        geometry::{Screen, Vec2},
        layout::Chrome,
        state::AppState,
        widget::{Direction, WidgetId, WidgetType},
        Overlay, OverlayOptions,
    },
};

/// Touch coordinates map 1:1 onto a 1000x1000 screen
fn overlay() -> Overlay {
    Overlay::new(
        Screen::new(1000, 1000),
        AxisRange::new(0, 1000),
        AxisRange::new(0, 1000),
        OverlayOptions::default(),
    )
}

fn down(overlay: &mut Overlay, slot: i32, x: i32, y: i32) {
    for event in [
        TouchEvent::Slot(slot),
        TouchEvent::TrackingId(100 + slot),
        TouchEvent::PositionX(x),
        TouchEvent::PositionY(y),
        TouchEvent::Report,
    ] {
        overlay.handle_touch_event(event);
    }
}

fn motion(overlay: &mut Overlay, slot: i32, x: i32, y: i32) {
    for event in [
        TouchEvent::Slot(slot),
        TouchEvent::PositionX(x),
        TouchEvent::PositionY(y),
        TouchEvent::Report,
    ] {
        overlay.handle_touch_event(event);
    }
}

fn up(overlay: &mut Overlay, slot: i32) {
    for event in [
        TouchEvent::Slot(slot),
        TouchEvent::TrackingId(-1),
        TouchEvent::Report,
    ] {
        overlay.handle_touch_event(event);
    }
}

fn tap(overlay: &mut Overlay, x: i32, y: i32) {
    down(overlay, 0, x, y);
    up(overlay, 0);
}

fn tap_point(overlay: &mut Overlay, p: Vec2) {
    tap(overlay, p.x.round() as i32, p.y.round() as i32);
}

fn tap_chrome(overlay: &mut Overlay, chrome: Chrome) {
    tap_point(overlay, chrome.rect().center());
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

/// Add a widget through the edit UI. Leaves the overlay in edit mode.
fn add_widget(overlay: &mut Overlay, row_y: i32) -> WidgetId {
    tap_chrome(overlay, Chrome::Add);
    assert_eq!(overlay.state(), AppState::MenuAddWidget);
    tap(overlay, 500, row_y);
    assert_eq!(overlay.state(), AppState::EditMode);
    overlay
        .widgets()
        .iter()
        .last()
        .map(|w| w.id())
        .expect("widget should have been created")
}

#[test]
fn test_full_edit_session() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();

    // Enter edit mode and add a joystick in the middle of the screen
    tap_chrome(&mut overlay, Chrome::Edit);
    assert_eq!(overlay.state(), AppState::EditMode);
    let id = add_widget(&mut overlay, 440);
    {
        let widget = overlay.widgets().get(id).unwrap();
        assert_eq!(widget.widget_type(), WidgetType::Joystick);
        assert_eq!(widget.norm_center, Vec2::new(0.5, 0.5));
        assert_near(widget.bounds().x, 400.0);
        assert_near(widget.bounds().right(), 600.0);
    }

    // Drag it by (100, 50)
    down(&mut overlay, 0, 500, 500);
    assert_eq!(overlay.machine().selected(), Some(id));
    motion(&mut overlay, 0, 600, 550);
    up(&mut overlay, 0);
    assert!(overlay.edit_state().is_none());
    {
        let widget = overlay.widgets().get(id).unwrap();
        assert_near(widget.norm_center.x, 0.6);
        assert_near(widget.norm_center.y, 0.55);
    }

    // Drag the resize handle twice as far from the center
    down(&mut overlay, 0, 690, 640);
    motion(&mut overlay, 0, 780, 730);
    up(&mut overlay, 0);
    {
        let widget = overlay.widgets().get(id).unwrap();
        assert_near(widget.norm_half_size, 0.2);
        assert_near(widget.norm_center.x, 0.6);
        assert_near(widget.radius(), 200.0);
    }

    // Remap Up to J
    tap_chrome(&mut overlay, Chrome::Properties);
    assert_eq!(overlay.state(), AppState::MenuWidgetProperties);
    tap(&mut overlay, 500, 470);
    assert_eq!(overlay.state(), AppState::MenuRemapAction);
    tap(&mut overlay, 500, 410);
    assert_eq!(overlay.state(), AppState::MenuRemapKey);
    assert_eq!(overlay.machine().remap().unwrap().action, Some(Direction::Up));
    let j = overlay.key_grid().cell_rect(9).center();
    tap_point(&mut overlay, j);
    assert_eq!(overlay.state(), AppState::EditMode);
    assert!(overlay.machine().remap().is_none());
    {
        let mapping = overlay.widgets().get(id).unwrap().analog().unwrap();
        assert_eq!(mapping.key(Direction::Up).code, KeyCode::KEY_J);
        assert_eq!(mapping.key(Direction::Up).label, "J");
        assert_eq!(mapping.key(Direction::Down).code, KeyCode::KEY_S);
    }

    // Back to running; no key events were produced while editing
    tap_chrome(&mut overlay, Chrome::Edit);
    assert_eq!(overlay.state(), AppState::Running);
    assert!(overlay.machine().selected().is_none());
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());

    // Push the stick up
    down(&mut overlay, 0, 600, 550);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());
    motion(&mut overlay, 0, 600, 360);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_J, true)]);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty(), "held direction should not repeat");

    up(&mut overlay, 0);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_J, false)]);
}

#[test]
fn test_trackpad_motion_and_click() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();

    down(&mut overlay, 1, 100, 900);
    assert_eq!(overlay.slots()[1].mode, SlotMode::Trackpad);
    motion(&mut overlay, 1, 105, 905);
    motion(&mut overlay, 1, 110, 910);
    up(&mut overlay, 1);
    overlay.frame(&mut sink);
    assert_eq!(sink.total_motion(), (10, 10));
    assert!(sink.keys().is_empty(), "a moved contact must not click");
    assert_eq!(overlay.slots()[1].mode, SlotMode::Idle);

    sink.take();
    down(&mut overlay, 1, 100, 900);
    up(&mut overlay, 1);
    overlay.frame(&mut sink);
    assert_eq!(
        sink.take(),
        vec![
            Recorded::Key(KeyCode::BTN_LEFT, true),
            Recorded::Key(KeyCode::BTN_LEFT, false),
        ]
    );
}

#[test]
fn test_button_slide_off_releases() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Button, Vec2::new(0.2, 0.8), 0.05, screen)
        .unwrap();

    down(&mut overlay, 0, 200, 800);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_E, true)]);
    assert!(overlay.widgets().get(id).unwrap().is_pressed());

    // Slide off while still touching
    motion(&mut overlay, 0, 400, 800);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_E, false)]);
    assert!(overlay.widgets().get(id).unwrap().controlling_finger.is_none());

    // Sliding back on does not press again
    motion(&mut overlay, 0, 200, 800);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());

    up(&mut overlay, 0);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());
}

#[test]
fn test_second_finger_takes_over_widget() {
    let mut overlay = overlay();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Joystick, Vec2::new(0.5, 0.5), 0.1, screen)
        .unwrap();

    down(&mut overlay, 0, 500, 500);
    down(&mut overlay, 1, 520, 520);
    let owners: Vec<_> = overlay
        .widgets()
        .iter()
        .filter_map(|w| w.controlling_finger)
        .collect();
    assert_eq!(owners, vec![1]);
    assert_eq!(overlay.widgets().owned_by(1), Some(id));
    assert_eq!(overlay.widgets().owned_by(0), None);

    // Lifting the old finger does not affect the new owner
    up(&mut overlay, 0);
    assert_eq!(overlay.widgets().owned_by(1), Some(id));
    up(&mut overlay, 1);
    assert!(overlay.widgets().get(id).unwrap().controlling_finger.is_none());
}

#[test]
fn test_menu_cancel_on_stray_tap() {
    let mut overlay = overlay();
    tap_chrome(&mut overlay, Chrome::Edit);
    tap_chrome(&mut overlay, Chrome::Add);
    assert_eq!(overlay.state(), AppState::MenuAddWidget);

    tap(&mut overlay, 900, 900);
    assert_eq!(overlay.state(), AppState::EditMode);
    assert!(overlay.widgets().is_empty());

    // The add chrome toggles the menu closed too
    tap_chrome(&mut overlay, Chrome::Add);
    tap_chrome(&mut overlay, Chrome::Add);
    assert_eq!(overlay.state(), AppState::EditMode);
}

#[test]
fn test_chrome_only_where_meaningful() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();

    // In running mode the add button area is just trackpad
    tap_chrome(&mut overlay, Chrome::Add);
    assert_eq!(overlay.state(), AppState::Running);
    overlay.frame(&mut sink);
    assert_eq!(sink.keys().len(), 2, "tap on the trackpad clicks");

    // Properties needs a selection
    tap_chrome(&mut overlay, Chrome::Edit);
    tap_chrome(&mut overlay, Chrome::Properties);
    assert_eq!(overlay.state(), AppState::EditMode);
}

#[test]
fn test_remap_button_and_back_out() {
    let mut overlay = overlay();
    tap_chrome(&mut overlay, Chrome::Edit);
    let id = add_widget(&mut overlay, 560);
    assert_eq!(overlay.widgets().get(id).unwrap().widget_type(), WidgetType::Button);

    // Select it, open properties, pick remap, then back out with edit
    tap(&mut overlay, 500, 500);
    tap_chrome(&mut overlay, Chrome::Properties);
    tap(&mut overlay, 500, 470);
    assert_eq!(overlay.state(), AppState::MenuRemapKey);
    tap_chrome(&mut overlay, Chrome::Edit);
    assert_eq!(overlay.state(), AppState::MenuWidgetProperties);
    assert!(overlay.machine().remap().is_none());

    // Remap for real
    tap(&mut overlay, 500, 470);
    let a = overlay.key_grid().cell_rect(0).center();
    tap_point(&mut overlay, a);
    let button = overlay.widgets().get(id).unwrap().button().unwrap();
    assert_eq!(button.key.code, KeyCode::KEY_A);
}

#[test]
fn test_delete_releases_held_keys() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Button, Vec2::new(0.5, 0.5), 0.1, screen)
        .unwrap();

    // Hold the button with slot 0 while a second finger edits
    down(&mut overlay, 0, 500, 500);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_E, true)]);

    let edit = Chrome::Edit.rect().center();
    down(&mut overlay, 1, edit.x as i32, edit.y as i32);
    up(&mut overlay, 1);
    assert_eq!(overlay.state(), AppState::EditMode);
    down(&mut overlay, 1, 550, 550);
    up(&mut overlay, 1);
    assert_eq!(overlay.machine().selected(), Some(id));
    let props = Chrome::Properties.rect().center();
    down(&mut overlay, 1, props.x as i32, props.y as i32);
    up(&mut overlay, 1);
    down(&mut overlay, 1, 500, 530);
    up(&mut overlay, 1);

    assert_eq!(overlay.state(), AppState::EditMode);
    assert!(overlay.widgets().is_empty());
    assert!(overlay.machine().selected().is_none());
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_E, false)]);

    up(&mut overlay, 0);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());
}

#[test]
fn test_reset_releases_everything() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    overlay
        .widgets_mut()
        .create(WidgetType::DPad, Vec2::new(0.5, 0.5), 0.1, screen)
        .unwrap();

    down(&mut overlay, 0, 580, 500);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_D, true)]);

    overlay.reset();
    overlay.flush(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_D, false)]);
    assert!(overlay.slots().iter().all(|s| !s.active && s.mode == SlotMode::Idle));
    assert!(overlay.widgets().iter().all(|w| w.controlling_finger.is_none()));

    // A contact that was down across the reset does not resurrect
    motion(&mut overlay, 0, 600, 500);
    overlay.frame(&mut sink);
    assert!(sink.take().is_empty());
}

#[test]
fn test_missed_lift_does_not_click() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();

    down(&mut overlay, 0, 100, 900);
    // New tracking id on the same slot without a lift in between
    down(&mut overlay, 0, 120, 900);
    overlay.frame(&mut sink);
    assert!(sink.keys().is_empty());
    assert_eq!(overlay.slots()[0].mode, SlotMode::Trackpad);

    up(&mut overlay, 0);
    overlay.frame(&mut sink);
    assert_eq!(sink.keys().len(), 2);
}

#[test]
fn test_scene_matches_hit_targets() {
    let mut overlay = overlay();
    let scene = overlay.scene();
    assert_eq!(scene.state, AppState::Running);
    assert!(scene.menu.is_none());
    let add = scene.chrome.iter().find(|c| c.kind == Chrome::Add).unwrap();
    assert!(add.disabled);

    tap_chrome(&mut overlay, Chrome::Edit);
    let id = add_widget(&mut overlay, 500);
    tap(&mut overlay, 500, 500);
    let scene = overlay.scene();
    let view = scene.widgets.iter().find(|w| w.id == id).unwrap();
    assert!(view.selected);
    assert_eq!(view.widget_type, WidgetType::DPad);
    assert_eq!(view.labels, vec!["W", "S", "A", "D"]);
    assert_eq!(
        view.resize_handle,
        Some(overlay.widgets().get(id).unwrap().resize_handle())
    );

    tap_chrome(&mut overlay, Chrome::Properties);
    tap(&mut overlay, 500, 470);
    tap(&mut overlay, 500, 590);
    assert_eq!(overlay.state(), AppState::MenuRemapKey);
    let scene = overlay.scene();
    let menu = scene.menu.as_ref().unwrap();
    assert_eq!(menu.title, "Select Key for Right");
    assert_eq!(menu.items.len(), 50);
    for (i, item) in menu.items.iter().enumerate() {
        assert_eq!(item.rect, overlay.key_grid().cell_rect(i));
    }
    let highlighted: Vec<_> = menu.items.iter().filter(|i| i.highlighted).collect();
    assert_eq!(highlighted.len(), 1);
    assert_eq!(highlighted[0].label, "D");
}

#[test]
fn test_resize_recomputes_geometry() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Button, Vec2::new(0.5, 0.5), 0.1, screen)
        .unwrap();

    overlay.resize(2000, 1000);
    overlay.frame(&mut sink);
    let widget = overlay.widgets().get(id).unwrap();
    assert_eq!(widget.center(), Vec2::new(1000.0, 500.0));
    assert_near(widget.radius(), 100.0);
}

#[test]
fn test_landscape_touch_mapping() {
    let mut overlay = overlay();
    overlay.set_landscape(true);
    down(&mut overlay, 0, 100, 300);
    let slot = overlay.slots()[0];
    assert_near(slot.position.x, 300.0);
    assert_near(slot.position.y, 900.0);
}

#[test]
fn test_joystick_sweep_right_and_back() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    overlay
        .widgets_mut()
        .create(WidgetType::Joystick, Vec2::new(0.5, 0.5), 0.1, screen)
        .unwrap();

    down(&mut overlay, 0, 500, 500);
    overlay.frame(&mut sink);
    motion(&mut overlay, 0, 600, 500);
    overlay.frame(&mut sink);
    motion(&mut overlay, 0, 500, 500);
    overlay.frame(&mut sink);
    up(&mut overlay, 0);
    overlay.frame(&mut sink);

    assert_eq!(
        sink.take(),
        vec![
            Recorded::Key(KeyCode::KEY_D, true),
            Recorded::Key(KeyCode::KEY_D, false),
        ]
    );
}

#[test]
fn test_remap_dpad_left() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    tap_chrome(&mut overlay, Chrome::Edit);
    let id = add_widget(&mut overlay, 500);
    assert_eq!(overlay.widgets().get(id).unwrap().widget_type(), WidgetType::DPad);

    // Select, then Properties -> Remap -> Left -> J
    tap(&mut overlay, 500, 500);
    tap_chrome(&mut overlay, Chrome::Properties);
    tap(&mut overlay, 500, 470);
    assert_eq!(overlay.state(), AppState::MenuRemapAction);
    tap(&mut overlay, 500, 530);
    assert_eq!(overlay.state(), AppState::MenuRemapKey);
    assert_eq!(overlay.machine().remap().unwrap().action, Some(Direction::Left));
    let j = overlay.key_grid().cell_rect(9).center();
    tap_point(&mut overlay, j);

    assert_eq!(overlay.state(), AppState::EditMode);
    assert!(overlay.machine().remap().is_none());
    let widget = overlay.widgets().get(id).unwrap();
    let mapping = widget.analog().unwrap();
    assert_eq!(mapping.key(Direction::Left).code, KeyCode::KEY_J);
    assert_eq!(mapping.key(Direction::Left).label, "J");
    assert_eq!(widget.labels(), vec!["W", "S", "J", "D"]);

    // The new mapping is live once running again
    tap_chrome(&mut overlay, Chrome::Edit);
    assert_eq!(overlay.state(), AppState::Running);
    down(&mut overlay, 0, 500, 500);
    motion(&mut overlay, 0, 420, 500);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_J, true)]);
    up(&mut overlay, 0);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_J, false)]);
}

#[test]
fn test_held_chrome_contact_activates_once() {
    let mut overlay = overlay();
    let edit = Chrome::Edit.rect().center();
    let (x, y) = (edit.x as i32, edit.y as i32);

    down(&mut overlay, 0, x, y);
    assert_eq!(overlay.state(), AppState::EditMode);
    motion(&mut overlay, 0, x + 2, y);
    motion(&mut overlay, 0, x, y + 2);
    assert_eq!(overlay.state(), AppState::EditMode);
    up(&mut overlay, 0);
    assert_eq!(overlay.state(), AppState::EditMode);
}

#[test]
fn test_reset_keeps_device_slot_selection() {
    let mut overlay = overlay();
    let mut sink = RecordingSink::default();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Joystick, Vec2::new(0.2, 0.2), 0.1, screen)
        .unwrap();

    // The device is left with slot 1 selected
    down(&mut overlay, 1, 800, 800);
    up(&mut overlay, 1);
    overlay.frame(&mut sink);
    sink.take();
    overlay.reset();

    // Next contact arrives without a slot event
    for event in [
        TouchEvent::TrackingId(300),
        TouchEvent::PositionX(200),
        TouchEvent::PositionY(200),
        TouchEvent::Report,
    ] {
        overlay.handle_touch_event(event);
    }
    assert_eq!(overlay.widgets().owned_by(1), Some(id));

    // A second finger in slot 0 does not disturb the first
    down(&mut overlay, 0, 900, 900);
    assert_eq!(overlay.widgets().owned_by(1), Some(id));
    assert_eq!(overlay.slots()[0].mode, SlotMode::Trackpad);
    assert_eq!(overlay.slots()[1].mode, SlotMode::WidgetControl);

    motion(&mut overlay, 1, 300, 200);
    overlay.frame(&mut sink);
    assert_eq!(sink.take(), vec![Recorded::Key(KeyCode::KEY_D, true)]);
}

#[test]
fn test_hidden_period_follows_slot_selection() {
    let mut overlay = overlay();
    let screen = overlay.screen();
    let id = overlay
        .widgets_mut()
        .create(WidgetType::Joystick, Vec2::new(0.2, 0.2), 0.1, screen)
        .unwrap();

    overlay.reset();
    // Contacts come and go while hidden, ending with slot 2 selected
    for event in [
        TouchEvent::Slot(4),
        TouchEvent::TrackingId(50),
        TouchEvent::PositionX(200),
        TouchEvent::PositionY(200),
        TouchEvent::Report,
        TouchEvent::Slot(2),
        TouchEvent::TrackingId(-1),
        TouchEvent::Report,
    ] {
        overlay.follow_touch_event(event);
    }
    assert!(overlay.slots().iter().all(|s| !s.active));
    assert!(overlay.widgets().get(id).unwrap().controlling_finger.is_none());

    // Shown again: the next contact lands in the selected slot
    for event in [
        TouchEvent::TrackingId(301),
        TouchEvent::PositionX(200),
        TouchEvent::PositionY(200),
        TouchEvent::Report,
    ] {
        overlay.handle_touch_event(event);
    }
    assert_eq!(overlay.widgets().owned_by(2), Some(id));
}
