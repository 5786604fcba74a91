use super::*;

#[test]
fn apply_state_round_trips_through_recording_driver() {
    let mut d = RecordingDriver::new();
    let target = TargetId::new("dot");
    let state = VisualState {
        translate: Vec2::new(12.0, -4.0),
        scale: 0.5,
        rotation_deg: 30.0,
        blur_px: 2.0,
        opacity: 0.75,
        color: Some(Rgba8::rgb(1, 2, 3)),
    };
    apply_state(&mut d, &target, &state);
    assert_eq!(d.state(&target), Some(state));
    assert!(d.is_visible(&target));
    assert_eq!(d.writes(), 8);
}

#[test]
fn apply_state_sanitizes_values() {
    let mut d = RecordingDriver::new();
    let target = TargetId::new("t");
    apply_state(
        &mut d,
        &target,
        &VisualState {
            opacity: 1.5,
            blur_px: -1.0,
            ..VisualState::default()
        },
    );
    let s = d.state(&target).unwrap();
    assert_eq!(s.opacity, 1.0);
    assert_eq!(s.blur_px, 0.0);
}

#[test]
fn kill_and_hide_stops_and_hides() {
    let mut d = RecordingDriver::new();
    let target = TargetId::new("dot");
    apply_state(&mut d, &target, &VisualState::default());
    kill_and_hide(&mut d, &target);
    assert_eq!(d.kills(&target), 1);
    assert!(!d.is_visible(&target));
    assert_eq!(d.state(&target).unwrap().opacity, 0.0);
}

#[test]
fn unknown_target_has_no_state() {
    let d = RecordingDriver::new();
    assert!(d.state(&TargetId::new("x")).is_none());
    assert!(d.is_visible(&TargetId::new("x")));
}

#[test]
fn serializes_to_json() {
    let mut d = RecordingDriver::new();
    d.set(
        &TargetId::new("a"),
        Property::Opacity,
        PropertyValue::Number(0.5),
    );
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["targets"]["a"]["opacity"], 0.5);
}
