use super::*;

#[test]
fn progress_clamps_and_ignores_nan() {
    assert_eq!(Progress::clamped(-0.3).get(), 0.0);
    assert_eq!(Progress::clamped(1.4).get(), 1.0);
    assert_eq!(Progress::clamped(0.25).get(), 0.25);
    assert_eq!(Progress::clamped(f64::NAN).get(), 0.0);
    assert!(Progress::clamped(7.0).is_complete());
}

#[test]
fn progress_deserializes_clamped() {
    let p: Progress = serde_json::from_str("1.5").unwrap();
    assert_eq!(p.get(), 1.0);
}

#[test]
fn breakpoints_classify_inclusive_edges() {
    let bp = Breakpoints::default();
    assert_eq!(bp.classify(375.0), DeviceClass::Mobile);
    assert_eq!(bp.classify(767.0), DeviceClass::Mobile);
    assert_eq!(bp.classify(768.0), DeviceClass::Tablet);
    assert_eq!(bp.classify(1023.0), DeviceClass::Tablet);
    assert_eq!(bp.classify(1440.0), DeviceClass::Desktop);
}

#[test]
fn breakpoints_reject_inverted_order() {
    let bp = Breakpoints {
        mobile_max: 1000.0,
        tablet_max: 800.0,
    };
    assert!(bp.validate().is_err());
}

#[test]
fn visual_height_wins_when_smaller() {
    let vp = Viewport::new(390.0, 844.0).with_visual_height(760.0);
    assert_eq!(vp.effective_height(), 760.0);
    assert_eq!(vp.center(), Point::new(195.0, 380.0));

    let vp = Viewport::new(390.0, 844.0).with_visual_height(0.0);
    assert_eq!(vp.effective_height(), 844.0);
}

#[test]
fn device_class_parses_case_insensitively() {
    assert_eq!(
        "Desktop".parse::<DeviceClass>().unwrap(),
        DeviceClass::Desktop
    );
    assert!("watch".parse::<DeviceClass>().is_err());
}

#[test]
fn hex_colors_parse() {
    assert_eq!(Rgba8::from_hex("#ff8000").unwrap(), Rgba8::rgb(255, 128, 0));
    assert_eq!(Rgba8::from_hex("00000080").unwrap().a, 128);
    assert!(Rgba8::from_hex("#fff").is_err());
    assert!(Rgba8::from_hex("#gg0000").is_err());
}

#[test]
fn millis_since_saturates() {
    assert_eq!(Millis(150).since(Millis(100)), 50);
    assert_eq!(Millis(100).since(Millis(150)), 0);
    assert_eq!(Millis(u64::MAX).add(5), Millis(u64::MAX));
}
