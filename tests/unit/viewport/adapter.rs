use super::*;

fn adapter(width: f64, height: f64) -> ViewportAdapter {
    let mut a = ViewportAdapter::new(
        Viewport::new(width, height),
        Breakpoints::default(),
        AdapterSettings::default(),
    );
    a.attach();
    a
}

#[test]
fn debounced_resize_fires_once() {
    let mut a = adapter(1440.0, 900.0);
    a.on_resize(Millis(0), Viewport::new(1300.0, 900.0));
    a.on_resize(Millis(50), Viewport::new(1200.0, 800.0));
    assert!(a.poll(Millis(100)).is_none());

    let ev = a.poll(Millis(200)).unwrap();
    assert_eq!(ev.viewport, Viewport::new(1200.0, 800.0));
    assert_eq!(ev.previous, Viewport::new(1440.0, 900.0));
    assert!(!ev.class_changed);
    assert!(a.poll(Millis(400)).is_none());
}

#[test]
fn same_final_size_fires_nothing_new() {
    let mut a = adapter(1440.0, 900.0);
    a.on_resize(Millis(0), Viewport::new(1200.0, 900.0));
    a.on_resize(Millis(10), Viewport::new(1440.0, 900.0));
    assert!(a.poll(Millis(500)).is_none());
}

#[test]
fn mobile_keyboard_jitter_is_ignored() {
    let mut a = adapter(390.0, 844.0);
    a.on_resize(Millis(0), Viewport::new(390.0, 744.0));
    assert!(!a.is_pending());

    a.on_resize(Millis(0), Viewport::new(390.0, 500.0));
    assert!(a.is_pending());
    assert_eq!(a.poll(Millis(150)).unwrap().viewport.height, 500.0);
}

#[test]
fn returning_to_the_current_height_cancels_a_pending_resize() {
    let mut a = adapter(390.0, 844.0);
    a.on_resize(Millis(0), Viewport::new(390.0, 500.0));
    assert!(a.is_pending());

    // small against the accepted height, large against the pending one
    a.on_resize(Millis(20), Viewport::new(390.0, 844.0));
    assert!(a.poll(Millis(400)).is_none());
    assert_eq!(a.current(), Viewport::new(390.0, 844.0));
}

#[test]
fn jitter_is_measured_against_the_pending_resize() {
    let mut a = adapter(390.0, 844.0);
    a.on_resize(Millis(0), Viewport::new(390.0, 500.0));
    a.on_resize(Millis(20), Viewport::new(390.0, 560.0));
    assert_eq!(a.poll(Millis(400)).unwrap().viewport.height, 500.0);
}

#[test]
fn class_change_is_reported() {
    let mut a = adapter(1440.0, 900.0);
    a.on_resize(Millis(0), Viewport::new(700.0, 900.0));
    let ev = a.poll(Millis(150)).unwrap();
    assert!(ev.class_changed);
    assert_eq!(ev.device, DeviceClass::Mobile);
    assert_eq!(a.device(), DeviceClass::Mobile);
}

#[test]
fn listeners_attach_and_detach() {
    let mut a = ViewportAdapter::new(
        Viewport::new(1440.0, 900.0),
        Breakpoints::default(),
        AdapterSettings::default(),
    );
    a.on_resize(Millis(0), Viewport::new(1000.0, 900.0));
    assert!(!a.is_pending());

    let first = a.attach();
    let second = a.attach();
    assert_ne!(first, second);
    assert_eq!(a.listener_count(), 2);
    a.on_resize(Millis(0), Viewport::new(1000.0, 900.0));
    assert!(a.detach(first));
    assert!(!a.detach(first));
    assert!(a.is_pending());
    assert!(a.detach(second));
    assert_eq!(a.listener_count(), 0);
    assert!(!a.is_pending());
}
