use super::*;
use crate::{
    driver::RecordingDriver,
    foundation::core::{Breakpoints, Rect, Viewport},
    geometry::static_layout::StaticLayout,
};

fn square(center: (f64, f64), side: f64) -> Rect {
    Rect::from_center_size(center, (side, side))
}

fn layout(width: f64, height: f64) -> StaticLayout {
    StaticLayout::new(Viewport::new(width, height))
        .with_box("hero-name-dot", square((700.0, 120.0), 64.0))
        .with_box("dot-rest", square((700.0, 120.0), 64.0))
        .with_box("experience-title", Rect::new(200.0, 400.0, 600.0, 460.0))
        .with_box("work-title", Rect::new(900.0, 600.0, 1300.0, 660.0))
}

fn config() -> DotConfig {
    DotConfig {
        size_px: 64.0,
        ..DotConfig::default()
    }
}

fn dot() -> DotChoreography {
    DotChoreography::new(
        config(),
        GeometrySampler::new(Breakpoints::default(), 1.0),
        RetryPolicy::default(),
        false,
    )
}

fn resting_center(driver: &RecordingDriver, target: &TargetId) -> Point {
    let s = driver.state(target).unwrap();
    Point::new(s.translate.x + 32.0, s.translate.y + 32.0)
}

#[test]
fn full_flight_ends_resting_on_the_anchor() {
    let mut session = Session::default();
    let mut probe = layout(1440.0, 900.0);
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    let act = dot
        .activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    assert_eq!(act, Activation::Waiting);
    assert!(!driver.is_visible(dot.target()));

    let tick = |dot: &mut DotChoreography, s: &mut Session, p: &mut StaticLayout, d: &mut RecordingDriver, t| {
        dot.tick(Millis(t), s, p, d).unwrap()
    };
    assert_eq!(tick(&mut dot, &mut session, &mut probe, &mut driver, 10), DotState::Idle);

    session.signals_mut().publish(Topic::NameReady);
    assert_eq!(tick(&mut dot, &mut session, &mut probe, &mut driver, 20), DotState::Idle);
    assert_eq!(
        tick(&mut dot, &mut session, &mut probe, &mut driver, 60),
        DotState::WigglingOnAnchor
    );
    assert_eq!(
        tick(&mut dot, &mut session, &mut probe, &mut driver, 60 + 800),
        DotState::LaunchingToTarget1
    );
    assert!(!session.is_set(Topic::DotAnimationComplete));
    assert!(!session.dot_ever_completed());

    assert_eq!(
        tick(&mut dot, &mut session, &mut probe, &mut driver, 60 + 4450),
        DotState::Resting
    );
    let center = resting_center(&driver, dot.target());
    assert!((center.x - 700.0).abs() <= 1.0 && (center.y - 120.0).abs() <= 1.0);
    assert!(session.dot_ever_completed());
    assert!(session.is_set(Topic::DotAnimationComplete));
    assert_eq!(dot.resting_anchor(), Some(Point::new(700.0, 120.0)));
    assert_eq!(dot.interpolated_frames(), 1);
    assert_eq!(
        driver.state(dot.target()).unwrap().color,
        Some(Rgba8::from_hex("#ff5a36").unwrap())
    );
}

#[test]
fn missing_hop_target_drops_its_phases() {
    let mut probe = layout(1440.0, 900.0);
    probe.remove("experience-title");
    let geometry = GeometrySampler::new(Breakpoints::default(), 1.0).sample(
        &mut probe,
        &config().anchors,
        Size::new(64.0, 64.0),
        Millis(0),
    );
    let (def, phases, total) = config()
        .timeline_def(&DotParams::default(), &geometry)
        .unwrap();
    assert!(!phases.contains(&DotState::LaunchingToTarget1));
    assert!(phases.contains(&DotState::LandingOnTarget2));
    assert_eq!(def.phases.len(), phases.len());
    assert_eq!(total, 4450 - 800);
}

#[test]
fn missing_rest_anchor_retries_then_gives_up() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut probe = layout(1440.0, 900.0);
    probe.remove("dot-rest");
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    for t in (0..=2100).step_by(50) {
        assert_eq!(
            dot.tick(Millis(t), &mut session, &mut probe, &mut driver)
                .unwrap(),
            DotState::Idle
        );
    }
    assert!(dot.gave_up());
    assert!(!session.is_set(Topic::DotAnimationComplete));
}

#[test]
fn late_anchor_is_picked_up_by_a_retry() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut probe = layout(1440.0, 900.0);
    probe.remove("dot-rest");
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    dot.tick(Millis(40), &mut session, &mut probe, &mut driver)
        .unwrap();
    probe.insert("dot-rest", square((700.0, 120.0), 64.0));
    assert_eq!(
        dot.tick(Millis(90), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::Idle
    );
    assert_eq!(
        dot.tick(Millis(140), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::WigglingOnAnchor
    );
}

#[test]
fn resolved_readiness_samples_before_the_next_retry() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut probe = layout(1440.0, 900.0);
    probe.remove("dot-rest");
    let mut driver = RecordingDriver::new();
    let mut dot = dot();
    let ready = dot.anchors_ready();

    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    assert_eq!(
        dot.tick(Millis(40), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::Idle
    );
    probe.insert("dot-rest", square((700.0, 120.0), 64.0));
    ready.resolve(());
    // the retry interval alone would wait until 140
    assert_eq!(
        dot.tick(Millis(50), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::WigglingOnAnchor
    );
}

#[test]
fn readiness_revives_a_dot_that_gave_up() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut probe = layout(1440.0, 900.0);
    probe.remove("dot-rest");
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    for t in (0..=2100).step_by(50) {
        dot.tick(Millis(t), &mut session, &mut probe, &mut driver)
            .unwrap();
    }
    assert!(dot.gave_up());
    assert_eq!(
        dot.tick(Millis(2500), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::Idle
    );

    probe.insert("dot-rest", square((700.0, 120.0), 64.0));
    dot.anchors_ready().resolve(());
    assert_eq!(
        dot.tick(Millis(2600), &mut session, &mut probe, &mut driver)
            .unwrap(),
        DotState::WigglingOnAnchor
    );
    assert!(!dot.gave_up());
}

#[test]
fn mobile_restores_within_activation() {
    let mut session = Session::default();
    let mut probe = layout(390.0, 844.0);
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    let act = dot
        .activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    assert_eq!(act, Activation::Restored);
    assert_eq!(dot.state(), DotState::Resting);
    assert_eq!(dot.interpolated_frames(), 0);
    assert!(session.is_set(Topic::DotAnimationComplete));
    let center = resting_center(&driver, dot.target());
    assert!((center.x - 700.0).abs() <= 1.0 && (center.y - 120.0).abs() <= 1.0);
}

#[test]
fn completed_session_restores_the_same_end_state() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut probe = layout(1440.0, 900.0);
    let mut fresh = RecordingDriver::new();
    let mut first = dot();
    first
        .activate(Millis(0), &mut session, &mut probe, &mut fresh)
        .unwrap();
    first
        .tick(Millis(40), &mut session, &mut probe, &mut fresh)
        .unwrap();
    first
        .tick(Millis(10_000), &mut session, &mut probe, &mut fresh)
        .unwrap();

    let mut restored = RecordingDriver::new();
    let mut second = dot();
    let act = second
        .activate(Millis(20_000), &mut session, &mut probe, &mut restored)
        .unwrap();
    assert_eq!(act, Activation::Restored);
    assert_eq!(
        fresh.state(first.target()),
        restored.state(second.target())
    );
    assert_eq!(second.interpolated_frames(), 0);
}

#[test]
fn restoring_twice_writes_the_same_state() {
    let mut session = Session::default();
    session.mark_dot_completed();
    let mut probe = layout(1440.0, 900.0);
    let mut driver = RecordingDriver::new();
    let mut dot = dot();

    let first = dot
        .activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();
    let state = driver.state(dot.target());
    let complete = session.signals().signal(Topic::DotAnimationComplete);
    let mut rising = session.signals().subscribe(Topic::DotAnimationComplete);

    let second = dot
        .activate(Millis(500), &mut session, &mut probe, &mut driver)
        .unwrap();
    assert_eq!((first, second), (Activation::Restored, Activation::Restored));
    assert_eq!(driver.state(dot.target()), state);
    assert!(driver.is_visible(dot.target()));
    assert_eq!(session.signals().signal(Topic::DotAnimationComplete), complete);
    assert!(!rising.poll_rising(session.signals()));
    assert_eq!(dot.state(), DotState::Resting);
    assert_eq!(dot.interpolated_frames(), 0);
}

#[test]
fn deactivate_kills_hides_and_clears_the_signal() {
    let mut session = Session::default();
    let mut probe = layout(390.0, 844.0);
    let mut driver = RecordingDriver::new();
    let mut dot = dot();
    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();

    dot.deactivate(&mut session, &mut driver);
    assert_eq!(dot.state(), DotState::Idle);
    assert_eq!(driver.kills(dot.target()), 1);
    assert!(!driver.is_visible(dot.target()));
    assert!(!session.is_set(Topic::DotAnimationComplete));
    assert!(session.dot_ever_completed());
}

#[test]
fn reposition_moves_a_resting_dot() {
    let mut session = Session::default();
    let mut probe = layout(390.0, 844.0);
    let mut driver = RecordingDriver::new();
    let mut dot = dot();
    dot.activate(Millis(0), &mut session, &mut probe, &mut driver)
        .unwrap();

    probe.insert("dot-rest", square((200.0, 300.0), 64.0));
    let moved = dot
        .reposition(Millis(500), &mut session, &mut probe, &mut driver)
        .unwrap();
    assert!(moved);
    assert_eq!(dot.state(), DotState::Resting);
    let center = resting_center(&driver, dot.target());
    assert!((center.x - 200.0).abs() <= 1.0 && (center.y - 300.0).abs() <= 1.0);
}

#[test]
fn config_requires_endpoints() {
    let mut cfg = config();
    cfg.anchors.retain(|a| a.id.as_str() != REST);
    assert!(cfg.validate().is_err());
    assert!(config().validate().is_ok());
}
