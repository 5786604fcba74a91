use super::*;
use crate::foundation::core::{Millis, Point, Size};

fn snapshot() -> GeometrySnapshot {
    GeometrySnapshot::new(Viewport::new(1440.0, 900.0), Size::new(64.0, 64.0), Millis(5))
        .with_anchor("dot-rest", Point::new(700.0, 120.0))
}

#[test]
fn caches_are_per_slot() {
    let mut session = Session::default();
    let vp = Viewport::new(1440.0, 900.0);
    session.store_geometry(CacheSlot::Dot, snapshot());

    assert!(session.cached_geometry(CacheSlot::Dot, &vp).is_some());
    assert!(session.cached_geometry(CacheSlot::Reveal, &vp).is_none());
}

#[test]
fn stale_geometry_is_dropped() {
    let mut session = Session::default();
    session.store_geometry(CacheSlot::Dot, snapshot());
    assert!(
        session
            .cached_geometry(CacheSlot::Dot, &Viewport::new(1300.0, 900.0))
            .is_none()
    );
    assert!(!session.cache(CacheSlot::Dot).is_populated());
}

#[test]
fn reset_behaves_like_a_reload() {
    let mut session = Session::default();
    session.store_geometry(CacheSlot::Reveal, snapshot());
    session.signals_mut().publish(Topic::NameReady);
    session.mark_dot_completed();

    session.reset();
    assert_eq!(session.generation(), 1);
    assert!(!session.dot_ever_completed());
    assert!(!session.is_set(Topic::NameReady));
    assert!(!session.cache(CacheSlot::Reveal).is_populated());
}

#[test]
fn invalidate_geometry_keeps_signals() {
    let mut session = Session::default();
    session.store_geometry(CacheSlot::Stack, snapshot());
    session.signals_mut().publish(Topic::EngineerReveal);
    session.invalidate_geometry();
    assert!(!session.cache(CacheSlot::Stack).is_populated());
    assert!(session.is_set(Topic::EngineerReveal));
}
