use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    driver::RecordingDriver,
    foundation::core::{Breakpoints, Rect, Viewport},
    geometry::static_layout::StaticLayout,
};

fn navigator() -> Navigator {
    let mut nav = Navigator::new(NavConfig::default());
    nav.set_offsets([
        (SectionId::Work, 2000.0),
        (SectionId::Hero, 0.0),
        (SectionId::Experience, 900.0),
        (SectionId::Contact, 3800.0),
    ]);
    nav
}

#[test]
fn ids_parse_and_print() {
    assert_eq!("#certificates".parse::<SectionId>().unwrap(), SectionId::Certificates);
    assert_eq!("Work".parse::<SectionId>().unwrap(), SectionId::Work);
    assert!("blog".parse::<SectionId>().is_err());
    assert_eq!(SectionId::Experience.to_string(), "experience");
}

#[test]
fn navigate_notifies_callbacks() {
    let mut nav = navigator();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    nav.on_navigate(move |id, y| sink.borrow_mut().push((id, y)));

    assert_eq!(nav.navigate(SectionId::Work), Some(1928.0));
    assert_eq!(nav.navigate(SectionId::Hero), Some(0.0));
    assert_eq!(nav.navigate(SectionId::Certificates), None);
    assert_eq!(
        *seen.borrow(),
        vec![(SectionId::Work, 1928.0), (SectionId::Hero, 0.0)]
    );
}

#[test]
fn active_section_and_transition() {
    let nav = navigator();
    assert_eq!(nav.active_section(0.0), Some(SectionId::Hero));
    assert_eq!(nav.active_section(828.0), Some(SectionId::Experience));
    assert_eq!(nav.active_section(5000.0), Some(SectionId::Contact));

    let t = nav.transition(1378.0).unwrap();
    assert_eq!((t.from, t.to), (SectionId::Experience, SectionId::Work));
    assert!((t.blend - 0.5).abs() < 1e-9);

    let end = nav.transition(9000.0).unwrap();
    assert_eq!((end.from, end.to, end.blend), (SectionId::Contact, SectionId::Contact, 0.0));
}

#[test]
fn measure_reads_section_tops() {
    let mut session = Session::default();
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0))
        .with_box("hero", Rect::new(0.0, -300.0, 1440.0, 600.0))
        .with_box("work", Rect::new(0.0, 1700.0, 1440.0, 2600.0));
    let mut nav = Navigator::new(NavConfig::default());
    let found = nav.measure(
        Millis(0),
        300.0,
        &mut session,
        &GeometrySampler::new(Breakpoints::default(), 1.0),
        &mut probe,
    );
    assert_eq!(found, 2);
    assert_eq!(nav.offset(SectionId::Work), Some(2000.0));
    assert_eq!(nav.offset(SectionId::Hero), Some(0.0));
    assert!(session.cache(CacheSlot::Nav).is_populated());
}

#[test]
fn cached_offsets_do_not_follow_the_scroll() {
    let mut session = Session::default();
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0))
        .with_box("work", Rect::new(0.0, 1800.0, 1440.0, 2700.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 1.0);
    let mut nav = Navigator::new(NavConfig::default());
    nav.measure(Millis(0), 0.0, &mut session, &sampler, &mut probe);
    assert_eq!(nav.offset(SectionId::Work), Some(1800.0));

    probe.set_scroll(1000.0);
    nav.measure(Millis(10), 1000.0, &mut session, &sampler, &mut probe);
    assert_eq!(nav.offset(SectionId::Work), Some(1800.0));
}

#[test]
fn bar_waits_for_the_name() {
    let mut session = Session::default();
    let mut driver = RecordingDriver::new();
    let mut nav = navigator();
    let bar = NavConfig::default().bar_target;

    assert!(!nav.update_bar(&session, &mut driver));
    assert!(!driver.is_visible(&bar));
    let writes = driver.writes();
    nav.update_bar(&session, &mut driver);
    assert_eq!(driver.writes(), writes);

    session.signals_mut().publish(Topic::NameReady);
    assert!(nav.update_bar(&session, &mut driver));
    assert!(driver.is_visible(&bar));
}
