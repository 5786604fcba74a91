use super::*;
use crate::driver::RecordingDriver;

fn params() -> HeroParams {
    HeroParams {
        letters: 3,
        stagger_ms: 100,
        letter_ms: 400,
        ..HeroParams::default()
    }
}

#[test]
fn total_covers_the_last_letter() {
    assert_eq!(params().total_ms(), 600);
    assert!(params().timeline_def().validate().is_ok());
}

#[test]
fn reveal_publishes_name_ready_at_the_end() {
    let mut session = Session::default();
    let mut driver = RecordingDriver::new();
    let mut hero = HeroReveal::new(params());

    let act = hero
        .activate(Millis(0), &mut session, MotionMode::Full, &mut driver)
        .unwrap();
    assert_eq!(act, Activation::Playing);
    let first = params().letter_target(0);
    assert_eq!(driver.state(&first).unwrap().opacity, 0.0);

    assert_eq!(hero.tick(Millis(300), &mut session, &mut driver), HeroStatus::Revealing);
    assert!(!session.is_set(Topic::NameReady));
    let mid = driver.state(&first).unwrap();
    assert!(mid.opacity > 0.0 && mid.opacity < 1.0);
    let last = driver.state(&params().letter_target(2)).unwrap();
    assert!(last.opacity < mid.opacity);

    assert_eq!(hero.tick(Millis(600), &mut session, &mut driver), HeroStatus::Revealed);
    assert!(session.is_set(Topic::NameReady));
    let done = driver.state(&params().letter_target(2)).unwrap();
    assert_eq!(done.opacity, 1.0);
    assert_eq!(done.blur_px, 0.0);
    assert_eq!(done.translate.y, 0.0);
    assert_eq!(hero.interpolated_frames(), 1);
}

#[test]
fn second_activation_restores_instantly() {
    let mut session = Session::default();
    session.signals_mut().publish(Topic::NameReady);
    let mut driver = RecordingDriver::new();
    let mut hero = HeroReveal::new(params());

    let act = hero
        .activate(Millis(0), &mut session, MotionMode::Full, &mut driver)
        .unwrap();
    assert_eq!(act, Activation::Restored);
    assert_eq!(hero.status(), HeroStatus::Revealed);
    assert_eq!(driver.state(&params().letter_target(1)).unwrap().opacity, 1.0);
}

#[test]
fn deactivate_hides_letters_but_keeps_the_signal() {
    let mut session = Session::default();
    let mut driver = RecordingDriver::new();
    let mut hero = HeroReveal::new(params());
    hero.activate(Millis(0), &mut session, MotionMode::SkipToFinal, &mut driver)
        .unwrap();
    hero.deactivate(&mut driver);

    let t = params().letter_target(0);
    assert!(!driver.is_visible(&t));
    assert_eq!(driver.kills(&t), 1);
    assert_eq!(hero.status(), HeroStatus::Idle);
    assert!(session.is_set(Topic::NameReady));
}

#[test]
fn huge_timings_saturate_instead_of_overflowing() {
    let params = HeroParams {
        letters: 3,
        stagger_ms: u64::MAX / 2,
        letter_ms: u64::MAX,
        ..HeroParams::default()
    };
    assert_eq!(params.total_ms(), u64::MAX);
    let def = params.timeline_def();
    assert!(def.validate().is_ok());

    let timeline = TimelineBuilder::new(&def).build().unwrap();
    let end = timeline.terminal();
    for i in 0..3 {
        assert_eq!(end[&params.letter_target(i)].opacity, 1.0);
    }
}

#[test]
fn zero_letters_is_a_config_error() {
    let mut hero = HeroReveal::new(HeroParams {
        letters: 0,
        ..HeroParams::default()
    });
    let err = hero
        .activate(
            Millis(0),
            &mut Session::default(),
            MotionMode::Full,
            &mut RecordingDriver::new(),
        )
        .unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
}
