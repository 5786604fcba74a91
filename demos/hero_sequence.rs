use std::{
    future::Future,
    pin::pin,
    task::{Context, Poll, Waker},
};

use scrollwork::{
    ChoreoConfig, Millis, Readiness, RecordingDriver, Rect, Stage, StaticLayout, Topic, Viewport,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let viewport = Viewport::new(1440.0, 900.0);
    let config = ChoreoConfig::default();
    let dot = |c: (f64, f64)| Rect::from_center_size(c, (config.dot.size_px, config.dot.size_px));

    // The resting anchor lives in a section that mounts late.
    let mut probe = StaticLayout::new(viewport)
        .with_box("hero-name-dot", dot((700.0, 120.0)))
        .with_box("experience-title", Rect::new(200.0, 400.0, 600.0, 460.0))
        .with_box("portfolio-header", Rect::new(0.0, 1900.0, 1440.0, 2000.0))
        .with_box("engineer-stack", Rect::new(0.0, 3000.0, 1440.0, 3600.0));
    let rest_mounted: Readiness<Rect> = Readiness::new();
    let mut rest_wait = pin!(rest_mounted.wait());
    let mut cx = Context::from_waker(Waker::noop());
    let mut rest_seen = false;

    let mut driver = RecordingDriver::new();
    let mut stage = Stage::new(config.clone(), viewport)?;
    let report = stage.mount(Millis(0), 0.0, &mut probe, &mut driver);
    println!("mount: {}", serde_json::to_string(&report)?);

    let mut name_ready = stage.session().signals().subscribe(Topic::NameReady);
    let mut dot_done = stage.session().signals().subscribe(Topic::DotAnimationComplete);

    let mut now = Millis(0);
    while now.0 <= 8000 {
        if now.0 == 400 {
            rest_mounted.resolve(dot((760.0, 140.0)));
        }
        if !rest_seen && let Poll::Ready(rect) = rest_wait.as_mut().poll(&mut cx) {
            probe.insert("dot-rest", rect);
            stage.dot().anchors_ready().resolve(());
            rest_seen = true;
        }

        stage.tick(now, &mut probe, &mut driver);
        if name_ready.poll_rising(stage.session().signals()) {
            println!("{:>5}ms name revealed", now.0);
        }
        if dot_done.poll_rising(stage.session().signals()) {
            println!("{:>5}ms dot resting", now.0);
        }
        now = now.add(16);
    }

    for y in [0.0, 1400.0, 2600.0, 5000.0, 200.0] {
        stage.scroll(y, &mut driver);
        println!(
            "scroll {y:>6}: {}",
            serde_json::to_string(&stage.session().signals().snapshot())?
        );
    }

    stage.unmount(&mut driver);
    println!("writes: {}", driver.writes());
    Ok(())
}
