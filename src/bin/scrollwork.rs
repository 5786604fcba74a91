use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scrollwork::{
    Breakpoints, ChoreoConfig, DeviceClass, GeometrySnapshot, Millis, MotionMode, Rect,
    RecordingDriver, Session, StaticLayout, TimelineBuilder, TimelineDef, Topic, Viewport,
    choreo::dot::{DotChoreography, DotState},
};

#[derive(Parser, Debug)]
#[command(name = "scrollwork", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a timeline definition at one progress value and print the frame as JSON.
    Sample(SampleArgs),
    /// Simulate the letter-dot flight in a static layout and print its resting state.
    Dot(DotArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Timeline definition JSON.
    #[arg(long)]
    timeline: PathBuf,

    /// Overall progress; clamped to [0, 1].
    #[arg(long)]
    progress: f64,

    /// Device class variant to build.
    #[arg(long, default_value = "desktop")]
    device: DeviceClass,

    /// Geometry snapshot JSON for anchor-relative positions.
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Build with every lane collapsed to its final state.
    #[arg(long)]
    skip_to_final: bool,
}

#[derive(Parser, Debug)]
struct DotArgs {
    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, default_value = "1440x900", value_parser = parse_size)]
    viewport: (f64, f64),

    /// Resting anchor center as X,Y; the dot also starts there.
    #[arg(long, value_parser = parse_point)]
    anchor: (f64, f64),

    /// Hop targets as X,Y (at most two).
    #[arg(long = "hop", value_parser = parse_point)]
    hops: Vec<(f64, f64)>,

    /// Dot side in pixels.
    #[arg(long, default_value_t = 64.0)]
    size: f64,

    /// Treat the viewport as a phone.
    #[arg(long)]
    mobile: bool,

    /// Configuration JSON; defaults otherwise.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sample(args) => cmd_sample(args),
        Command::Dot(args) => cmd_dot(args),
        Command::Config => cmd_config(),
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if !(w > 0.0 && h > 0.0) {
        return Err("viewport dimensions must be > 0".to_string());
    }
    Ok((w, h))
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("y: {e}"))?;
    Ok((x, y))
}

fn read_to_string(path: &PathBuf, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {what} '{}'", path.display()))
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let def = TimelineDef::from_json_str(&read_to_string(&args.timeline, "timeline")?)
        .with_context(|| format!("load timeline '{}'", args.timeline.display()))?;
    let geometry: Option<GeometrySnapshot> = match &args.geometry {
        Some(path) => Some(
            serde_json::from_str(&read_to_string(path, "geometry")?)
                .context("parse geometry JSON")?,
        ),
        None => None,
    };

    let motion = if args.skip_to_final {
        MotionMode::SkipToFinal
    } else {
        MotionMode::Full
    };
    let mut builder = TimelineBuilder::new(&def).device(args.device).motion(motion);
    if let Some(g) = &geometry {
        builder = builder.geometry(g);
    }
    let timeline = builder.build()?;
    for target in timeline.skipped() {
        eprintln!("skipped lane for '{target}' (anchors not measured)");
    }

    let frame = timeline.evaluate(args.progress);
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}

fn cmd_dot(args: DotArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.hops.len() <= 2, "at most two --hop targets");
    let mut config = match &args.config {
        Some(path) => ChoreoConfig::from_json_str(&read_to_string(path, "config")?)?,
        None => ChoreoConfig::default(),
    };
    let (width, height) = args.viewport;
    if args.mobile {
        config.breakpoints = Breakpoints {
            mobile_max: width,
            tablet_max: width + 1.0,
        };
    }
    config.dot.size_px = args.size;
    config.validate()?;

    let (ax, ay) = args.anchor;
    let square = Rect::from_center_size((ax, ay), (args.size, args.size));
    let mut probe = StaticLayout::new(Viewport::new(width, height))
        .with_box("hero-name-dot", square)
        .with_box("dot-rest", square);
    for ((x, y), element) in args.hops.iter().zip(["experience-title", "work-title"]) {
        probe.insert(element, Rect::new(x - 1.0, *y, x + 1.0, y + 2.0));
    }

    let mut session = Session::init(&config);
    session.signals_mut().publish(Topic::NameReady);
    let mut driver = RecordingDriver::new();
    let mut dot = DotChoreography::new(
        config.dot.clone(),
        config.sampler(),
        config.retry,
        config.reduced_motion,
    );

    let activation = dot.activate(Millis(0), &mut session, &mut probe, &mut driver)?;
    let mut now = Millis(0);
    while dot.state() != DotState::Resting && !dot.gave_up() && now.0 < 60_000 {
        now = now.add(16);
        dot.tick(now, &mut session, &mut probe, &mut driver)?;
    }

    let state = driver.state(dot.target());
    let center = state.map(|s| [s.translate.x + args.size / 2.0, s.translate.y + args.size / 2.0]);
    let report = serde_json::json!({
        "activation": activation,
        "state": dot.state(),
        "elapsed_ms": now.0,
        "resting_center": center,
        "ever_completed": session.dot_ever_completed(),
        "interpolated_frames": dot.interpolated_frames(),
        "signals": session.signals().snapshot(),
        "visual_state": state,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    println!("{}", ChoreoConfig::default().to_json_pretty()?);
    Ok(())
}
