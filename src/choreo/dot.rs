use std::collections::BTreeMap;

use crate::{
    animation::{ease::Ease, visual::VisualState},
    choreo::{Activation, Playback, apply_states, key, motion_for},
    coord::{
        readiness::{Readiness, RetryDecision, RetryPolicy, RetryState},
        session::{CacheSlot, Session},
        signal::Topic,
    },
    driver::{AnimationDriver, Property, PropertyValue, TargetId, kill_and_hide},
    foundation::core::{DeviceClass, Millis, Point, Rgba8, Size},
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::{
        sampler::{AnchorRequest, AnchorSource, BoxPoint, GeometrySampler, LayoutProbe},
        snapshot::{AnchorId, GeometrySnapshot},
    },
    progress::trigger::TriggerPolicy,
    timeline::{
        builder::{MotionMode, Timeline, TimelineBuilder},
        def::{LaneDef, PhaseDef, PhaseKeysDef, PointDef, Responsive, StateDef, TimelineDef},
    },
};

/// Anchor the dot starts on.
pub const ORIGIN: &str = "dot-origin";
/// First hop.
pub const TARGET_1: &str = "dot-target-1";
/// Second hop.
pub const TARGET_2: &str = "dot-target-2";
/// Where the dot comes to rest.
pub const REST: &str = "dot-rest";

/// Observable state of the letter dot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotState {
    /// Not started.
    #[default]
    Idle,
    /// Wiggling on its letter.
    WigglingOnAnchor,
    /// Arcing toward the first hop.
    LaunchingToTarget1,
    /// Squashing on the first hop.
    LandingOnTarget1,
    /// Arcing toward the second hop.
    LaunchingToTarget2,
    /// Squashing on the second hop.
    LandingOnTarget2,
    /// Leaving through the top of the viewport.
    ExitingOffscreen,
    /// Invisible pause.
    Hidden,
    /// Reappearing above its resting anchor.
    RespawningAboveViewport,
    /// Bouncing down onto its resting anchor.
    FallingToFinal,
    /// Terminal.
    Resting,
}

impl DotState {
    /// Phase name used in the generated timeline.
    pub fn phase_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WigglingOnAnchor => "wiggling_on_anchor",
            Self::LaunchingToTarget1 => "launching_to_target_1",
            Self::LandingOnTarget1 => "landing_on_target_1",
            Self::LaunchingToTarget2 => "launching_to_target_2",
            Self::LandingOnTarget2 => "landing_on_target_2",
            Self::ExitingOffscreen => "exiting_offscreen",
            Self::Hidden => "hidden",
            Self::RespawningAboveViewport => "respawning_above_viewport",
            Self::FallingToFinal => "falling_to_final",
            Self::Resting => "resting",
        }
    }
}

/// Durations and shape of the dot flight for one device class.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DotParams {
    /// Wiggle on the origin letter.
    pub wiggle_ms: u64,
    /// One arc between anchors.
    pub launch_ms: u64,
    /// One landing squash.
    pub land_ms: u64,
    /// Flight out of the viewport.
    pub exit_ms: u64,
    /// Invisible pause.
    pub hidden_ms: u64,
    /// Fade-in above the resting anchor.
    pub respawn_ms: u64,
    /// Bouncing fall.
    pub fall_ms: u64,
    /// Wiggle amplitude.
    pub wiggle_deg: f64,
    /// Height of each arc above the higher of its two ends.
    pub arc_height_px: f64,
    /// Scale at the deepest point of a landing.
    pub squash_scale: f64,
    /// Distance above the viewport top used for exit and respawn.
    pub offscreen_margin_px: f64,
    /// Color while flying.
    pub start_color: String,
    /// Color once resting.
    pub end_color: String,
    /// Delay after `NameReady` that lets layout settle before measuring.
    pub settle_ms: u64,
}

impl Default for DotParams {
    fn default() -> Self {
        Self {
            wiggle_ms: 700,
            launch_ms: 550,
            land_ms: 250,
            exit_ms: 500,
            hidden_ms: 300,
            respawn_ms: 250,
            fall_ms: 1100,
            wiggle_deg: 14.0,
            arc_height_px: 140.0,
            squash_scale: 0.75,
            offscreen_margin_px: 120.0,
            start_color: "#f5f5f5".to_string(),
            end_color: "#ff5a36".to_string(),
            settle_ms: 32,
        }
    }
}

impl DotParams {
    /// Every phase must last and colors must parse.
    pub fn validate(&self) -> ChoreoResult<()> {
        let durations = [
            ("wiggle_ms", self.wiggle_ms),
            ("launch_ms", self.launch_ms),
            ("land_ms", self.land_ms),
            ("exit_ms", self.exit_ms),
            ("hidden_ms", self.hidden_ms),
            ("respawn_ms", self.respawn_ms),
            ("fall_ms", self.fall_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(ChoreoError::config(format!("dot {name} must be > 0")));
        }
        if !(self.squash_scale > 0.0) {
            return Err(ChoreoError::config("dot squash_scale must be > 0"));
        }
        Rgba8::from_hex(&self.start_color)?;
        Rgba8::from_hex(&self.end_color)?;
        Ok(())
    }
}

/// Everything the dot choreography needs besides the session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DotConfig {
    /// Driver target of the dot element.
    pub target: TargetId,
    /// Side of the (square) dot element.
    pub size_px: f64,
    /// Where each named anchor is measured from.
    pub anchors: Vec<AnchorRequest>,
    /// Per-device timing.
    pub params: Responsive<DotParams>,
}

impl Default for DotConfig {
    fn default() -> Self {
        let top_center = |id: &str, element: &str| AnchorRequest {
            id: AnchorId::new(id),
            source: AnchorSource::Element {
                element: AnchorId::new(element),
                point: BoxPoint::TopCenter,
            },
        };
        Self {
            target: TargetId::new("letter-dot"),
            size_px: 14.0,
            anchors: vec![
                AnchorRequest::element(ORIGIN, "hero-name-dot"),
                top_center(TARGET_1, "experience-title"),
                top_center(TARGET_2, "work-title"),
                AnchorRequest::element(REST, "dot-rest"),
            ],
            params: Responsive::uniform(DotParams::default()),
        }
    }
}

impl DotConfig {
    /// Check sizes, timings and that origin and rest anchors are requested.
    pub fn validate(&self) -> ChoreoResult<()> {
        if !(self.size_px.is_finite() && self.size_px > 0.0) {
            return Err(ChoreoError::config("dot size_px must be > 0"));
        }
        for id in [ORIGIN, REST] {
            if !self.anchors.iter().any(|a| a.id.as_str() == id) {
                return Err(ChoreoError::config(format!("dot anchor '{id}' is not requested")));
            }
        }
        for p in self.params.variants() {
            p.validate()?;
        }
        Ok(())
    }

    fn element_size(&self) -> Size {
        Size::new(self.size_px, self.size_px)
    }

    /// Timeline of the whole flight for `geometry`, with the dot state of each phase.
    ///
    /// `None` when the origin or the rest anchor is missing. Missing hop targets drop their
    /// launch and landing phases.
    pub fn timeline_def(
        &self,
        params: &DotParams,
        geometry: &GeometrySnapshot,
    ) -> Option<(TimelineDef, Vec<DotState>, u64)> {
        let origin = geometry.anchor_named(ORIGIN)?;
        let rest = geometry.anchor_named(REST)?;
        let half = self.size_px / 2.0;
        let anchored = |id: &str| PointDef::Anchor {
            anchor: AnchorId::new(id),
            offset: [-half, -half],
        };
        let above_viewport = -(params.offscreen_margin_px + self.size_px);
        let move_to = |p: PointDef| StateDef {
            translate: Some(p),
            ..StateDef::default()
        };
        let scale = |s: f64| StateDef {
            scale: Some(s),
            ..StateDef::default()
        };
        let rotate = |deg: f64| StateDef {
            rotation_deg: Some(deg),
            ..StateDef::default()
        };

        let mut phases: Vec<(DotState, u64)> = Vec::new();
        let mut motion: Vec<PhaseKeysDef> = Vec::new();
        let mut push = |state: DotState, ms: u64, keys| {
            phases.push((state, ms));
            motion.push(PhaseKeysDef {
                phase: state.phase_name().to_string(),
                keys,
            });
        };

        let w = params.wiggle_deg;
        push(
            DotState::WigglingOnAnchor,
            params.wiggle_ms,
            vec![
                key(0.0, rotate(0.0), Ease::InOutSine),
                key(0.25, rotate(w), Ease::InOutSine),
                key(0.5, rotate(-w), Ease::InOutSine),
                key(0.75, rotate(w / 2.0), Ease::InOutSine),
                key(1.0, rotate(0.0), Ease::Linear),
            ],
        );

        let mut last = (origin, anchored(ORIGIN));
        let hops = [
            (TARGET_1, DotState::LaunchingToTarget1, DotState::LandingOnTarget1),
            (TARGET_2, DotState::LaunchingToTarget2, DotState::LandingOnTarget2),
        ];
        for (id, launch, land) in hops {
            let Some(to) = geometry.anchor_named(id) else {
                tracing::debug!(anchor = id, "skipping dot hop without a target");
                continue;
            };
            let peak = Point::new(
                (last.0.x + to.x) / 2.0 - half,
                last.0.y.min(to.y) - params.arc_height_px - half,
            );
            push(
                launch,
                params.launch_ms,
                vec![
                    key(0.0, move_to(last.1.clone()), Ease::OutQuad),
                    key(0.5, move_to(PointDef::Xy([peak.x, peak.y])), Ease::InQuad),
                    key(1.0, move_to(anchored(id)), Ease::Linear),
                ],
            );
            push(
                land,
                params.land_ms,
                vec![
                    key(0.0, scale(1.0), Ease::OutQuad),
                    key(0.35, scale(params.squash_scale), Ease::OutBack),
                    key(1.0, scale(1.0), Ease::Linear),
                ],
            );
            last = (to, anchored(id));
        }

        push(
            DotState::ExitingOffscreen,
            params.exit_ms,
            vec![key(
                1.0,
                move_to(PointDef::Xy([last.0.x - half, above_viewport])),
                Ease::Linear,
            )],
        );
        push(
            DotState::Hidden,
            params.hidden_ms,
            vec![key(
                0.0,
                StateDef {
                    opacity: Some(0.0),
                    ..StateDef::default()
                },
                Ease::Linear,
            )],
        );
        push(
            DotState::RespawningAboveViewport,
            params.respawn_ms,
            vec![
                key(
                    0.0,
                    StateDef {
                        translate: Some(PointDef::Xy([rest.x - half, above_viewport])),
                        opacity: Some(0.0),
                        ..StateDef::default()
                    },
                    Ease::OutQuad,
                ),
                key(
                    1.0,
                    StateDef {
                        opacity: Some(1.0),
                        ..StateDef::default()
                    },
                    Ease::Linear,
                ),
            ],
        );
        push(
            DotState::FallingToFinal,
            params.fall_ms,
            vec![
                key(0.0, StateDef::default(), Ease::OutBounce),
                key(1.0, move_to(anchored(REST)), Ease::Linear),
            ],
        );

        let color = |hex: &str| StateDef {
            color: Some(hex.to_string()),
            ..StateDef::default()
        };
        let lanes = vec![
            LaneDef {
                target: self.target.clone(),
                requires: vec![AnchorId::new(REST)],
                initial: StateDef {
                    translate: Some(anchored(ORIGIN)),
                    scale: Some(1.0),
                    rotation_deg: Some(0.0),
                    opacity: Some(1.0),
                    ..StateDef::default()
                },
                variants: Responsive::uniform(motion),
            },
            LaneDef {
                target: self.target.clone(),
                requires: Vec::new(),
                initial: color(&params.start_color),
                variants: Responsive::uniform(vec![PhaseKeysDef {
                    phase: DotState::FallingToFinal.phase_name().to_string(),
                    keys: vec![
                        key(0.0, color(&params.start_color), Ease::InOutSine),
                        key(1.0, color(&params.end_color), Ease::Linear),
                    ],
                }]),
            },
        ];

        let total = phases.iter().map(|(_, ms)| ms).sum();
        let def = TimelineDef {
            name: "letter-dot".to_string(),
            phases: phases
                .iter()
                .map(|(state, ms)| PhaseDef {
                    name: state.phase_name().to_string(),
                    weight: *ms as f64,
                    ease: Ease::Linear,
                })
                .collect(),
            lanes,
            policy: TriggerPolicy::Reversible,
            rest_phase: None,
        };
        Some((def, phases.into_iter().map(|(s, _)| s).collect(), total))
    }
}

#[derive(Clone, Debug)]
enum Step {
    Inactive,
    AwaitingName,
    Settling {
        until: Millis,
    },
    Sampling {
        retry: RetryState,
        restore: bool,
    },
    Playing {
        playback: Playback,
        phases: Vec<DotState>,
        geometry: GeometrySnapshot,
    },
    Resting {
        geometry: GeometrySnapshot,
    },
    GaveUp {
        restore: bool,
    },
}

/// The letter-dot state machine.
///
/// Gated by `NameReady`, driven by [`DotChoreography::tick`]. Publishes
/// `DotAnimationComplete` once resting; later activations in the same session restore the
/// resting state without replaying.
///
/// Anchors are sampled on the [`RetryPolicy`] schedule. A host that knows when the anchor
/// elements mount resolves [`DotChoreography::anchors_ready`] instead, which samples on the
/// next tick, even after the retry budget ran out.
#[derive(Clone, Debug)]
pub struct DotChoreography {
    config: DotConfig,
    sampler: GeometrySampler,
    retry: RetryPolicy,
    reduced_motion: bool,
    step: Step,
    state: DotState,
    interpolated_frames: u64,
    anchors_ready: Readiness<()>,
    ready_seen: bool,
}

impl DotChoreography {
    /// Inactive choreography.
    pub fn new(
        config: DotConfig,
        sampler: GeometrySampler,
        retry: RetryPolicy,
        reduced_motion: bool,
    ) -> Self {
        Self {
            config,
            sampler,
            retry,
            reduced_motion,
            step: Step::Inactive,
            state: DotState::Idle,
            interpolated_frames: 0,
            anchors_ready: Readiness::new(),
            ready_seen: false,
        }
    }

    /// Handle resolved by the host once the anchor elements are mounted.
    pub fn anchors_ready(&self) -> Readiness<()> {
        self.anchors_ready.clone()
    }

    /// Current state.
    pub fn state(&self) -> DotState {
        self.state
    }

    /// Driver target of the dot.
    pub fn target(&self) -> &TargetId {
        &self.config.target
    }

    /// Frames written between the initial and final states.
    pub fn interpolated_frames(&self) -> u64 {
        self.interpolated_frames
    }

    /// Resting anchor the dot is centered on, once resting.
    pub fn resting_anchor(&self) -> Option<Point> {
        match &self.step {
            Step::Resting { geometry } => geometry.anchor_named(REST),
            _ => None,
        }
    }

    /// `true` when sampling ran out of retry budget.
    pub fn gave_up(&self) -> bool {
        matches!(self.step, Step::GaveUp { .. })
    }

    /// Start the choreography.
    ///
    /// Phones, reduced motion and sessions where the dot already rested restore the final
    /// state within this call when geometry is available.
    #[tracing::instrument(skip_all, fields(target = %self.config.target))]
    pub fn activate<P, D>(
        &mut self,
        now: Millis,
        session: &mut Session,
        probe: &mut P,
        driver: &mut D,
    ) -> ChoreoResult<Activation>
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        self.config.validate()?;
        self.state = DotState::Idle;
        self.ready_seen = false;
        let viewport = probe.viewport();
        let device = session.breakpoints().classify(viewport.width);
        let instant = session.dot_ever_completed()
            || motion_for(device, self.reduced_motion) == MotionMode::SkipToFinal;

        if instant {
            let cached = session
                .cached_geometry(CacheSlot::Dot, &viewport)
                .filter(has_endpoints);
            let geometry = match cached {
                Some(g) => Some(g),
                None => self.sample(now, probe),
            };
            if let Some(geometry) = geometry {
                self.restore(geometry, session, driver)?;
                return Ok(Activation::Restored);
            }
            let mut retry = RetryState::default();
            retry.poll(&self.retry, now);
            self.step = Step::Sampling {
                retry,
                restore: true,
            };
            hide(driver, &self.config.target);
            return Ok(Activation::Unavailable);
        }

        hide(driver, &self.config.target);
        self.step = if session.is_set(Topic::NameReady) {
            Step::Settling {
                until: now.add(self.settle_ms(device)),
            }
        } else {
            Step::AwaitingName
        };
        Ok(Activation::Waiting)
    }

    /// Advance the state machine.
    pub fn tick<P, D>(
        &mut self,
        now: Millis,
        session: &mut Session,
        probe: &mut P,
        driver: &mut D,
    ) -> ChoreoResult<DotState>
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        loop {
            let step = std::mem::replace(&mut self.step, Step::Inactive);
            self.step = match step {
                Step::AwaitingName if session.is_set(Topic::NameReady) => {
                    let device = session.breakpoints().classify(probe.viewport().width);
                    Step::Settling {
                        until: now.add(self.settle_ms(device)),
                    }
                }
                Step::Settling { until } if now >= until => Step::Sampling {
                    retry: RetryState::default(),
                    restore: false,
                },
                Step::GaveUp { restore } if self.take_ready() => {
                    tracing::debug!("dot anchors reported ready after giving up");
                    Step::Sampling {
                        retry: RetryState::default(),
                        restore,
                    }
                }
                Step::Sampling { mut retry, restore } => {
                    let decision = if self.take_ready() {
                        RetryDecision::Attempt
                    } else {
                        retry.poll(&self.retry, now)
                    };
                    match decision {
                        RetryDecision::Attempt => match self.sample(now, probe) {
                            Some(geometry) if restore => {
                                self.restore(geometry, session, driver)?;
                            }
                            Some(geometry) => self.start(now, geometry, session, driver)?,
                            None => self.step = Step::Sampling { retry, restore },
                        },
                        RetryDecision::Wait => self.step = Step::Sampling { retry, restore },
                        RetryDecision::GiveUp => {
                            tracing::warn!(
                                attempts = retry.attempts(),
                                "dot anchors never appeared; staying idle"
                            );
                            self.step = Step::GaveUp { restore };
                        }
                    }
                    break;
                }
                Step::Playing {
                    playback,
                    phases,
                    geometry,
                } => {
                    if playback.is_finished(now) {
                        let terminal = playback.timeline().terminal();
                        self.finish(&terminal, geometry, session, driver);
                    } else {
                        let frame = playback.frame(now);
                        apply_states(driver, &frame.states);
                        self.interpolated_frames += 1;
                        self.state = phases.get(frame.hit.index).copied().unwrap_or(self.state);
                        self.step = Step::Playing {
                            playback,
                            phases,
                            geometry,
                        };
                    }
                    break;
                }
                other => {
                    self.step = other;
                    break;
                }
            };
        }
        Ok(self.state)
    }

    /// Kill every tween on the dot and hide it. Clears `DotAnimationComplete`.
    pub fn deactivate<D: AnimationDriver + ?Sized>(&mut self, session: &mut Session, driver: &mut D) {
        kill_and_hide(driver, &self.config.target);
        self.step = Step::Inactive;
        self.state = DotState::Idle;
        self.ready_seen = false;
        session.signals_mut().reset(Topic::DotAnimationComplete);
    }

    /// Re-measure after a resize and move the dot to its new coordinates without replaying.
    ///
    /// Returns `true` when the dot moved.
    pub fn reposition<P, D>(
        &mut self,
        now: Millis,
        session: &mut Session,
        probe: &mut P,
        driver: &mut D,
    ) -> ChoreoResult<bool>
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        match &self.step {
            Step::Resting { .. } => {
                let Some(geometry) = self.sample(now, probe) else {
                    return Ok(false);
                };
                self.restore(geometry, session, driver)?;
                Ok(true)
            }
            Step::Playing { playback, .. } => {
                let Some(geometry) = self.sample(now, probe) else {
                    return Ok(false);
                };
                let started = playback.started();
                self.start(started, geometry, session, driver)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// `true` once per resolution of `anchors_ready`.
    fn take_ready(&mut self) -> bool {
        if self.ready_seen || !self.anchors_ready.is_ready() {
            return false;
        }
        self.ready_seen = true;
        true
    }

    fn settle_ms(&self, device: DeviceClass) -> u64 {
        self.config.params.select(device).settle_ms
    }

    fn sample<P: LayoutProbe + ?Sized>(&self, now: Millis, probe: &mut P) -> Option<GeometrySnapshot> {
        let geometry =
            self.sampler
                .sample(probe, &self.config.anchors, self.config.element_size(), now);
        has_endpoints(&geometry).then_some(geometry)
    }

    fn build(
        &self,
        geometry: &GeometrySnapshot,
        motion: MotionMode,
        device: DeviceClass,
    ) -> ChoreoResult<(Timeline, Vec<DotState>, u64)> {
        let params = self.config.params.select(device);
        let (def, phases, total) = self
            .config
            .timeline_def(params, geometry)
            .ok_or_else(|| ChoreoError::geometry("dot origin or rest anchor missing"))?;
        let timeline = TimelineBuilder::new(&def)
            .device(device)
            .motion(motion)
            .geometry(geometry)
            .build()?;
        Ok((timeline, phases, total))
    }

    fn start<D: AnimationDriver + ?Sized>(
        &mut self,
        started: Millis,
        geometry: GeometrySnapshot,
        session: &mut Session,
        driver: &mut D,
    ) -> ChoreoResult<()> {
        let device = session.breakpoints().classify(geometry.viewport.width);
        let (timeline, phases, total) = self.build(&geometry, MotionMode::Full, device)?;
        session.store_geometry(CacheSlot::Dot, geometry.clone());
        apply_states(driver, &timeline.initial());
        self.state = phases.first().copied().unwrap_or(DotState::WigglingOnAnchor);
        tracing::debug!(total_ms = total, phases = phases.len(), "dot flight started");
        self.step = Step::Playing {
            playback: Playback::new(timeline, started, total),
            phases,
            geometry,
        };
        Ok(())
    }

    fn restore<D: AnimationDriver + ?Sized>(
        &mut self,
        geometry: GeometrySnapshot,
        session: &mut Session,
        driver: &mut D,
    ) -> ChoreoResult<()> {
        let device = session.breakpoints().classify(geometry.viewport.width);
        let (timeline, _, _) = self.build(&geometry, MotionMode::SkipToFinal, device)?;
        session.store_geometry(CacheSlot::Dot, geometry.clone());
        self.finish(&timeline.terminal(), geometry, session, driver);
        Ok(())
    }

    fn finish<D: AnimationDriver + ?Sized>(
        &mut self,
        terminal: &BTreeMap<TargetId, VisualState>,
        geometry: GeometrySnapshot,
        session: &mut Session,
        driver: &mut D,
    ) {
        apply_states(driver, terminal);
        self.state = DotState::Resting;
        self.step = Step::Resting { geometry };
        session.mark_dot_completed();
        if session.signals_mut().publish(Topic::DotAnimationComplete) {
            tracing::info!("letter dot resting");
        }
    }
}

fn has_endpoints(geometry: &GeometrySnapshot) -> bool {
    geometry.anchor_named(ORIGIN).is_some() && geometry.anchor_named(REST).is_some()
}

fn hide<D: AnimationDriver + ?Sized>(driver: &mut D, target: &TargetId) {
    driver.set(target, Property::Opacity, PropertyValue::Number(0.0));
    driver.set(target, Property::Visibility, PropertyValue::Visible(false));
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/dot.rs"]
mod tests;
