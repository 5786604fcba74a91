use crate::{
    animation::ease::Ease,
    choreo::{Activation, ScrollPlayer, SectionTrigger, apply_states, key, motion_for, section_geometry},
    coord::{
        session::{CacheSlot, Session},
        signal::Topic,
    },
    driver::{AnimationDriver, TargetId, kill_and_hide},
    foundation::core::Millis,
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::{
        sampler::{GeometrySampler, LayoutProbe},
        snapshot::AnchorId,
    },
    progress::trigger::{ScrollTrigger, TriggerPolicy, TriggerUpdate},
    timeline::{
        builder::{MotionMode, TimelineBuilder},
        def::{LaneDef, PhaseDef, PhaseKeysDef, PointDef, Responsive, StateDef, TimelineDef},
    },
};

/// Portfolio header reveal settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Scroll range of the header.
    pub trigger: SectionTrigger,
    /// Stages of the reveal.
    pub timeline: TimelineDef,
    /// Stage whose start publishes `PortfolioRevealComplete`. Skipped motion rests at the end
    /// of the timeline's `rest_phase`.
    pub complete_phase: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            trigger: SectionTrigger {
                element: AnchorId::new("portfolio-header"),
                start_vh: 0.8,
                length_px: 1400.0,
            },
            timeline: default_timeline(),
            complete_phase: "hold".to_string(),
        }
    }
}

impl RevealConfig {
    /// Validate the timeline and check that the completion stage exists.
    pub fn validate(&self) -> ChoreoResult<()> {
        self.timeline.validate()?;
        if !self.timeline.phases.iter().any(|p| p.name == self.complete_phase) {
            return Err(ChoreoError::config(format!(
                "reveal has no phase '{}'",
                self.complete_phase
            )));
        }
        if !(self.trigger.length_px > 0.0) {
            return Err(ChoreoError::config("reveal length_px must be > 0"));
        }
        Ok(())
    }
}

/// Four unevenly weighted stages: the title enters, the object enters, both hold, both exit.
pub fn default_timeline() -> TimelineDef {
    let phase = |name: &str, weight: f64| PhaseDef {
        name: name.to_string(),
        weight,
        ease: Ease::Linear,
    };
    let shown = StateDef {
        translate: Some(PointDef::Xy([0.0, 0.0])),
        scale: Some(1.0),
        blur_px: Some(0.0),
        opacity: Some(1.0),
        ..StateDef::default()
    };
    let keys = |phase: &str, from_ease: Ease, to: StateDef| PhaseKeysDef {
        phase: phase.to_string(),
        keys: vec![key(0.0, StateDef::default(), from_ease), key(1.0, to, Ease::Linear)],
    };

    TimelineDef {
        name: "portfolio-header".to_string(),
        phases: vec![
            phase("title-enter", 1.0),
            phase("object-enter", 1.5),
            phase("hold", 2.0),
            phase("exit", 1.0),
        ],
        lanes: vec![
            LaneDef {
                target: TargetId::new("portfolio-title"),
                requires: Vec::new(),
                initial: StateDef {
                    translate: Some(PointDef::Xy([0.0, 60.0])),
                    scale: Some(1.0),
                    blur_px: Some(12.0),
                    opacity: Some(0.0),
                    ..StateDef::default()
                },
                variants: Responsive::uniform(vec![
                    keys("title-enter", Ease::OutCubic, shown.clone()),
                    keys(
                        "exit",
                        Ease::InQuad,
                        StateDef {
                            translate: Some(PointDef::Xy([0.0, -80.0])),
                            opacity: Some(0.0),
                            ..StateDef::default()
                        },
                    ),
                ]),
            },
            LaneDef {
                target: TargetId::new("portfolio-object"),
                requires: Vec::new(),
                initial: StateDef {
                    translate: Some(PointDef::Xy([0.0, 0.0])),
                    scale: Some(0.6),
                    blur_px: Some(12.0),
                    opacity: Some(0.0),
                    ..StateDef::default()
                },
                variants: Responsive::uniform(vec![
                    keys("object-enter", Ease::OutBack, shown),
                    keys(
                        "exit",
                        Ease::InQuad,
                        StateDef {
                            scale: Some(1.1),
                            opacity: Some(0.0),
                            ..StateDef::default()
                        },
                    ),
                ]),
            },
        ],
        policy: TriggerPolicy::ResetOnLeaveBack,
        rest_phase: Some("hold".to_string()),
    }
}

/// Scroll-driven portfolio header reveal.
#[derive(Clone, Debug)]
pub struct PortfolioReveal {
    config: RevealConfig,
    sampler: GeometrySampler,
    reduced_motion: bool,
    player: Option<ScrollPlayer>,
    complete_index: usize,
}

impl PortfolioReveal {
    /// Inactive reveal.
    pub fn new(config: RevealConfig, sampler: GeometrySampler, reduced_motion: bool) -> Self {
        Self {
            config,
            sampler,
            reduced_motion,
            player: None,
            complete_index: 0,
        }
    }

    /// Frames written between the initial and final states.
    pub fn interpolated_frames(&self) -> u64 {
        self.player.as_ref().map_or(0, ScrollPlayer::interpolated_frames)
    }

    /// Scroll range of the header, once measured.
    pub fn trigger(&self) -> Option<ScrollTrigger> {
        self.player.as_ref().map(ScrollPlayer::trigger)
    }

    /// `true` while a timeline is built.
    pub fn is_active(&self) -> bool {
        self.player.is_some()
    }

    /// Measure the header, build the timeline and write the state for `scroll_y`.
    ///
    /// Phones and reduced motion get the held state immediately, with both targets shown.
    #[tracing::instrument(skip_all, fields(scroll_y))]
    pub fn activate<P, D>(
        &mut self,
        now: Millis,
        scroll_y: f64,
        session: &mut Session,
        probe: &mut P,
        driver: &mut D,
    ) -> ChoreoResult<Activation>
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        self.config.validate()?;
        self.player = None;
        let viewport = probe.viewport();
        let device = session.breakpoints().classify(viewport.width);
        let motion = motion_for(device, self.reduced_motion);

        let Some(trigger) = section_geometry(
            now,
            scroll_y,
            CacheSlot::Reveal,
            &self.config.trigger,
            &self.sampler,
            session,
            probe,
        )
        .and_then(|g| self.config.trigger.resolve(&g)) else {
            tracing::warn!(element = %self.config.trigger.element, "portfolio header not mounted");
            return Ok(Activation::Unavailable);
        };

        let timeline = TimelineBuilder::new(&self.config.timeline)
            .device(device)
            .motion(motion)
            .viewport(viewport)
            .build()?;
        self.complete_index = timeline.phase_index(&self.config.complete_phase)?;

        if motion == MotionMode::SkipToFinal {
            apply_states(driver, &timeline.terminal());
            session.signals_mut().publish(Topic::PortfolioRevealComplete);
            self.player = Some(ScrollPlayer::new(timeline, trigger));
            return Ok(Activation::Restored);
        }

        self.player = Some(ScrollPlayer::new(timeline, trigger));
        self.scroll(scroll_y, session, driver);
        Ok(Activation::Playing)
    }

    /// Follow the scroll position.
    pub fn scroll<D: AnimationDriver + ?Sized>(
        &mut self,
        scroll_y: f64,
        session: &mut Session,
        driver: &mut D,
    ) -> Option<TriggerUpdate> {
        let player = self.player.as_mut()?;
        if player.timeline().motion() == MotionMode::SkipToFinal {
            return None;
        }
        let (update, frame) = player.update(scroll_y, driver);
        match frame {
            None => {
                session.signals_mut().reset(Topic::PortfolioRevealComplete);
                tracing::debug!("portfolio header reset on leave-back");
            }
            Some(frame) if frame.hit.index >= self.complete_index => {
                session.signals_mut().publish(Topic::PortfolioRevealComplete);
            }
            Some(_) => {}
        }
        Some(update)
    }

    /// Re-measure after a resize and rebuild the timeline for the new viewport.
    pub fn reposition<P, D>(
        &mut self,
        now: Millis,
        scroll_y: f64,
        session: &mut Session,
        probe: &mut P,
        driver: &mut D,
    ) -> ChoreoResult<Activation>
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        session.cache(CacheSlot::Reveal).invalidate();
        self.activate(now, scroll_y, session, probe, driver)
    }

    /// Kill and hide the header and clear its signal.
    pub fn deactivate<D: AnimationDriver + ?Sized>(&mut self, session: &mut Session, driver: &mut D) {
        for lane in &self.config.timeline.lanes {
            kill_and_hide(driver, &lane.target);
        }
        self.player = None;
        session.signals_mut().reset(Topic::PortfolioRevealComplete);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/reveal.rs"]
mod tests;
