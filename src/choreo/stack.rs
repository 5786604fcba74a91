use crate::{
    animation::ease::Ease,
    choreo::{Activation, ScrollPlayer, SectionTrigger, apply_states, key, section_geometry},
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
    progress::trigger::{TriggerPolicy, TriggerUpdate},
    timeline::{
        builder::{MotionMode, TimelineBuilder},
        def::{LaneDef, PhaseDef, PhaseKeysDef, PointDef, Responsive, StateDef, TimelineDef},
    },
};

/// Pinned card stack settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Scroll range while the stack is pinned.
    pub trigger: SectionTrigger,
    /// Target id prefix; card `i` is `{prefix}-{i}`.
    pub target_prefix: String,
    /// Number of cards, at least two.
    pub cards: usize,
    /// Vertical offset between stacked cards.
    pub card_offset_px: f64,
    /// Scale lost per card stacked on top.
    pub depth_scale: f64,
    /// Opacity lost per card stacked on top.
    pub depth_dim: f64,
    /// Ease of a card entering.
    pub enter_ease: Ease,
    /// Progress at which the sibling section is revealed.
    pub threshold: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            trigger: SectionTrigger {
                element: AnchorId::new("engineer-stack"),
                start_vh: 0.0,
                length_px: 2400.0,
            },
            target_prefix: "stack-card".to_string(),
            cards: 4,
            card_offset_px: 24.0,
            depth_scale: 0.05,
            depth_dim: 0.15,
            enter_ease: Ease::OutCubic,
            threshold: 0.75,
        }
    }
}

impl StackConfig {
    /// Check counts and ratios.
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.cards < 2 {
            return Err(ChoreoError::config("card stack needs at least two cards"));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ChoreoError::config("stack threshold must be in (0, 1]"));
        }
        let depth = (self.cards - 1) as f64;
        if !(0.0..1.0).contains(&(self.depth_scale * depth))
            || !(0.0..1.0).contains(&(self.depth_dim * depth))
        {
            return Err(ChoreoError::config(
                "stack depth_scale and depth_dim must keep every card visible",
            ));
        }
        if !(self.trigger.length_px > 0.0) {
            return Err(ChoreoError::config("stack length_px must be > 0"));
        }
        Ok(())
    }

    /// Target of card `index`.
    pub fn card_target(&self, index: usize) -> TargetId {
        TargetId::new(format!("{}-{index}", self.target_prefix))
    }

    /// One phase per incoming card. The entering card rises from below the viewport to its
    /// stacked offset while every card under it shrinks and dims by its depth.
    pub fn timeline_def(&self) -> TimelineDef {
        let phase_name = |i: usize| format!("card-{i}");
        let lanes = (0..self.cards)
            .map(|i| {
                let mut keys = Vec::new();
                if i > 0 {
                    keys.push(PhaseKeysDef {
                        phase: phase_name(i),
                        keys: vec![
                            key(0.0, StateDef::default(), self.enter_ease),
                            key(
                                1.0,
                                StateDef {
                                    translate: Some(PointDef::Xy([
                                        0.0,
                                        i as f64 * self.card_offset_px,
                                    ])),
                                    ..StateDef::default()
                                },
                                Ease::Linear,
                            ),
                        ],
                    });
                }
                for j in (i + 1)..self.cards {
                    let depth = (j - i) as f64;
                    keys.push(PhaseKeysDef {
                        phase: phase_name(j),
                        keys: vec![key(
                            1.0,
                            StateDef {
                                scale: Some(1.0 - depth * self.depth_scale),
                                opacity: Some(1.0 - depth * self.depth_dim),
                                ..StateDef::default()
                            },
                            Ease::Linear,
                        )],
                    });
                }
                let start = if i == 0 {
                    PointDef::Xy([0.0, 0.0])
                } else {
                    PointDef::Viewport { vw: 0.0, vh: 1.0 }
                };
                LaneDef {
                    target: self.card_target(i),
                    requires: Vec::new(),
                    initial: StateDef {
                        translate: Some(start),
                        scale: Some(1.0),
                        opacity: Some(1.0),
                        ..StateDef::default()
                    },
                    variants: Responsive::uniform(keys),
                }
            })
            .collect();

        TimelineDef {
            name: "card-stack".to_string(),
            phases: (1..self.cards)
                .map(|i| PhaseDef {
                    name: phase_name(i),
                    weight: 1.0,
                    ease: Ease::Linear,
                })
                .collect(),
            lanes,
            policy: TriggerPolicy::Reversible,
            rest_phase: None,
        }
    }
}

/// Scroll-driven card stacking; owns the `EngineerReveal` signal.
#[derive(Clone, Debug)]
pub struct CardStack {
    config: StackConfig,
    sampler: GeometrySampler,
    reduced_motion: bool,
    player: Option<ScrollPlayer>,
}

impl CardStack {
    /// Inactive stack.
    pub fn new(config: StackConfig, sampler: GeometrySampler, reduced_motion: bool) -> Self {
        Self {
            config,
            sampler,
            reduced_motion,
            player: None,
        }
    }

    /// Frames written between the initial and final states.
    pub fn interpolated_frames(&self) -> u64 {
        self.player.as_ref().map_or(0, ScrollPlayer::interpolated_frames)
    }

    /// Measure the section, build the timeline and write the state for `scroll_y`.
    #[tracing::instrument(skip_all, fields(cards = self.config.cards, scroll_y))]
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
        let motion = if self.reduced_motion {
            MotionMode::SkipToFinal
        } else {
            MotionMode::Full
        };

        let Some(trigger) = section_geometry(
            now,
            scroll_y,
            CacheSlot::Stack,
            &self.config.trigger,
            &self.sampler,
            session,
            probe,
        )
        .and_then(|g| self.config.trigger.resolve(&g)) else {
            tracing::warn!(element = %self.config.trigger.element, "card stack not mounted");
            return Ok(Activation::Unavailable);
        };

        let timeline = TimelineBuilder::new(&self.config.timeline_def())
            .device(device)
            .motion(motion)
            .viewport(viewport)
            .build()?;

        if motion == MotionMode::SkipToFinal {
            apply_states(driver, &timeline.terminal());
            session.signals_mut().publish(Topic::EngineerReveal);
            self.player = Some(ScrollPlayer::new(timeline, trigger));
            return Ok(Activation::Restored);
        }

        self.player = Some(ScrollPlayer::new(timeline, trigger));
        self.scroll(scroll_y, session, driver);
        Ok(Activation::Playing)
    }

    /// Follow the scroll position; publishes or clears `EngineerReveal` around the threshold.
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
        let (update, _) = player.update(scroll_y, driver);
        if update.progress.get() >= self.config.threshold {
            if session.signals_mut().publish(Topic::EngineerReveal) {
                tracing::debug!("engineer section revealed");
            }
        } else {
            session.signals_mut().reset(Topic::EngineerReveal);
        }
        Some(update)
    }

    /// Re-measure after a resize and rebuild the timeline.
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
        session.cache(CacheSlot::Stack).invalidate();
        self.activate(now, scroll_y, session, probe, driver)
    }

    /// Kill and hide every card and clear `EngineerReveal`.
    pub fn deactivate<D: AnimationDriver + ?Sized>(&mut self, session: &mut Session, driver: &mut D) {
        for i in 0..self.config.cards {
            kill_and_hide(driver, &self.config.card_target(i));
        }
        self.player = None;
        session.signals_mut().reset(Topic::EngineerReveal);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/stack.rs"]
mod tests;
