use crate::{
    animation::{
        ease::Ease,
        ops::{stagger, stagger_total},
    },
    choreo::{Activation, Playback, apply_states, key},
    coord::{session::Session, signal::Topic},
    driver::{AnimationDriver, TargetId, kill_and_hide},
    foundation::core::Millis,
    foundation::error::{ChoreoError, ChoreoResult},
    progress::trigger::TriggerPolicy,
    timeline::{
        builder::{MotionMode, TimelineBuilder},
        def::{LaneDef, PhaseDef, PhaseKeysDef, PointDef, Responsive, StateDef, TimelineDef},
    },
};

const PHASE: &str = "reveal";

/// Timing and look of the hero name reveal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeroParams {
    /// Target id prefix; letter `i` is `{prefix}-{i}`.
    pub target_prefix: String,
    /// Number of letters in the name.
    pub letters: usize,
    /// Delay between two letters.
    pub stagger_ms: u64,
    /// Duration of one letter.
    pub letter_ms: u64,
    /// Initial downward offset of each letter.
    pub lift_px: f64,
    /// Initial blur of each letter.
    pub blur_px: f64,
    /// Ease of each letter.
    pub ease: Ease,
}

impl Default for HeroParams {
    fn default() -> Self {
        Self {
            target_prefix: "hero-letter".to_string(),
            letters: 12,
            stagger_ms: 60,
            letter_ms: 700,
            lift_px: 32.0,
            blur_px: 10.0,
            ease: Ease::OutCubic,
        }
    }
}

impl HeroParams {
    /// Reject empty names and zero-length letters.
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.letters == 0 {
            return Err(ChoreoError::config("hero needs at least one letter"));
        }
        if self.letter_ms == 0 {
            return Err(ChoreoError::config("hero letter_ms must be > 0"));
        }
        if self.target_prefix.trim().is_empty() {
            return Err(ChoreoError::config("hero target_prefix must be non-empty"));
        }
        Ok(())
    }

    /// Target of letter `index`.
    pub fn letter_target(&self, index: usize) -> TargetId {
        TargetId::new(format!("{}-{index}", self.target_prefix))
    }

    /// Duration of the whole reveal.
    pub fn total_ms(&self) -> u64 {
        stagger_total(self.letters, self.stagger_ms, self.letter_ms)
    }

    /// Staggered single-phase timeline: each letter fades in, unblurs and rises into place.
    pub fn timeline_def(&self) -> TimelineDef {
        let total = self.total_ms().max(1) as f64;
        let lanes = stagger(self.letters, self.stagger_ms)
            .into_iter()
            .enumerate()
            .map(|(i, offset)| {
                let from = StateDef {
                    translate: Some(PointDef::Xy([0.0, self.lift_px])),
                    blur_px: Some(self.blur_px),
                    opacity: Some(0.0),
                    ..StateDef::default()
                };
                let to = StateDef {
                    translate: Some(PointDef::Xy([0.0, 0.0])),
                    blur_px: Some(0.0),
                    opacity: Some(1.0),
                    ..StateDef::default()
                };
                let a0 = offset as f64 / total;
                let a1 = (offset.saturating_add(self.letter_ms) as f64 / total).min(1.0);
                LaneDef {
                    target: self.letter_target(i),
                    requires: Vec::new(),
                    initial: from.clone(),
                    variants: Responsive::uniform(vec![PhaseKeysDef {
                        phase: PHASE.to_string(),
                        keys: vec![key(a0, from, self.ease), key(a1, to, Ease::Linear)],
                    }]),
                }
            })
            .collect();

        TimelineDef {
            name: "hero-name".to_string(),
            phases: vec![PhaseDef {
                name: PHASE.to_string(),
                weight: 1.0,
                ease: Ease::Linear,
            }],
            lanes,
            policy: TriggerPolicy::Reversible,
            rest_phase: None,
        }
    }
}

/// Lifecycle of the hero reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroStatus {
    /// Not mounted.
    #[default]
    Idle,
    /// Letters are animating.
    Revealing,
    /// Every letter is in place and `NameReady` is published.
    Revealed,
}

/// Time-driven staggered reveal of the hero name.
#[derive(Clone, Debug)]
pub struct HeroReveal {
    params: HeroParams,
    status: HeroStatus,
    playback: Option<Playback>,
    interpolated_frames: u64,
}

impl HeroReveal {
    /// Idle reveal.
    pub fn new(params: HeroParams) -> Self {
        Self {
            params,
            status: HeroStatus::Idle,
            playback: None,
            interpolated_frames: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> HeroStatus {
        self.status
    }

    /// Frames written between the initial and final states.
    pub fn interpolated_frames(&self) -> u64 {
        self.interpolated_frames
    }

    /// Start the reveal, or restore it when the name was already revealed in this session.
    #[tracing::instrument(skip_all, fields(letters = self.params.letters, ?motion))]
    pub fn activate<D: AnimationDriver + ?Sized>(
        &mut self,
        now: Millis,
        session: &mut Session,
        motion: MotionMode,
        driver: &mut D,
    ) -> ChoreoResult<Activation> {
        self.params.validate()?;
        let def = self.params.timeline_def();
        let restore = session.is_set(Topic::NameReady) || motion == MotionMode::SkipToFinal;
        let timeline = TimelineBuilder::new(&def).motion(motion).build()?;

        if restore {
            apply_states(driver, &timeline.terminal());
            self.finish(session);
            return Ok(Activation::Restored);
        }

        apply_states(driver, &timeline.initial());
        self.playback = Some(Playback::new(timeline, now, self.params.total_ms()));
        self.status = HeroStatus::Revealing;
        Ok(Activation::Playing)
    }

    /// Advance the reveal.
    pub fn tick<D: AnimationDriver + ?Sized>(
        &mut self,
        now: Millis,
        session: &mut Session,
        driver: &mut D,
    ) -> HeroStatus {
        let Some(playback) = &self.playback else {
            return self.status;
        };
        if playback.is_finished(now) {
            apply_states(driver, &playback.timeline().terminal());
            self.finish(session);
        } else {
            apply_states(driver, &playback.frame(now).states);
            self.interpolated_frames += 1;
        }
        self.status
    }

    /// Kill and hide every letter. `NameReady` stays set: the name was shown once this session.
    pub fn deactivate<D: AnimationDriver + ?Sized>(&mut self, driver: &mut D) {
        for i in 0..self.params.letters {
            kill_and_hide(driver, &self.params.letter_target(i));
        }
        self.playback = None;
        self.status = HeroStatus::Idle;
    }

    fn finish(&mut self, session: &mut Session) {
        self.playback = None;
        self.status = HeroStatus::Revealed;
        if session.signals_mut().publish(Topic::NameReady) {
            tracing::info!("hero name revealed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/hero.rs"]
mod tests;
