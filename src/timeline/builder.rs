use std::collections::BTreeMap;

use crate::{
    animation::{
        keyframes::{Keyframe, Keyframes},
        visual::VisualState,
    },
    driver::TargetId,
    foundation::core::{DeviceClass, Progress, Viewport},
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::snapshot::GeometrySnapshot,
    progress::{
        mapper::{PhaseHit, ProgressMapper},
        trigger::TriggerPolicy,
    },
    timeline::def::{LaneDef, PropMask, TimelineDef},
};

/// How much of a timeline actually plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Every keyframe is interpolated.
    #[default]
    Full,
    /// Reduced motion and mobile paths: only the resting state exists.
    SkipToFinal,
}

/// Builds an immutable [`Timeline`] from a [`TimelineDef`].
pub struct TimelineBuilder<'a> {
    def: &'a TimelineDef,
    device: DeviceClass,
    motion: MotionMode,
    geometry: Option<&'a GeometrySnapshot>,
    viewport: Option<Viewport>,
}

impl<'a> TimelineBuilder<'a> {
    /// Desktop, full-motion builder without geometry.
    pub fn new(def: &'a TimelineDef) -> Self {
        Self {
            def,
            device: DeviceClass::Desktop,
            motion: MotionMode::Full,
            geometry: None,
            viewport: None,
        }
    }

    /// Select the device-class variant.
    pub fn device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    /// Select the motion mode.
    pub fn motion(mut self, motion: MotionMode) -> Self {
        self.motion = motion;
        self
    }

    /// Geometry used to resolve anchor-relative positions.
    pub fn geometry(mut self, geometry: &'a GeometrySnapshot) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Viewport used for viewport-relative positions; defaults to the geometry's viewport.
    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Build the timeline.
    ///
    /// Invalid definitions are errors. Lanes whose anchors are not measured are skipped so the
    /// rest of the sequence still plays.
    #[tracing::instrument(skip(self), fields(timeline = %self.def.name, device = ?self.device))]
    pub fn build(self) -> ChoreoResult<Timeline> {
        self.def.validate()?;
        let mapper = ProgressMapper::new(self.def.phase_table()?)?;
        let viewport = self.viewport.or(self.geometry.map(|g| g.viewport));
        let rest = self.def.rest_index(mapper.table());

        let mut lanes = Vec::with_capacity(self.def.lanes.len());
        let mut skipped = Vec::new();
        for lane_def in &self.def.lanes {
            match self.build_lane(lane_def, &mapper, viewport.as_ref(), rest)? {
                Some(lane) => lanes.push(lane),
                None => {
                    tracing::warn!(target_id = %lane_def.target, "skipping lane with unmeasured anchors");
                    skipped.push(lane_def.target.clone());
                }
            }
        }

        Ok(Timeline {
            name: self.def.name.clone(),
            mapper,
            lanes,
            skipped,
            policy: self.def.policy,
            motion: self.motion,
        })
    }

    fn build_lane(
        &self,
        def: &LaneDef,
        mapper: &ProgressMapper,
        viewport: Option<&Viewport>,
        rest: usize,
    ) -> ChoreoResult<Option<Lane>> {
        let required = def.required_anchors(self.device);
        if !required.is_empty() && !self.geometry.is_some_and(|g| g.has_all(required)) {
            return Ok(None);
        }
        if def.needs_viewport(self.device) && viewport.is_none() {
            return Ok(None);
        }

        let Some(initial) = def
            .initial
            .apply_to(VisualState::default(), self.geometry, viewport)?
        else {
            return Ok(None);
        };

        let phase_count = mapper.table().len();
        let mut phases: Vec<Option<Keyframes<VisualState>>> = vec![None; phase_count];
        let mut held = vec![initial; phase_count];
        let mut running = initial;
        let mut resting = initial;

        let variant = def.variants.select(self.device);
        let mut next_def = variant.iter().peekable();
        for idx in 0..phase_count {
            let name = mapper.phase_name(idx).unwrap_or_default();
            held[idx] = running;
            let Some(pk) = next_def.next_if(|pk| pk.phase == name) else {
                if idx == rest {
                    resting = running;
                }
                continue;
            };

            let mut keys = Vec::with_capacity(pk.keys.len() + 1);
            if pk.keys.first().is_some_and(|k| k.at > 0.0) {
                keys.push(Keyframe::new(0.0, running));
            }
            for k in &pk.keys {
                let Some(state) = k.state.apply_to(running, self.geometry, viewport)? else {
                    return Ok(None);
                };
                running = state;
                keys.push(Keyframe::new(k.at, state).with_ease(k.ease));
            }
            phases[idx] = Some(Keyframes::new(keys)?);
            held[idx] = running;
            if idx == rest {
                resting = running;
            }
        }

        if self.motion == MotionMode::SkipToFinal {
            return Ok(Some(Lane {
                target: def.target.clone(),
                mask: def.mask(self.device),
                phases: vec![None; phase_count],
                held: vec![resting; phase_count],
            }));
        }

        // Phases without keys hold what the lane reached before them.
        Ok(Some(Lane {
            target: def.target.clone(),
            mask: def.mask(self.device),
            phases,
            held,
        }))
    }
}

#[derive(Clone, Debug)]
struct Lane {
    target: TargetId,
    mask: PropMask,
    phases: Vec<Option<Keyframes<VisualState>>>,
    held: Vec<VisualState>,
}

impl Lane {
    fn sample(&self, hit: &PhaseHit) -> VisualState {
        let held = self.held[hit.index];
        match &self.phases[hit.index] {
            Some(kf) => kf.sample(hit.eased).unwrap_or(held),
            None => held,
        }
    }
}

/// Evaluated states of every target at one progress value.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineFrame {
    /// Active phase.
    pub hit: PhaseHit,
    /// Name of the active phase.
    pub phase: String,
    /// State per target, lanes of the same target merged in declaration order.
    pub states: BTreeMap<TargetId, VisualState>,
}

/// Immutable sequence of phases and lanes; rebuilt wholesale on breakpoint changes.
#[derive(Clone, Debug)]
pub struct Timeline {
    name: String,
    mapper: ProgressMapper,
    lanes: Vec<Lane>,
    skipped: Vec<TargetId>,
    policy: TriggerPolicy,
    motion: MotionMode,
}

impl Timeline {
    /// Timeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase mapper.
    pub fn mapper(&self) -> &ProgressMapper {
        &self.mapper
    }

    /// Leave-back behavior.
    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Motion mode the timeline was built with.
    pub fn motion(&self) -> MotionMode {
        self.motion
    }

    /// Targets of lanes dropped because their anchors were missing.
    pub fn skipped(&self) -> &[TargetId] {
        &self.skipped
    }

    /// Number of lanes that will play.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Evaluate every lane at `progress` (clamped).
    pub fn evaluate(&self, progress: f64) -> TimelineFrame {
        let progress = match self.motion {
            MotionMode::Full => progress,
            MotionMode::SkipToFinal => Progress::END.get(),
        };
        let hit = self.mapper.map(progress);
        let mut states: BTreeMap<TargetId, VisualState> = BTreeMap::new();
        for lane in &self.lanes {
            let sampled = lane.sample(&hit);
            let slot = states.entry(lane.target.clone()).or_default();
            lane.mask.overlay(slot, &sampled);
        }
        TimelineFrame {
            hit,
            phase: self
                .mapper
                .phase_name(hit.index)
                .unwrap_or_default()
                .to_string(),
            states,
        }
    }

    /// States at progress 0.
    pub fn initial(&self) -> BTreeMap<TargetId, VisualState> {
        self.evaluate(0.0).states
    }

    /// States at progress 1. Under [`MotionMode::SkipToFinal`] these are the resting states.
    pub fn terminal(&self) -> BTreeMap<TargetId, VisualState> {
        self.evaluate(1.0).states
    }

    /// Index of a phase by name.
    pub fn phase_index(&self, name: &str) -> ChoreoResult<usize> {
        self.mapper.table().index_of(name).ok_or_else(|| {
            ChoreoError::animation(format!("timeline '{}' has no phase '{name}'", self.name))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
