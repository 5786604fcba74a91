use std::collections::BTreeSet;

use crate::{
    animation::{ease::Ease, visual::VisualState},
    driver::TargetId,
    foundation::core::{DeviceClass, Point, Rgba8, Vec2, Viewport},
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::snapshot::{AnchorId, GeometrySnapshot},
    progress::{mapper::PhaseTable, trigger::TriggerPolicy},
};

/// Per-device-class values, selected once at build time.
///
/// Missing classes fall back toward desktop: mobile -> tablet -> desktop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Responsive<T> {
    /// Phone value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<T>,
    /// Tablet value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<T>,
    /// Desktop value, also the fallback.
    pub desktop: T,
}

impl<T> Responsive<T> {
    /// Same value for every class.
    pub fn uniform(value: T) -> Self {
        Self {
            mobile: None,
            tablet: None,
            desktop: value,
        }
    }

    /// Value for `class`.
    pub fn select(&self, class: DeviceClass) -> &T {
        match class {
            DeviceClass::Mobile => self
                .mobile
                .as_ref()
                .or(self.tablet.as_ref())
                .unwrap_or(&self.desktop),
            DeviceClass::Tablet => self.tablet.as_ref().unwrap_or(&self.desktop),
            DeviceClass::Desktop => &self.desktop,
        }
    }

    /// Every defined variant.
    pub fn variants(&self) -> impl Iterator<Item = &T> {
        self.mobile
            .iter()
            .chain(self.tablet.iter())
            .chain(std::iter::once(&self.desktop))
    }
}

/// A position: literal, relative to the visible viewport, or relative to a measured anchor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PointDef {
    /// Measured anchor plus an offset in pixels.
    Anchor {
        /// Anchor to follow.
        anchor: AnchorId,
        /// Offset added to the anchor.
        #[serde(default)]
        offset: [f64; 2],
    },
    /// Fractions of the viewport width and visible height.
    Viewport {
        /// Width fraction.
        vw: f64,
        /// Visible-height fraction.
        vh: f64,
    },
    /// Literal pixels.
    Xy([f64; 2]),
}

impl PointDef {
    fn anchor_id(&self) -> Option<&AnchorId> {
        match self {
            Self::Anchor { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    pub(crate) fn resolve(
        &self,
        geometry: Option<&GeometrySnapshot>,
        viewport: Option<&Viewport>,
    ) -> Option<Vec2> {
        match self {
            Self::Xy([x, y]) => Some(Vec2::new(*x, *y)),
            Self::Viewport { vw, vh } => {
                let vp = viewport?;
                Some(Vec2::new(vp.width * vw, vp.effective_height() * vh))
            }
            Self::Anchor { anchor, offset } => {
                let at: Point = geometry?.anchor(anchor)?;
                Some(Vec2::new(at.x + offset[0], at.y + offset[1]))
            }
        }
    }
}

/// A partial visual state; unset fields inherit from the previous key of the same lane.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StateDef {
    /// Translation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate: Option<PointDef>,
    /// Uniform scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
    /// Blur radius in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_px: Option<f64>,
    /// Opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Color as `#rrggbb[aa]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StateDef {
    pub(crate) fn mask(&self) -> PropMask {
        PropMask {
            translate: self.translate.is_some(),
            scale: self.scale.is_some(),
            rotation: self.rotation_deg.is_some(),
            blur: self.blur_px.is_some(),
            opacity: self.opacity.is_some(),
            color: self.color.is_some(),
        }
    }

    /// Overlay the set fields onto `base`. `None` when a referenced anchor is unavailable.
    pub(crate) fn apply_to(
        &self,
        base: VisualState,
        geometry: Option<&GeometrySnapshot>,
        viewport: Option<&Viewport>,
    ) -> ChoreoResult<Option<VisualState>> {
        let mut out = base;
        if let Some(p) = &self.translate {
            match p.resolve(geometry, viewport) {
                Some(v) => out.translate = v,
                None => return Ok(None),
            }
        }
        if let Some(v) = self.scale {
            out.scale = v;
        }
        if let Some(v) = self.rotation_deg {
            out.rotation_deg = v;
        }
        if let Some(v) = self.blur_px {
            out.blur_px = v;
        }
        if let Some(v) = self.opacity {
            out.opacity = v;
        }
        if let Some(hex) = &self.color {
            out.color = Some(Rgba8::from_hex(hex)?);
        }
        Ok(Some(out))
    }

    fn anchors(&self) -> Option<&AnchorId> {
        self.translate.as_ref().and_then(PointDef::anchor_id)
    }

    fn needs_viewport(&self) -> bool {
        matches!(self.translate, Some(PointDef::Viewport { .. }))
    }

    fn validate(&self) -> ChoreoResult<()> {
        if let Some(hex) = &self.color {
            Rgba8::from_hex(hex)?;
        }
        if let Some(o) = self.opacity
            && !(0.0..=1.0).contains(&o)
        {
            return Err(ChoreoError::validation(format!(
                "opacity {o} is outside [0, 1]"
            )));
        }
        if self.blur_px.is_some_and(|b| b < 0.0) {
            return Err(ChoreoError::validation("blur_px must be >= 0"));
        }
        Ok(())
    }
}

/// Which properties a lane writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PropMask {
    /// Translation.
    pub translate: bool,
    /// Scale.
    pub scale: bool,
    /// Rotation.
    pub rotation: bool,
    /// Blur.
    pub blur: bool,
    /// Opacity.
    pub opacity: bool,
    /// Color.
    pub color: bool,
}

impl PropMask {
    pub(crate) fn union(self, other: Self) -> Self {
        Self {
            translate: self.translate || other.translate,
            scale: self.scale || other.scale,
            rotation: self.rotation || other.rotation,
            blur: self.blur || other.blur,
            opacity: self.opacity || other.opacity,
            color: self.color || other.color,
        }
    }

    /// Copy the masked fields of `src` onto `dst`.
    pub(crate) fn overlay(self, dst: &mut VisualState, src: &VisualState) {
        if self.translate {
            dst.translate = src.translate;
        }
        if self.scale {
            dst.scale = src.scale;
        }
        if self.rotation {
            dst.rotation_deg = src.rotation_deg;
        }
        if self.blur {
            dst.blur_px = src.blur_px;
        }
        if self.opacity {
            dst.opacity = src.opacity;
        }
        if self.color {
            dst.color = src.color;
        }
    }
}

/// One key of a lane inside a phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyDef {
    /// Phase-local position in `[0, 1]`.
    pub at: f64,
    /// Properties reached at `at`.
    pub state: StateDef,
    /// Ease toward the next key.
    #[serde(default)]
    pub ease: Ease,
}

/// Keys of one lane during one phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseKeysDef {
    /// Phase name.
    pub phase: String,
    /// Keys sorted by `at`.
    pub keys: Vec<KeyDef>,
}

/// One concurrently evaluated sub-timeline writing to one target.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LaneDef {
    /// Target element.
    pub target: TargetId,
    /// Anchors that must be measured for this lane to run, on top of the ones its keys use.
    #[serde(default)]
    pub requires: Vec<AnchorId>,
    /// State before the first key.
    #[serde(default)]
    pub initial: StateDef,
    /// Per-device keys.
    pub variants: Responsive<Vec<PhaseKeysDef>>,
}

impl LaneDef {
    /// Anchors this lane needs for `class`.
    pub fn required_anchors(&self, class: DeviceClass) -> BTreeSet<&AnchorId> {
        let mut out: BTreeSet<&AnchorId> = self.requires.iter().collect();
        out.extend(self.initial.anchors());
        for pk in self.variants.select(class) {
            out.extend(pk.keys.iter().filter_map(|k| k.state.anchors()));
        }
        out
    }

    pub(crate) fn needs_viewport(&self, class: DeviceClass) -> bool {
        self.initial.needs_viewport()
            || self
                .variants
                .select(class)
                .iter()
                .any(|pk| pk.keys.iter().any(|k| k.state.needs_viewport()))
    }

    pub(crate) fn mask(&self, class: DeviceClass) -> PropMask {
        self.variants
            .select(class)
            .iter()
            .flat_map(|pk| pk.keys.iter())
            .fold(self.initial.mask(), |m, k| m.union(k.state.mask()))
    }
}

/// Named phase with a relative weight.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseDef {
    /// Phase name.
    pub name: String,
    /// Relative width.
    pub weight: f64,
    /// Ease of the phase-local progress.
    #[serde(default)]
    pub ease: Ease,
}

/// Declarative description of a timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineDef {
    /// Timeline name, used in logs.
    pub name: String,
    /// Phases in order.
    pub phases: Vec<PhaseDef>,
    /// Concurrent lanes.
    pub lanes: Vec<LaneDef>,
    /// Leave-back behavior.
    #[serde(default)]
    pub policy: TriggerPolicy,
    /// Phase whose end is the resting state; skipped motion lands there. Defaults to the last phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_phase: Option<String>,
}

impl TimelineDef {
    /// Parse and validate a JSON definition.
    pub fn from_json_str(s: &str) -> ChoreoResult<Self> {
        let def: Self = serde_json::from_str(s)?;
        def.validate()?;
        Ok(def)
    }

    /// Phase table described by `phases`.
    pub fn phase_table(&self) -> ChoreoResult<PhaseTable> {
        PhaseTable::from_weights(
            self.phases
                .iter()
                .map(|p| (p.name.clone(), p.weight, p.ease)),
        )
    }

    /// Index of the resting phase in `table`.
    pub(crate) fn rest_index(&self, table: &PhaseTable) -> usize {
        self.rest_phase
            .as_deref()
            .and_then(|name| table.index_of(name))
            .unwrap_or_else(|| table.len().saturating_sub(1))
    }

    /// Static checks independent of device class and geometry.
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.name.trim().is_empty() {
            return Err(ChoreoError::validation("timeline name must be non-empty"));
        }
        let table = self.phase_table()?;
        if let Some(rest) = &self.rest_phase
            && table.index_of(rest).is_none()
        {
            return Err(ChoreoError::validation(format!(
                "rest phase '{rest}' is not a phase of '{}'",
                self.name
            )));
        }

        for lane in &self.lanes {
            lane.initial.validate()?;
            for variant in lane.variants.variants() {
                let mut last_phase = None;
                for pk in variant {
                    let Some(idx) = table.index_of(&pk.phase) else {
                        return Err(ChoreoError::validation(format!(
                            "lane '{}' references unknown phase '{}'",
                            lane.target, pk.phase
                        )));
                    };
                    if last_phase.is_some_and(|prev| prev >= idx) {
                        return Err(ChoreoError::validation(format!(
                            "lane '{}' lists phase '{}' out of order or twice",
                            lane.target, pk.phase
                        )));
                    }
                    last_phase = Some(idx);

                    if pk.keys.is_empty() {
                        return Err(ChoreoError::validation(format!(
                            "lane '{}' phase '{}' has no keys",
                            lane.target, pk.phase
                        )));
                    }
                    for k in &pk.keys {
                        if !(0.0..=1.0).contains(&k.at) {
                            return Err(ChoreoError::validation(format!(
                                "lane '{}' phase '{}' key at {} is outside [0, 1]",
                                lane.target, pk.phase, k.at
                            )));
                        }
                        k.state.validate()?;
                    }
                    if !pk.keys.windows(2).all(|w| w[0].at <= w[1].at) {
                        return Err(ChoreoError::validation(format!(
                            "lane '{}' phase '{}' keys must be sorted",
                            lane.target, pk.phase
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
