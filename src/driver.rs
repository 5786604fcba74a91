//! Narrow imperative boundary between choreography and the rendering backend.
//!
//! Choreographies compute [`VisualState`]s; a driver only receives "set this property on this
//! target" and "stop everything running on this target". No business logic lives behind it.

use std::collections::BTreeMap;

use crate::{animation::visual::VisualState, foundation::core::Rgba8, foundation::core::Vec2};

/// Identifier of an animated element.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    /// Build from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writable properties.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Horizontal translation (px).
    X,
    /// Vertical translation (px).
    Y,
    /// Uniform scale.
    Scale,
    /// Rotation (deg).
    Rotation,
    /// Blur radius (px).
    Blur,
    /// Opacity.
    Opacity,
    /// Fill color.
    Color,
    /// Display/visibility toggle.
    Visibility,
}

/// Value written to a [`Property`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Numeric property.
    Number(f64),
    /// Color property.
    Color(Rgba8),
    /// Visibility flag.
    Visible(bool),
}

impl PropertyValue {
    /// Numeric payload, if any.
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }
}

/// Imperative escape hatch implemented by the host.
pub trait AnimationDriver {
    /// Write one property on one target.
    fn set(&mut self, target: &TargetId, property: Property, value: PropertyValue);

    /// Stop every tween and timer running on `target`.
    fn kill(&mut self, target: &TargetId);
}

/// Write every property of `state` to `target`.
pub fn apply_state<D: AnimationDriver + ?Sized>(
    driver: &mut D,
    target: &TargetId,
    state: &VisualState,
) {
    let state = state.sanitized();
    driver.set(target, Property::X, PropertyValue::Number(state.translate.x));
    driver.set(target, Property::Y, PropertyValue::Number(state.translate.y));
    driver.set(target, Property::Scale, PropertyValue::Number(state.scale));
    driver.set(
        target,
        Property::Rotation,
        PropertyValue::Number(state.rotation_deg),
    );
    driver.set(target, Property::Blur, PropertyValue::Number(state.blur_px));
    driver.set(target, Property::Opacity, PropertyValue::Number(state.opacity));
    if let Some(color) = state.color {
        driver.set(target, Property::Color, PropertyValue::Color(color));
    }
    driver.set(
        target,
        Property::Visibility,
        PropertyValue::Visible(state.opacity > 0.0),
    );
}

/// Stop `target` and hide it.
pub fn kill_and_hide<D: AnimationDriver + ?Sized>(driver: &mut D, target: &TargetId) {
    driver.kill(target);
    driver.set(target, Property::Opacity, PropertyValue::Number(0.0));
    driver.set(target, Property::Visibility, PropertyValue::Visible(false));
}

/// In-memory driver that keeps the latest value of every property.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct RecordingDriver {
    targets: BTreeMap<TargetId, BTreeMap<Property, PropertyValue>>,
    writes: u64,
    kills: BTreeMap<TargetId, u64>,
}

impl RecordingDriver {
    /// Empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value of one property.
    pub fn get(&self, target: &TargetId, property: Property) -> Option<PropertyValue> {
        self.targets.get(target)?.get(&property).copied()
    }

    /// Reconstruct the visual state last written to `target`.
    pub fn state(&self, target: &TargetId) -> Option<VisualState> {
        let props = self.targets.get(target)?;
        let num = |p: Property, default: f64| {
            props
                .get(&p)
                .and_then(|v| v.as_number())
                .unwrap_or(default)
        };
        let base = VisualState::default();
        Some(VisualState {
            translate: Vec2::new(num(Property::X, 0.0), num(Property::Y, 0.0)),
            scale: num(Property::Scale, base.scale),
            rotation_deg: num(Property::Rotation, base.rotation_deg),
            blur_px: num(Property::Blur, base.blur_px),
            opacity: num(Property::Opacity, base.opacity),
            color: match props.get(&Property::Color) {
                Some(PropertyValue::Color(c)) => Some(*c),
                _ => None,
            },
        })
    }

    /// Return `true` unless the target was last written as invisible.
    pub fn is_visible(&self, target: &TargetId) -> bool {
        !matches!(
            self.get(target, Property::Visibility),
            Some(PropertyValue::Visible(false))
        )
    }

    /// Total number of property writes.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Number of times `target` was killed.
    pub fn kills(&self, target: &TargetId) -> u64 {
        self.kills.get(target).copied().unwrap_or(0)
    }

    /// Targets that received at least one write.
    pub fn targets(&self) -> impl Iterator<Item = &TargetId> {
        self.targets.keys()
    }
}

impl AnimationDriver for RecordingDriver {
    fn set(&mut self, target: &TargetId, property: Property, value: PropertyValue) {
        self.writes += 1;
        self.targets
            .entry(target.clone())
            .or_default()
            .insert(property, value);
    }

    fn kill(&mut self, target: &TargetId) {
        *self.kills.entry(target.clone()).or_default() += 1;
    }
}

#[cfg(test)]
#[path = "../tests/unit/driver.rs"]
mod tests;
