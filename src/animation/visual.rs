use crate::foundation::core::{Point, Rgba8, Vec2};

/// Interpolation contract for animated value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with factor `t` (usually in `[0, 1]`, may overshoot).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Lerp for Rgba8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

/// Everything a choreography can write to one target element.
///
/// `translate` is an absolute viewport position for anchored targets (the dot) and a relative
/// offset for in-flow elements (titles, cards); the owning choreography decides which.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisualState {
    /// Translation in CSS pixels.
    pub translate: Vec2,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotation_deg: f64,
    /// Gaussian blur radius in pixels.
    pub blur_px: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Fill color, when the target has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba8>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
            rotation_deg: 0.0,
            blur_px: 0.0,
            opacity: 1.0,
            color: None,
        }
    }
}

impl VisualState {
    /// Fully transparent identity state.
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            ..Self::default()
        }
    }

    /// Identity state translated to `at`.
    pub fn at(at: Point) -> Self {
        Self {
            translate: at.to_vec2(),
            ..Self::default()
        }
    }

    /// Translation as a point.
    pub fn position(&self) -> Point {
        self.translate.to_point()
    }

    /// Clamp opacity to `[0, 1]` and blur to non-negative values.
    pub fn sanitized(mut self) -> Self {
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.blur_px = self.blur_px.max(0.0);
        self.scale = self.scale.max(0.0);
        self
    }
}

impl Lerp for VisualState {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let color = match (a.color, b.color) {
            (Some(ca), Some(cb)) => Some(<Rgba8 as Lerp>::lerp(&ca, &cb, t.clamp(0.0, 1.0))),
            (Some(c), None) | (None, Some(c)) => Some(c),
            (None, None) => None,
        };
        Self {
            translate: <Vec2 as Lerp>::lerp(&a.translate, &b.translate, t),
            scale: <f64 as Lerp>::lerp(&a.scale, &b.scale, t),
            rotation_deg: <f64 as Lerp>::lerp(&a.rotation_deg, &b.rotation_deg, t),
            blur_px: <f64 as Lerp>::lerp(&a.blur_px, &b.blur_px, t),
            opacity: <f64 as Lerp>::lerp(&a.opacity, &b.opacity, t),
            color,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/visual.rs"]
mod tests;
