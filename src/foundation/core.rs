use crate::foundation::error::{ChoreoError, ChoreoResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Monotonic host clock reading in milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Milliseconds elapsed since `earlier`, zero when the clock went backwards.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Shift forward by `ms` using saturating arithmetic.
    pub fn add(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

/// Normalized progress, always inside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize)]
pub struct Progress(f64);

impl Progress {
    /// Progress at the start of a range.
    pub const START: Self = Self(0.0);
    /// Progress at the end of a range.
    pub const END: Self = Self(1.0);

    /// Clamp `v` into `[0, 1]`.
    ///
    /// `NaN` (which can show up transiently when a trigger has zero length) maps to `0`.
    pub fn clamped(v: f64) -> Self {
        if v.is_nan() {
            return Self::START;
        }
        Self(v.clamp(0.0, 1.0))
    }

    /// Raw value in `[0, 1]`.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Return `true` at the closed end of the range.
    pub fn is_complete(self) -> bool {
        self.0 >= 1.0
    }
}

impl<'de> serde::Deserialize<'de> for Progress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Ok(Self::clamped(v))
    }
}

/// Named viewport-size bucket used to select animation parameters.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Phones.
    Mobile,
    /// Tablets and small laptops.
    Tablet,
    /// Everything wider.
    Desktop,
}

impl DeviceClass {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl std::str::FromStr for DeviceClass {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            other => Err(ChoreoError::validation(format!(
                "unknown device class '{other}'"
            ))),
        }
    }
}

/// Inclusive upper widths (px) of the mobile and tablet buckets.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Breakpoints {
    /// Widest viewport still classified as mobile.
    pub mobile_max: f64,
    /// Widest viewport still classified as tablet.
    pub tablet_max: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile_max: 767.0,
            tablet_max: 1023.0,
        }
    }
}

impl Breakpoints {
    /// Bucket a layout width.
    pub fn classify(&self, width: f64) -> DeviceClass {
        if width <= self.mobile_max {
            DeviceClass::Mobile
        } else if width <= self.tablet_max {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    /// Check ordering and positivity.
    pub fn validate(&self) -> ChoreoResult<()> {
        if !(self.mobile_max > 0.0 && self.mobile_max < self.tablet_max) {
            return Err(ChoreoError::config(
                "breakpoints must satisfy 0 < mobile_max < tablet_max",
            ));
        }
        Ok(())
    }
}

/// Layout viewport plus the optional visual viewport height reported on mobile browsers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Layout width in CSS pixels.
    pub width: f64,
    /// Layout height in CSS pixels (`innerHeight`).
    pub height: f64,
    /// Visible height once browser chrome overlays are subtracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_height: Option<f64>,
}

impl Viewport {
    /// Viewport without a separate visual height.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            visual_height: None,
        }
    }

    /// Attach the visual viewport height.
    pub fn with_visual_height(mut self, visual_height: f64) -> Self {
        self.visual_height = Some(visual_height);
        self
    }

    /// Height that is actually visible to the user.
    pub fn effective_height(&self) -> f64 {
        match self.visual_height {
            Some(h) if h > 0.0 => h.min(self.height),
            _ => self.height,
        }
    }

    /// Layout size as a `kurbo` size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Viewport center using the visible height.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.effective_height() / 2.0)
    }

    /// Return `true` when both dimensions are finite and positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> ChoreoResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ChoreoError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(ChoreoError::validation(format!(
                "hex color '{s}' must have 6 or 8 digits"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
