use crate::{
    choreo::{dot::DotConfig, hero::HeroParams, nav::NavConfig, reveal::RevealConfig, stack::StackConfig},
    coord::readiness::RetryPolicy,
    foundation::core::Breakpoints,
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::{sampler::GeometrySampler, snapshot::ResizeTolerance},
    viewport::adapter::AdapterSettings,
};

/// Everything a [`Stage`](crate::Stage) needs, loadable from JSON.
///
/// Missing fields take their production defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChoreoConfig {
    /// Device class buckets.
    pub breakpoints: Breakpoints,
    /// How far the viewport may move before cached geometry is stale.
    pub resize_tolerance: ResizeTolerance,
    /// Resize debouncing.
    pub viewport: AdapterSettings,
    /// Polling of anchors that mount late.
    pub retry: RetryPolicy,
    /// Factor applied to glyph offsets measured on phones.
    pub mobile_glyph_scale: f64,
    /// Skip every time-driven animation to its final state.
    pub reduced_motion: bool,
    /// Hero name reveal.
    pub hero: HeroParams,
    /// Letter dot.
    pub dot: DotConfig,
    /// Portfolio header reveal.
    pub reveal: RevealConfig,
    /// Pinned card stack.
    pub stack: StackConfig,
    /// Section navigation.
    pub nav: NavConfig,
}

impl Default for ChoreoConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            resize_tolerance: ResizeTolerance::default(),
            viewport: AdapterSettings::default(),
            retry: RetryPolicy::default(),
            mobile_glyph_scale: 0.92,
            reduced_motion: false,
            hero: HeroParams::default(),
            dot: DotConfig::default(),
            reveal: RevealConfig::default(),
            stack: StackConfig::default(),
            nav: NavConfig::default(),
        }
    }
}

impl ChoreoConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> ChoreoResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON of the whole configuration.
    pub fn to_json_pretty(&self) -> ChoreoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section.
    pub fn validate(&self) -> ChoreoResult<()> {
        self.breakpoints.validate()?;
        if !(self.resize_tolerance.mobile_px >= 0.0 && self.resize_tolerance.desktop_px >= 0.0) {
            return Err(ChoreoError::config("resize tolerances must be >= 0"));
        }
        if self.retry.interval_ms == 0 || self.retry.budget_ms < self.retry.interval_ms {
            return Err(ChoreoError::config(
                "retry interval must be > 0 and fit inside the budget",
            ));
        }
        if !(self.mobile_glyph_scale.is_finite() && self.mobile_glyph_scale > 0.0) {
            return Err(ChoreoError::config("mobile_glyph_scale must be > 0"));
        }
        self.hero.validate()?;
        self.dot.validate()?;
        self.reveal.validate()?;
        self.stack.validate()?;
        Ok(())
    }

    /// Geometry sampler for these breakpoints.
    pub fn sampler(&self) -> GeometrySampler {
        GeometrySampler::new(self.breakpoints, self.mobile_glyph_scale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
