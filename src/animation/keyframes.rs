use crate::{
    animation::{ease::Ease, visual::Lerp},
    foundation::error::{ChoreoError, ChoreoResult},
};

/// One key in a phase-local progress domain.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Local progress in `[0, 1]`.
    pub at: f64,
    /// Value reached at `at`.
    pub value: T,
    /// Ease applied toward the next key.
    #[serde(default)]
    pub ease: Ease,
}

impl<T> Keyframe<T> {
    /// Key with a linear ease toward the next key.
    pub fn new(at: f64, value: T) -> Self {
        Self {
            at,
            value,
            ease: Ease::Linear,
        }
    }

    /// Replace the outgoing ease.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Ordered keys sampled by local progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Keys sorted by `at`.
    pub keys: Vec<Keyframe<T>>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Build from keys, validating order and range.
    pub fn new(keys: Vec<Keyframe<T>>) -> ChoreoResult<Self> {
        let kf = Self { keys };
        kf.validate()?;
        Ok(kf)
    }

    /// Check non-emptiness, range and ordering.
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.keys.is_empty() {
            return Err(ChoreoError::animation(
                "Keyframes must have at least one key",
            ));
        }
        if self
            .keys
            .iter()
            .any(|k| !k.at.is_finite() || !(0.0..=1.0).contains(&k.at))
        {
            return Err(ChoreoError::animation(
                "Keyframe positions must be inside [0, 1]",
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(ChoreoError::animation("Keyframes must be sorted by position"));
        }
        Ok(())
    }

    /// Sample at local progress `t`; holds the end keys outside their range.
    pub fn sample(&self, t: f64) -> ChoreoResult<T> {
        let Some(first) = self.keys.first() else {
            return Err(ChoreoError::animation("Keyframes has no keys"));
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let idx = self.keys.partition_point(|k| k.at <= t);
        if idx == 0 {
            return Ok(first.value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.at - a.at;
        if span <= 0.0 {
            return Ok(b.value.clone());
        }
        let local = (t - a.at) / span;
        Ok(T::lerp(&a.value, &b.value, a.ease.apply(local)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
