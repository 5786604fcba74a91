/// Convenience result type used across scrollwork.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Top-level error taxonomy.
///
/// Only definition and configuration loading produce errors. Runtime choreography treats a
/// missing anchor as an expected transient state and degrades instead.
#[derive(thiserror::Error, Debug)]
pub enum ChoreoError {
    /// Invalid phase tables, keyframes or timeline definitions.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while sampling keyframes or evaluating a timeline.
    #[error("animation error: {0}")]
    Animation(String),

    /// Geometry that cannot be used (degenerate sizes, unknown anchors in strict lookups).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing definitions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChoreoError {
    /// Build a [`ChoreoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChoreoError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ChoreoError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`ChoreoError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ChoreoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
