use crate::{
    animation::ease::Ease,
    foundation::core::Progress,
    foundation::error::{ChoreoError, ChoreoResult},
};

const CONTIGUITY_EPS: f64 = 1e-9;

/// A contiguous sub-range of progress mapped to one behavior.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseSpan {
    /// Phase name, unique within a table.
    pub name: String,
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end (inclusive for the last phase).
    pub end: f64,
    /// Ease applied to the phase-local progress.
    #[serde(default)]
    pub ease: Ease,
}

impl PhaseSpan {
    /// Width of the span in progress space.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, contiguous, non-overlapping phases covering `[0, 1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PhaseTable {
    spans: Vec<PhaseSpan>,
}

impl PhaseTable {
    /// Build from explicit spans and validate them.
    pub fn new(spans: Vec<PhaseSpan>) -> ChoreoResult<Self> {
        let table = Self { spans };
        table.validate()?;
        Ok(table)
    }

    /// Normalize relative weights into contiguous spans.
    ///
    /// Weights only need to be positive; `[("enter", 2), ("hold", 1)]` yields
    /// `enter = [0, 2/3)` and `hold = [2/3, 1]`.
    pub fn from_weights<N>(weights: impl IntoIterator<Item = (N, f64, Ease)>) -> ChoreoResult<Self>
    where
        N: Into<String>,
    {
        let weights: Vec<(String, f64, Ease)> = weights
            .into_iter()
            .map(|(n, w, e)| (n.into(), w, e))
            .collect();
        if weights.is_empty() {
            return Err(ChoreoError::validation("phase table must not be empty"));
        }
        if let Some((name, w, _)) = weights.iter().find(|(_, w, _)| !(w.is_finite() && *w > 0.0)) {
            return Err(ChoreoError::validation(format!(
                "phase '{name}' has non-positive weight {w}"
            )));
        }

        let total: f64 = weights.iter().map(|(_, w, _)| w).sum();
        let last = weights.len() - 1;
        let mut acc = 0.0;
        let mut start = 0.0;
        let mut spans = Vec::with_capacity(weights.len());
        for (i, (name, w, ease)) in weights.into_iter().enumerate() {
            acc += w;
            let end = if i == last { 1.0 } else { acc / total };
            spans.push(PhaseSpan {
                name,
                start,
                end,
                ease,
            });
            start = end;
        }
        Self::new(spans)
    }

    /// Check that phases are contiguous and non-overlapping over `[0, 1]`.
    pub fn validate(&self) -> ChoreoResult<()> {
        let (Some(first), Some(last)) = (self.spans.first(), self.spans.last()) else {
            return Err(ChoreoError::validation("phase table must not be empty"));
        };
        if first.start.abs() > CONTIGUITY_EPS {
            return Err(ChoreoError::validation(format!(
                "first phase '{}' must start at 0",
                first.name
            )));
        }
        if (last.end - 1.0).abs() > CONTIGUITY_EPS {
            return Err(ChoreoError::validation(format!(
                "last phase '{}' must end at 1",
                last.name
            )));
        }
        for span in &self.spans {
            if !(span.start.is_finite() && span.end.is_finite() && span.start < span.end) {
                return Err(ChoreoError::validation(format!(
                    "phase '{}' must satisfy start < end",
                    span.name
                )));
            }
        }
        for w in self.spans.windows(2) {
            if (w[0].end - w[1].start).abs() > CONTIGUITY_EPS {
                let kind = if w[1].start < w[0].end { "overlaps" } else { "leaves a gap after" };
                return Err(ChoreoError::validation(format!(
                    "phase '{}' {kind} phase '{}'",
                    w[1].name, w[0].name
                )));
            }
        }
        for (i, span) in self.spans.iter().enumerate() {
            if self.spans[..i].iter().any(|s| s.name == span.name) {
                return Err(ChoreoError::validation(format!(
                    "duplicate phase name '{}'",
                    span.name
                )));
            }
        }
        Ok(())
    }

    /// Phases in order.
    pub fn spans(&self) -> &[PhaseSpan] {
        &self.spans
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Always `false` for a validated table.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Index of the phase called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.spans.iter().position(|s| s.name == name)
    }
}

/// Result of mapping one progress value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PhaseHit {
    /// Index of the active phase.
    pub index: usize,
    /// Clamped overall progress.
    pub progress: Progress,
    /// Phase-local progress before easing.
    pub local: f64,
    /// Phase-local progress after the phase ease.
    pub eased: f64,
}

/// Maps overall progress to the active phase and its local progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProgressMapper {
    table: PhaseTable,
}

impl ProgressMapper {
    /// Wrap a validated table.
    pub fn new(table: PhaseTable) -> ChoreoResult<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Underlying phase table.
    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    /// Locate `raw` progress.
    ///
    /// Values outside `[0, 1]` are clamped, never extrapolated. A value exactly on a boundary
    /// belongs to the later phase; the last phase also owns `1.0`.
    pub fn map(&self, raw: f64) -> PhaseHit {
        let progress = Progress::clamped(raw);
        let p = progress.get();
        let spans = self.table.spans();
        let index = spans
            .partition_point(|s| s.start <= p)
            .saturating_sub(1)
            .min(spans.len().saturating_sub(1));
        let span = &spans[index];
        let local = ((p - span.start) / span.width()).clamp(0.0, 1.0);
        PhaseHit {
            index,
            progress,
            local,
            eased: span.ease.apply(local),
        }
    }

    /// Name of the phase at `index`.
    pub fn phase_name(&self, index: usize) -> Option<&str> {
        self.table.spans().get(index).map(|s| s.name.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/mapper.rs"]
mod tests;
