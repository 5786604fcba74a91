//! Time arithmetic for sequenced and staggered tweens.

/// Start offsets for `count` items, each starting `each_ms` after the previous one.
pub fn stagger(count: usize, each_ms: u64) -> Vec<u64> {
    (0..count as u64).map(|i| i.saturating_mul(each_ms)).collect()
}

/// Total length of a stagger: last offset plus one item's duration.
pub fn stagger_total(count: usize, each_ms: u64, duration_ms: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (count as u64 - 1)
        .saturating_mul(each_ms)
        .saturating_add(duration_ms)
}

/// Local progress of one tween that starts at `offset_ms` and lasts `duration_ms`.
///
/// Zero-length tweens are complete as soon as they start.
pub fn local_progress(elapsed_ms: u64, offset_ms: u64, duration_ms: u64) -> f64 {
    if elapsed_ms < offset_ms {
        return 0.0;
    }
    if duration_ms == 0 {
        return 1.0;
    }
    ((elapsed_ms - offset_ms) as f64 / duration_ms as f64).min(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ops.rs"]
mod tests;
