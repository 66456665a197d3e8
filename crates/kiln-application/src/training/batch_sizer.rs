//! Dynamic Batch Sizing (§4.7.1).

/// Quality trend over a rolling window of recent batch evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTrend {
    /// Slope strongly positive.
    StronglyImproving,
    /// Slope mildly positive.
    Improving,
    /// Slope near zero.
    Flat,
    /// Slope mildly negative.
    Declining,
    /// Slope strongly negative.
    StronglyDeclining,
}

impl QualityTrend {
    fn multiplier(self) -> f64 {
        match self {
            Self::StronglyImproving => 1.2,
            Self::Improving => 1.1,
            Self::Flat => 1.0,
            Self::Declining => 0.9,
            Self::StronglyDeclining => 0.8,
        }
    }

    /// Classify a simple linear slope computed over a recent quality series.
    #[must_use]
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.05 {
            Self::StronglyImproving
        } else if slope > 0.01 {
            Self::Improving
        } else if slope > -0.01 {
            Self::Flat
        } else if slope > -0.05 {
            Self::Declining
        } else {
            Self::StronglyDeclining
        }
    }
}

/// Bounds and rarity cutoffs feeding [`dynamic_batch_size`], mirroring
/// [`crate::config::PoolConfig`].
#[derive(Debug, Clone, Copy)]
pub struct BatchSizerBounds {
    /// Smallest permitted batch.
    pub min_batch: usize,
    /// Largest permitted batch.
    pub max_batch: usize,
}

impl Default for BatchSizerBounds {
    fn default() -> Self {
        Self {
            min_batch: 20,
            max_batch: 100,
        }
    }
}

fn base_size(n: usize, bounds: &BatchSizerBounds) -> usize {
    if n < 30 {
        bounds.min_batch
    } else if n < 50 {
        30
    } else if n < 100 {
        50
    } else if n < 200 {
        75
    } else {
        bounds.max_batch
    }
}

fn quality_multiplier(q: f64, quality_target: f64) -> f64 {
    if q >= 0.8 {
        0.7
    } else if q >= quality_target {
        1.0
    } else {
        1.3
    }
}

fn rarity_multiplier(cumulative_seen: usize) -> f64 {
    if cumulative_seen < 50 {
        0.5
    } else if cumulative_seen < 100 {
        0.7
    } else {
        1.0
    }
}

/// Compute a training batch size in `[min_batch, max_batch]`, or `0` if
/// fewer than `min_batch` examples are available (§4.7.1).
#[must_use]
pub fn dynamic_batch_size(
    n: usize,
    avg_quality: f64,
    quality_target: f64,
    trend: QualityTrend,
    cumulative_seen: usize,
    bounds: &BatchSizerBounds,
) -> usize {
    if n < bounds.min_batch {
        return 0;
    }
    let base = base_size(n, bounds) as f64;
    let size = base
        * quality_multiplier(avg_quality, quality_target)
        * rarity_multiplier(cumulative_seen)
        * trend.multiplier();

    (size.round() as usize).clamp(bounds.min_batch, bounds.max_batch.min(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_examples_yields_zero() {
        let bounds = BatchSizerBounds::default();
        assert_eq!(dynamic_batch_size(10, 0.8, 0.9, QualityTrend::Flat, 200, &bounds), 0);
    }

    #[test]
    fn high_quality_shrinks_batch_relative_to_low_quality() {
        let bounds = BatchSizerBounds::default();
        let high_q = dynamic_batch_size(500, 0.9, 0.9, QualityTrend::Flat, 500, &bounds);
        let low_q = dynamic_batch_size(500, 0.5, 0.9, QualityTrend::Flat, 500, &bounds);
        assert!(high_q < low_q);
    }

    #[test]
    fn rare_types_use_smaller_batches() {
        let bounds = BatchSizerBounds::default();
        let rare = dynamic_batch_size(500, 0.6, 0.9, QualityTrend::Flat, 10, &bounds);
        let common = dynamic_batch_size(500, 0.6, 0.9, QualityTrend::Flat, 500, &bounds);
        assert!(rare <= common);
    }

    #[test]
    fn result_always_within_bounds() {
        let bounds = BatchSizerBounds::default();
        for n in [30, 50, 100, 200, 5000] {
            let size = dynamic_batch_size(n, 0.95, 0.9, QualityTrend::StronglyImproving, 1000, &bounds);
            assert!(size == 0 || (size >= bounds.min_batch && size <= bounds.max_batch));
        }
    }

    #[test]
    fn trend_slope_classification_matches_bands() {
        assert_eq!(QualityTrend::from_slope(0.1), QualityTrend::StronglyImproving);
        assert_eq!(QualityTrend::from_slope(0.02), QualityTrend::Improving);
        assert_eq!(QualityTrend::from_slope(0.0), QualityTrend::Flat);
        assert_eq!(QualityTrend::from_slope(-0.02), QualityTrend::Declining);
        assert_eq!(QualityTrend::from_slope(-0.1), QualityTrend::StronglyDeclining);
    }
}
