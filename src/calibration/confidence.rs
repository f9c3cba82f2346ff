use crate::config::EnsembleConfig;

/// Default Wilson z used when the caller does not override it.
pub const DEFAULT_WILSON_Z: f64 = 1.34;

/// Lower bound of the Wilson score interval for an observed win rate `p`
/// over `n` samples.
///
/// The bound is a conservative estimate of the true win probability: for
/// small `n` it sits well below `p`, so a lucky short streak earns little
/// trust, and it converges to `p` as `n` grows. With no samples the observed
/// rate is returned unchanged.
pub fn wilson_lower_bound(p: f64, n: f64, z: f64) -> f64 {
    if n <= 0.0 {
        return p;
    }
    let z2 = z * z;
    let center = p + z2 / (2.0 * n);
    let margin = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    let denom = 1.0 + z2 / n;
    ((center - margin) / denom).clamp(0.0, 1.0)
}

/// Rescale the edge above the breakeven baseline into an integer ensemble
/// weight. A model whose bound does not clear the baseline is silenced
/// outright, not merely down-weighted.
pub fn weight_from_bound(bound: f64, cfg: &EnsembleConfig) -> u32 {
    if bound <= cfg.baseline_prob {
        return 0;
    }
    let edge = (bound - cfg.baseline_prob) / (1.0 - cfg.baseline_prob);
    (edge * cfg.weight_scale as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_returns_raw_probability() {
        assert!((wilson_lower_bound(0.5, 0.0, DEFAULT_WILSON_Z) - 0.5).abs() < f64::EPSILON);
        assert!((wilson_lower_bound(0.7, -3.0, DEFAULT_WILSON_Z) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn small_samples_are_pulled_below_observed_rate() {
        let bound = wilson_lower_bound(0.9, 5.0, DEFAULT_WILSON_Z);
        assert!(bound < 0.9);
        assert!(bound >= 0.0);
    }

    #[test]
    fn bound_converges_toward_observed_rate() {
        let near = wilson_lower_bound(0.6, 10_000.0, DEFAULT_WILSON_Z);
        assert!((near - 0.6).abs() < 0.01);
    }
}
