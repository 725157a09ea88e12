//! Injectable noise for the transitional flow regime.
//!
//! Measured friction factors scatter between the laminar and turbulent
//! limits. The scatter is modelled as a draw around the interpolated mean;
//! `MeanOnly` turns it off so that solves stay reproducible.

use std::fmt;
use std::sync::Mutex;

use lf_core::Real;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Source of random perturbations applied to a deterministic mean.
pub trait NoiseSource: Send + Sync + fmt::Debug {
    /// Return a value distributed around `mean` with standard deviation `sigma`.
    fn perturb(&self, mean: Real, sigma: Real) -> Real;
}

/// Deterministic source: always returns the mean.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanOnly;

impl NoiseSource for MeanOnly {
    fn perturb(&self, mean: Real, _sigma: Real) -> Real {
        mean
    }
}

/// Normally distributed noise from a seedable generator.
pub struct GaussianNoise {
    rng: Mutex<StdRng>,
}

impl GaussianNoise {
    /// Reproducible noise: the same seed yields the same sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Noise seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl fmt::Debug for GaussianNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaussianNoise").finish_non_exhaustive()
    }
}

impl NoiseSource for GaussianNoise {
    fn perturb(&self, mean: Real, sigma: Real) -> Real {
        if !sigma.is_finite() || sigma <= 0.0 {
            return mean;
        }
        match Normal::new(mean, sigma) {
            Ok(dist) => {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                dist.sample(&mut *rng)
            }
            Err(_) => mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_only_is_deterministic() {
        assert_eq!(MeanOnly.perturb(0.03, 0.006), 0.03);
    }

    #[test]
    fn same_seed_same_draws() {
        let a = GaussianNoise::seeded(7);
        let b = GaussianNoise::seeded(7);
        for _ in 0..5 {
            assert_eq!(a.perturb(1.0, 0.2), b.perturb(1.0, 0.2));
        }
    }

    #[test]
    fn zero_sigma_returns_mean() {
        let n = GaussianNoise::seeded(1);
        assert_eq!(n.perturb(0.5, 0.0), 0.5);
        assert_eq!(n.perturb(0.5, f64::NAN), 0.5);
    }

    #[test]
    fn sample_mean_is_close() {
        let n = GaussianNoise::seeded(42);
        let draws: Vec<f64> = (0..2000).map(|_| n.perturb(10.0, 2.0)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        // standard error is 2/sqrt(2000) ~ 0.045
        assert!((mean - 10.0).abs() < 0.3, "sample mean {mean}");
    }
}
