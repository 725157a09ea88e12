//! Darcy friction factor with a three-regime policy.
//!
//! - `Re <= laminar_limit`: Hagen-Poiseuille, `f = 64 / Re`
//! - `Re >= turbulent_limit`: implicit Colebrook-White equation
//! - in between: linear blend of the two limit values, perturbed by a noise
//!   source with a standard deviation proportional to the blended mean

use crate::error::{ComponentError, ComponentResult};
use crate::noise::NoiseSource;
use lf_core::Real;

/// Laminar friction factor.
pub fn laminar(reynolds: Real) -> ComponentResult<Real> {
    if !(reynolds.is_finite() && reynolds > 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "Reynolds number",
        });
    }
    Ok(64.0 / reynolds)
}

/// Solve the Colebrook-White equation
/// `1/sqrt(f) = -2 log10(rr/3.7 + 2.51/(Re sqrt(f)))` for `f`.
///
/// Newton iteration on `x = 1/sqrt(f)` from the fixed starting guess `f0`.
pub fn colebrook(
    reynolds: Real,
    rel_rough: Real,
    f0: Real,
    tol: Real,
    max_iter: usize,
) -> ComponentResult<Real> {
    if !(reynolds.is_finite() && reynolds > 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "Reynolds number",
        });
    }
    if !(rel_rough.is_finite() && rel_rough >= 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "relative roughness",
        });
    }
    if f0.is_nan() || f0 <= 0.0 {
        return Err(ComponentError::InvalidArg {
            what: "Colebrook starting guess must be positive",
        });
    }

    let a = rel_rough / 3.7;
    let b = 2.51 / reynolds;
    let mut x = 1.0 / f0.sqrt();

    for _ in 0..max_iter {
        let arg = a + b * x;
        if arg.is_nan() || arg <= 0.0 {
            break;
        }
        let h = x + 2.0 * arg.log10();
        let dh = 1.0 + 2.0 / std::f64::consts::LN_10 * b / arg;
        let dx = h / dh;
        x -= dx;
        if !x.is_finite() || x <= 0.0 {
            break;
        }
        if dx.abs() <= tol * x.abs().max(1.0) {
            return Ok(1.0 / (x * x));
        }
    }

    Err(ComponentError::ConvergenceFailed {
        what: "Colebrook friction factor",
    })
}

/// Regime thresholds and solver settings for the friction factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionPolicy {
    /// Reynolds number at or below which flow is laminar.
    pub laminar_limit: Real,
    /// Reynolds number at or above which flow is fully turbulent.
    pub turbulent_limit: Real,
    /// Standard deviation of the transitional draw, as a fraction of its mean.
    pub spread: Real,
    /// Starting guess for the Colebrook solve.
    pub colebrook_start: Real,
    pub colebrook_tol: Real,
    pub colebrook_max_iter: usize,
}

impl Default for FrictionPolicy {
    fn default() -> Self {
        Self {
            laminar_limit: 2000.0,
            turbulent_limit: 4000.0,
            spread: 0.2,
            colebrook_start: 0.01,
            colebrook_tol: 1e-12,
            colebrook_max_iter: 50,
        }
    }
}

/// Flow regime selected by the Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Laminar,
    Transitional,
    Turbulent,
}

impl FrictionPolicy {
    pub fn regime(&self, reynolds: Real) -> Regime {
        if reynolds <= self.laminar_limit {
            Regime::Laminar
        } else if reynolds >= self.turbulent_limit {
            Regime::Turbulent
        } else {
            Regime::Transitional
        }
    }

    /// Colebrook factor with this policy's solver settings.
    pub fn turbulent(&self, reynolds: Real, rel_rough: Real) -> ComponentResult<Real> {
        colebrook(
            reynolds,
            rel_rough,
            self.colebrook_start,
            self.colebrook_tol,
            self.colebrook_max_iter,
        )
    }

    /// Blend of the laminar value at the lower limit and the turbulent value
    /// at the upper limit, linear in the Reynolds number.
    pub fn transitional_mean(&self, reynolds: Real, rel_rough: Real) -> ComponentResult<Real> {
        let f_lo = laminar(self.laminar_limit)?;
        let f_hi = self.turbulent(self.turbulent_limit, rel_rough)?;
        let t = (reynolds - self.laminar_limit) / (self.turbulent_limit - self.laminar_limit);
        Ok(f_lo + t * (f_hi - f_lo))
    }

    /// Friction factor for a Reynolds number and relative roughness.
    pub fn friction_factor(
        &self,
        reynolds: Real,
        rel_rough: Real,
        noise: &dyn NoiseSource,
    ) -> ComponentResult<Real> {
        match self.regime(reynolds) {
            Regime::Laminar => laminar(reynolds),
            Regime::Turbulent => self.turbulent(reynolds, rel_rough),
            Regime::Transitional => {
                let mean = self.transitional_mean(reynolds, rel_rough)?;
                Ok(noise.perturb(mean, self.spread * mean))
            }
        }
    }
}
