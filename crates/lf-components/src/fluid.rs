//! Incompressible working fluid for hydraulic branches.

use lf_core::units::{Density, DynVisc, KinVisc, kg_per_m3, pa_s};

/// Constant-property liquid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluid {
    pub mu: DynVisc,
    pub rho: Density,
}

impl Fluid {
    pub fn new(mu: DynVisc, rho: Density) -> Self {
        Self { mu, rho }
    }

    /// Water at roughly 25 C.
    pub fn water() -> Self {
        Self::new(pa_s(0.00089), kg_per_m3(1000.0))
    }

    /// Kinematic viscosity `mu / rho`.
    pub fn nu(&self) -> KinVisc {
        self.mu / self.rho
    }
}

impl Default for Fluid {
    fn default() -> Self {
        Self::water()
    }
}
