//! Pipe with friction using the Darcy-Weisbach head-loss law.

use std::sync::Arc;

use crate::common::{EPSILON_FLOW, check_finite};
use crate::error::{ComponentError, ComponentResult};
use crate::fluid::Fluid;
use crate::friction::{FrictionPolicy, Regime};
use crate::noise::{MeanOnly, NoiseSource};
use crate::traits::{Branch, Domain};
use lf_core::Real;
use lf_core::numeric::flow_sign;
use lf_core::units::Length;
use lf_core::units::constants;
use lf_graph::Traversal;

/// Pipe with friction.
///
/// Through-quantity is the volumetric flow in m^3/s, positive from the
/// declared `from` node to the `to` node. The across-quantity is the
/// friction head loss in metres, `h = f (L/D) v^2 / (2 g)`.
#[derive(Debug, Clone)]
pub struct Pipe {
    name: String,
    /// Pipe length
    pub length: Length,
    /// Pipe inner diameter
    pub diameter: Length,
    /// Surface roughness (absolute)
    pub roughness: Length,
    pub fluid: Fluid,
    pub policy: FrictionPolicy,
    noise: Arc<dyn NoiseSource>,
}

impl Pipe {
    /// Create a new pipe with the default friction policy and no transitional noise.
    pub fn new(
        name: impl Into<String>,
        length: Length,
        diameter: Length,
        roughness: Length,
        fluid: Fluid,
    ) -> Self {
        Self {
            name: name.into(),
            length,
            diameter,
            roughness,
            fluid,
            policy: FrictionPolicy::default(),
            noise: Arc::new(MeanOnly),
        }
    }

    pub fn with_policy(mut self, policy: FrictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Perturb transitional friction factors with `noise`.
    pub fn with_noise(mut self, noise: Arc<dyn NoiseSource>) -> Self {
        self.noise = noise;
        self
    }

    /// Flow cross-section in m^2.
    pub fn area(&self) -> Real {
        std::f64::consts::PI / 4.0 * self.diameter.value.powi(2)
    }

    pub fn relative_roughness(&self) -> Real {
        self.roughness.value / self.diameter.value
    }

    /// Mean velocity magnitude for a flow rate, m/s.
    pub fn velocity(&self, flow: Real) -> Real {
        flow.abs() / self.area()
    }

    /// Reynolds number for a flow rate.
    pub fn reynolds(&self, flow: Real) -> Real {
        self.fluid.rho.value * self.velocity(flow) * self.diameter.value / self.fluid.mu.value
    }

    /// Darcy friction factor for a flow rate.
    pub fn friction_factor(&self, flow: Real) -> ComponentResult<Real> {
        let re = check_finite(self.reynolds(flow), "Reynolds number")?;
        self.policy
            .friction_factor(re, self.relative_roughness(), self.noise.as_ref())
    }

    /// Friction head loss magnitude in metres for a flow rate.
    pub fn head_loss(&self, flow: Real) -> ComponentResult<Real> {
        if !(self.diameter.value > 0.0 && self.length.value >= 0.0) {
            return Err(ComponentError::NonPhysical {
                what: "pipe geometry",
            });
        }
        let flow = check_finite(flow, "pipe flow")?;
        if flow.abs() < EPSILON_FLOW {
            return Ok(0.0);
        }

        let v = self.velocity(flow);
        let d = self.diameter.value;
        let l = self.length.value;
        let g = constants::g().value;
        let re = check_finite(self.reynolds(flow), "Reynolds number")?;

        let hl = match self.policy.regime(re) {
            // 64/Re * (L/D) * v^2/2g, written without the division by Re so that
            // the loss stays smooth through zero flow.
            Regime::Laminar => {
                32.0 * self.fluid.mu.value * l * v / (self.fluid.rho.value * g * d * d)
            }
            _ => {
                let f = self.friction_factor(flow)?;
                f * (l / d) * v * v / (2.0 * g)
            }
        };

        check_finite(hl, "head loss")
    }
}

impl Branch for Pipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn potential_gain(&self, through: Real, traversal: Traversal) -> ComponentResult<Real> {
        let hl = self.head_loss(through)?;
        Ok(-traversal.sign() * flow_sign(through) * hl)
    }

    fn domain(&self) -> Domain {
        Domain::Hydraulic
    }
}
