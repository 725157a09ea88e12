//! Linear resistor.

use crate::error::ComponentResult;
use crate::traits::{Branch, Domain};
use lf_core::Real;
use lf_graph::Traversal;

/// Ohmic resistor: `V = R I`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    name: String,
    /// Resistance in ohms
    pub ohms: Real,
}

impl Resistor {
    pub fn new(name: impl Into<String>, ohms: Real) -> Self {
        Self {
            name: name.into(),
            ohms,
        }
    }

    /// Voltage drop in the declared direction for a given current.
    pub fn across(&self, current: Real) -> Real {
        self.ohms * current
    }
}

impl Branch for Resistor {
    fn name(&self) -> &str {
        &self.name
    }

    fn potential_gain(&self, through: Real, traversal: Traversal) -> ComponentResult<Real> {
        Ok(-traversal.sign() * self.across(through))
    }

    fn domain(&self) -> Domain {
        Domain::Electrical
    }
}
