//! Fixed across-quantity sources.

use crate::error::ComponentResult;
use crate::traits::{Branch, Domain};
use lf_core::Real;
use lf_core::units::Length;
use lf_graph::Traversal;

/// Ideal battery: potential rises by `volts` from the `from` terminal to the `to` terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    name: String,
    pub volts: Real,
}

impl VoltageSource {
    pub fn new(name: impl Into<String>, volts: Real) -> Self {
        Self {
            name: name.into(),
            volts,
        }
    }

    /// The fixed voltage, negated when traversed against the polarity.
    pub fn across(&self, traversal: Traversal) -> Real {
        traversal.sign() * self.volts
    }
}

impl Branch for VoltageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn potential_gain(&self, _through: Real, traversal: Traversal) -> ComponentResult<Real> {
        Ok(self.across(traversal))
    }

    fn is_source(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::Electrical
    }
}

/// Fixed head gain (pump at its duty point, reservoir level difference).
#[derive(Debug, Clone, PartialEq)]
pub struct HeadSource {
    name: String,
    pub head: Length,
}

impl HeadSource {
    pub fn new(name: impl Into<String>, head: Length) -> Self {
        Self {
            name: name.into(),
            head,
        }
    }

    /// Head gain in metres, negated when traversed against the polarity.
    pub fn across(&self, traversal: Traversal) -> Real {
        traversal.sign() * self.head.value
    }
}

impl Branch for HeadSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn potential_gain(&self, _through: Real, traversal: Traversal) -> ComponentResult<Real> {
        Ok(self.across(traversal))
    }

    fn is_source(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::Hydraulic
    }
}
