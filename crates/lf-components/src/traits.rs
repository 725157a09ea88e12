//! Core traits for branch models.

use crate::error::ComponentResult;
use lf_core::Real;
use lf_graph::{Polarity, Traversal};

/// Physical domain of a branch, used to label reported quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Current in amperes, potential in volts.
    Electrical,
    /// Volumetric flow in m^3/s, potential as head in metres.
    Hydraulic,
}

/// Trait for two-terminal branches placed between two network nodes.
///
/// The across-quantity is never stored: it is recomputed from the
/// through-quantity on every call. Implementations must be deterministic
/// unless they were explicitly given a noise source.
pub trait Branch: Send + Sync {
    /// Branch name for debugging and identification.
    fn name(&self) -> &str;

    /// Potential gained by a walk crossing the branch in `traversal` direction.
    ///
    /// `through` is positive when it runs from the declared `from` endpoint to
    /// the declared `to` endpoint. Passive branches return a negative gain (a
    /// drop) when the walk follows the flow; sources return their fixed rise
    /// when the walk follows their polarity. Summing this around a closed loop
    /// gives zero at a physical solution.
    fn potential_gain(&self, through: Real, traversal: Traversal) -> ComponentResult<Real>;

    /// Sources impose an across-quantity independent of the through-quantity.
    fn is_source(&self) -> bool {
        false
    }

    /// Identity semantics of the branch endpoints.
    fn polarity(&self) -> Polarity {
        if self.is_source() {
            Polarity::Directed
        } else {
            Polarity::Undirected
        }
    }

    fn domain(&self) -> Domain;
}
