//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use lf_core::numeric::ensure_finite;

/// Flow magnitude below which a pipe is treated as stagnant (m^3/s).
pub const EPSILON_FLOW: f64 = 1e-12;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}
