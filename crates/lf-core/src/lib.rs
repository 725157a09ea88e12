//! lf-core: stable foundation for loopflow.
//!
//! Contains:
//! - units (uom SI types + constructors for pipe and fluid parameters)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for nodes, elements and loops)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{LfError, LfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
