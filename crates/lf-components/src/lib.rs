//! lf-components: branch library for loopflow networks.
//!
//! Provides models for two-terminal network branches:
//! - Resistors (Ohm's law)
//! - Voltage and head sources with fixed polarity
//! - Pipes with Darcy-Weisbach friction and a three-regime friction factor
//!
//! All branches implement the `Branch` trait: the potential gained along a
//! traversal is recomputed from the through-quantity on every call.
//!
//! # Example
//!
//! ```
//! use lf_components::{Branch, Resistor, VoltageSource};
//! use lf_graph::Traversal;
//!
//! let battery = VoltageSource::new("ab", 12.0);
//! let load = Resistor::new("ba", 4.0);
//!
//! // Going around the loop the source rise equals the resistor drop at 3 A.
//! let rise = battery.potential_gain(3.0, Traversal::Forward).unwrap();
//! let drop = load.potential_gain(3.0, Traversal::Forward).unwrap();
//! assert_eq!(rise + drop, 0.0);
//! ```

pub mod common;
pub mod error;
pub mod fluid;
pub mod friction;
pub mod noise;
pub mod pipe;
pub mod resistor;
pub mod source;
pub mod traits;

// Re-exports
pub use error::{ComponentError, ComponentResult};
pub use fluid::Fluid;
pub use friction::{FrictionPolicy, Regime};
pub use noise::{GaussianNoise, MeanOnly, NoiseSource};
pub use pipe::Pipe;
pub use resistor::Resistor;
pub use source::{HeadSource, VoltageSource};
pub use traits::{Branch, Domain};
