//! Loop/node network solver.
//!
//! The unknowns are element through-quantities (currents, volumetric flows),
//! or any set of quantities linearly mapped onto them by a `FlowMap`. The
//! residual vector stacks one loop law per declared loop (net potential
//! gained around the walk) and one conservation law per independent node
//! (net flow leaving it, plus external demand). Nodes the flow map already
//! balances, as with mesh currents, contribute no row. A damped Newton
//! iteration with a finite-difference Jacobian drives the residuals to zero.

pub mod error;
pub mod flow_map;
pub mod jacobian;
pub mod newton;
pub mod problem;
pub mod residual;
pub mod solve;

pub use error::{SolverError, SolverResult};
pub use flow_map::FlowMap;
pub use newton::{NewtonConfig, NewtonResult};
pub use problem::{NetworkProblem, node_rows};
pub use residual::{compute_residuals, loop_residual, node_residual};
pub use solve::{DEFAULT_GUESS, NetworkSolution, solve};
