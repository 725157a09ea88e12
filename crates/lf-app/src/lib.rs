//! Shared application service layer for loopflow.
//!
//! Turns network descriptions into solver problems, runs them and formats
//! the results, so the CLI stays a thin shell over these functions.

pub mod compile;
pub mod error;
pub mod network_service;
pub mod run_service;

pub use compile::{CompiledNetwork, DEFAULT_HYDRAULIC_GUESS_LPS, compile};
pub use error::{AppError, AppResult};
pub use network_service::{
    ElementSummary, LoopSummary, NetworkSummary, NodeSummary, load_network, save_network,
    summarize, validate_network,
};
pub use run_service::{RunOptions, RunReport, run};
