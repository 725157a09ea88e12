//! Error types for solver operations.

use lf_components::ComponentError;
use lf_core::error::LfError;
use lf_graph::GraphError;
use thiserror::Error;

/// Errors that can occur while setting up or solving a network.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for LfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { what } => LfError::InvalidArg { what },
            SolverError::ConvergenceFailed { what } => LfError::Invariant {
                what: format!("no convergence: {what}"),
            },
            SolverError::Component(err) => err.into(),
            SolverError::Graph(err) => err.into(),
            SolverError::Numeric { what } => LfError::Invariant { what },
        }
    }
}
