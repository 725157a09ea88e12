//! Error types for the lf-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read network file: {path}")]
    FileRead {
        path: PathBuf,
        source: lf_project::ProjectError,
    },

    #[error("Network validation failed: {0}")]
    Validation(String),

    #[error("Network compilation failed: {0}")]
    Compile(String),

    #[error("Solver error: {0}")]
    Solver(String),
}

/// Result type for lf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<lf_project::ProjectError> for AppError {
    fn from(err: lf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<lf_project::ValidationError> for AppError {
    fn from(err: lf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<lf_graph::GraphError> for AppError {
    fn from(err: lf_graph::GraphError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<lf_solver::SolverError> for AppError {
    fn from(err: lf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}
