//! Error types for component operations.

use lf_core::error::LfError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for LfError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => LfError::InvalidArg {
                what: format!("non-physical {what}"),
            },
            ComponentError::ConvergenceFailed { what } => LfError::InvalidArg {
                what: format!("no convergence in {what}"),
            },
            ComponentError::InvalidArg { what } => LfError::InvalidArg {
                what: what.to_string(),
            },
        }
    }
}
