//! Topology error types.

use lf_core::{ElemId, LfError, NodeId, Real};

pub type GraphResult<T> = Result<T, GraphError>;

/// Topology construction, validation and lookup errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An element refers to a node that doesn't exist.
    InvalidNodeRef { elem: String, node: NodeId },

    /// An element's two endpoints are the same node.
    SelfLoop { elem: String },

    /// Two nodes, elements or loops share a name.
    DuplicateName { what: &'static str, name: String },

    /// A loop refers to an element that doesn't exist.
    InvalidElemRef { loop_name: String, elem: ElemId },

    /// A loop has no members.
    EmptyLoop { loop_name: String },

    /// A loop's members do not form a closed walk.
    OpenLoop { loop_name: String, step: usize },

    /// A node cannot be reached from the rest of the network.
    Disconnected { node: String },

    /// External demands do not sum to zero, so no steady state exists.
    UnbalancedDemand { total: Real },

    /// The network has no nodes.
    Empty,

    /// Lookup by name found no element.
    UnknownElement { name: String },

    /// Lookup by name found no node.
    UnknownNode { name: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidNodeRef { elem, node } => {
                write!(f, "Element {} refers to non-existent node {}", elem, node)
            }
            GraphError::SelfLoop { elem } => {
                write!(f, "Element {} connects a node to itself", elem)
            }
            GraphError::DuplicateName { what, name } => {
                write!(f, "Duplicate {} name: {}", what, name)
            }
            GraphError::InvalidElemRef { loop_name, elem } => {
                write!(
                    f,
                    "Loop {} refers to non-existent element {}",
                    loop_name, elem
                )
            }
            GraphError::EmptyLoop { loop_name } => {
                write!(f, "Loop {} has no elements", loop_name)
            }
            GraphError::OpenLoop { loop_name, step } => {
                write!(
                    f,
                    "Loop {} is not a closed walk (breaks at step {})",
                    loop_name, step
                )
            }
            GraphError::Disconnected { node } => {
                write!(f, "Node {} is not connected to the network", node)
            }
            GraphError::UnbalancedDemand { total } => {
                write!(f, "External demands sum to {} instead of zero", total)
            }
            GraphError::Empty => write!(f, "Network has no nodes"),
            GraphError::UnknownElement { name } => {
                write!(f, "No element named {}", name)
            }
            GraphError::UnknownNode { name } => {
                write!(f, "No node named {}", name)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for LfError {
    fn from(err: GraphError) -> Self {
        LfError::Invariant {
            what: err.to_string(),
        }
    }
}
