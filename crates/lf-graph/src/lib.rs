//! lf-graph: topology layer for loopflow.
//!
//! Provides:
//! - Core topology data structures (Node, Element, Loop, Graph)
//! - Incremental builder with validation (closed loops, connectivity)
//! - Incidence lists and name lookups for residual assembly
//!
//! # Example
//!
//! ```
//! use lf_graph::{GraphBuilder, Polarity, Traversal};
//!
//! let mut builder = GraphBuilder::new();
//! let a = builder.add_node("a");
//! let b = builder.add_node("b");
//! let src = builder.add_element("ab", a, b, Polarity::Directed);
//! let res = builder.add_element("ba", b, a, Polarity::Undirected);
//! builder.add_loop("L1", &[src, res]);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.loops()[0].steps[1].traversal, Traversal::Forward);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Element, Endpoints, Graph, Incident, Loop, Node, Polarity, Step, Traversal};
