//! Core topology data structures.

use std::collections::HashMap;

use lf_core::{ElemId, LoopId, NodeId, Real};
use tracing::warn;

use crate::error::{GraphError, GraphResult};

/// Whether an element's identity depends on endpoint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Passive element (resistor, pipe): `a-b` and `b-a` name the same element.
    Undirected,
    /// Source element: the declared order carries the polarity.
    Directed,
}

/// Direction in which a walk crosses an element, relative to its declared endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Entering at `from`, leaving at `to`.
    Forward,
    /// Entering at `to`, leaving at `from`.
    Reverse,
}

impl Traversal {
    /// `+1.0` for forward, `-1.0` for reverse.
    pub fn sign(self) -> Real {
        match self {
            Traversal::Forward => 1.0,
            Traversal::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Traversal::Forward => Traversal::Reverse,
            Traversal::Reverse => Traversal::Forward,
        }
    }
}

/// Declared endpoints of a two-terminal element.
///
/// Positive through-quantity flows from `from` to `to`. For sources, the
/// potential rises from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoints {
    pub from: NodeId,
    pub to: NodeId,
}

impl Endpoints {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    /// Order-independent key: `(min, max)`.
    pub fn canonical(&self) -> (NodeId, NodeId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// The endpoint opposite to `node`, or `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.from {
            Some(self.to)
        } else if node == self.to {
            Some(self.from)
        } else {
            None
        }
    }

    /// Direction of a walk that enters the element at `node`.
    pub fn traversal_from(&self, node: NodeId) -> Option<Traversal> {
        if node == self.from {
            Some(Traversal::Forward)
        } else if node == self.to {
            Some(Traversal::Reverse)
        } else {
            None
        }
    }
}

/// A junction of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// External flow extracted at this node (negative for injection).
    pub demand: Real,
}

/// A two-terminal element (resistor, pipe, source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElemId,
    pub name: String,
    pub ends: Endpoints,
    pub polarity: Polarity,
}

impl Element {
    /// Identity key: ordered for sources, canonical for passive elements.
    pub fn identity(&self) -> (NodeId, NodeId) {
        match self.polarity {
            Polarity::Directed => (self.ends.from, self.ends.to),
            Polarity::Undirected => self.ends.canonical(),
        }
    }
}

/// One step of a loop walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub elem: ElemId,
    /// Node at which the walk enters the element.
    pub entry: NodeId,
    pub traversal: Traversal,
}

/// A closed walk through the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub id: LoopId,
    pub name: String,
    pub start: NodeId,
    pub steps: Vec<Step>,
}

impl Loop {
    pub fn members(&self) -> impl Iterator<Item = ElemId> + '_ {
        self.steps.iter().map(|s| s.elem)
    }
}

/// An element incident to a node, with the sign of its flow relative to the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incident {
    pub elem: ElemId,
    /// `+1.0` when positive element flow leaves the node, `-1.0` when it enters.
    pub leaving: Real,
}

/// The network topology: a validated, immutable collection of nodes, elements and loops.
///
/// Stores:
/// - All nodes, elements and loops in vectors (indexed by their IDs).
/// - Compact incidence: for each node, which elements touch it and with what sign.
/// - Name indexes for lookups by label.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
    pub(crate) loops: Vec<Loop>,
    pub(crate) reference: NodeId,

    /// node i's incident elements are in node_incidents[offsets[i]..offsets[i+1]].
    pub(crate) node_offsets: Vec<usize>,
    pub(crate) node_incidents: Vec<Incident>,

    pub(crate) node_names: HashMap<String, NodeId>,
    pub(crate) element_names: HashMap<String, ElemId>,
}

impl Graph {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all elements.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Return all loops, in declaration order.
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    pub fn element(&self, id: ElemId) -> Option<&Element> {
        self.elements.get(id.idx())
    }

    /// The node whose conservation row is left out of the system.
    pub fn reference_node(&self) -> NodeId {
        self.reference
    }

    /// Nodes contributing a conservation row: every node but the reference, in declaration order.
    pub fn independent_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        let reference = self.reference;
        self.nodes.iter().filter(move |n| n.id != reference)
    }

    /// Elements incident to a node.
    pub fn node_incidents(&self, node: NodeId) -> &[Incident] {
        let idx = node.idx();
        if idx >= self.nodes.len() {
            return &[];
        }
        &self.node_incidents[self.node_offsets[idx]..self.node_offsets[idx + 1]]
    }

    /// Look up a node by label.
    pub fn node_by_name(&self, name: &str) -> GraphResult<NodeId> {
        self.node_names.get(name).copied().ok_or_else(|| {
            warn!(node = name, "no node found with this name");
            GraphError::UnknownNode {
                name: name.to_string(),
            }
        })
    }

    /// Look up an element by name without logging.
    pub fn find_element(&self, name: &str) -> Option<ElemId> {
        self.element_names.get(name).copied()
    }

    /// Look up an element by name.
    ///
    /// A missing name is reported as `GraphError::UnknownElement` and logged,
    /// never as a zero-valued placeholder.
    pub fn element_by_name(&self, name: &str) -> GraphResult<ElemId> {
        self.find_element(name).ok_or_else(|| {
            warn!(element = name, "no element found with this name");
            GraphError::UnknownElement {
                name: name.to_string(),
            }
        })
    }

    /// Resolve a loop member token to an element.
    ///
    /// Tries the exact element name first, then reads the token as a node pair
    /// (`a-b`, or two single-character node names such as `ba`) and looks for
    /// an element joining those nodes in either order.
    pub fn resolve_element(&self, token: &str) -> GraphResult<ElemId> {
        if let Some(id) = self.find_element(token) {
            return Ok(id);
        }
        if let Some((a, b)) = split_pair(token) {
            let ends = (self.node_names.get(a), self.node_names.get(b));
            if let (Some(&a), Some(&b)) = ends {
                if let Some((id, _)) = self.element_between(a, b) {
                    return Ok(id);
                }
            }
        }
        self.element_by_name(token)
    }

    /// Find the element joining `a` and `b`, returning the direction of a walk from `a` to `b`.
    ///
    /// Passive elements match either endpoint order. Sources match either order too, the
    /// returned traversal tells whether the walk runs with or against the polarity.
    /// When several elements join the same pair the first declared one wins.
    pub fn element_between(&self, a: NodeId, b: NodeId) -> Option<(ElemId, Traversal)> {
        self.node_incidents(a).iter().find_map(|inc| {
            let elem = &self.elements[inc.elem.idx()];
            if elem.ends.other(a) == Some(b) {
                elem.ends.traversal_from(a).map(|t| (elem.id, t))
            } else {
                None
            }
        })
    }
}

/// Split `a-b` at the dash, or a two-character token into its characters.
fn split_pair(token: &str) -> Option<(&str, &str)> {
    if let Some((a, b)) = token.split_once('-') {
        return (!a.is_empty() && !b.is_empty()).then_some((a, b));
    }
    let mut chars = token.char_indices();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(_), Some((i, _)), None) => Some(token.split_at(i)),
        _ => None,
    }
}
