//! Incremental network builder.

use std::collections::HashMap;

use lf_core::{ElemId, LoopId, NodeId, Real};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Element, Endpoints, Graph, Incident, Loop, Node, Polarity};
use crate::validate;

/// Loop member as declared: an element id, or a token resolved at `build()`.
#[derive(Debug, Clone)]
enum Member {
    Id(ElemId),
    Token(String),
}

/// Loop declaration waiting for validation.
#[derive(Debug, Clone)]
struct PendingLoop {
    name: String,
    members: Vec<Member>,
}

/// Builder for constructing a network topology incrementally.
///
/// Use `add_node`, `add_element` and `add_loop` to describe the network,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    loops: Vec<PendingLoop>,
    reference: Option<NodeId>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the network and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.into(),
            demand: 0.0,
        });
        id
    }

    /// Return the node with this name, adding it first if it is new.
    pub fn node(&mut self, name: &str) -> NodeId {
        match self.nodes.iter().find(|n| n.name == name) {
            Some(node) => node.id,
            None => self.add_node(name),
        }
    }

    /// Set the external flow extracted at a node (negative injects).
    pub fn set_demand(&mut self, node: NodeId, demand: Real) {
        if let Some(n) = self.nodes.get_mut(node.idx()) {
            n.demand = demand;
        }
    }

    /// Choose the node whose conservation row is dropped. Defaults to the first node.
    pub fn set_reference(&mut self, node: NodeId) {
        self.reference = Some(node);
    }

    /// Add a two-terminal element. Positive flow runs `from -> to`.
    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        from: NodeId,
        to: NodeId,
        polarity: Polarity,
    ) -> ElemId {
        let id = ElemId::from_usize(self.elements.len());
        self.elements.push(Element {
            id,
            name: name.into(),
            ends: Endpoints::new(from, to),
            polarity,
        });
        id
    }

    /// Declare a loop as an ordered list of member elements.
    ///
    /// Traversal directions are inferred at `build()` from shared endpoints.
    pub fn add_loop(&mut self, name: impl Into<String>, members: &[ElemId]) -> LoopId {
        self.push_loop(name.into(), members.iter().copied().map(Member::Id).collect())
    }

    /// Declare a loop by member names.
    ///
    /// Each token is resolved at `build()` with `Graph::resolve_element`: an
    /// element name, or a node pair naming the element between two nodes.
    pub fn add_loop_named<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        members: &[S],
    ) -> LoopId {
        let members = members
            .iter()
            .map(|m| Member::Token(m.as_ref().to_string()))
            .collect();
        self.push_loop(name.into(), members)
    }

    fn push_loop(&mut self, name: String, members: Vec<Member>) -> LoopId {
        let id = LoopId::from_usize(self.loops.len());
        self.loops.push(PendingLoop { name, members });
        id
    }

    /// Build and validate the topology, returning an immutable `Graph`.
    ///
    /// Rejects open loops, disconnected nodes, dangling references,
    /// duplicate names and unbalanced demands.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_nodes(&self.nodes)?;
        validate::validate_elements(&self.nodes, &self.elements)?;
        validate::validate_connected(&self.nodes, &self.elements)?;

        let reference = self.reference.unwrap_or(self.nodes[0].id);
        if reference.idx() >= self.nodes.len() {
            return Err(GraphError::UnknownNode {
                name: reference.to_string(),
            });
        }

        let (node_offsets, node_incidents) = Self::build_incidence(&self.nodes, &self.elements);

        let node_names = self
            .nodes
            .iter()
            .map(|n| (n.name.clone(), n.id))
            .collect();
        let element_names = self
            .elements
            .iter()
            .map(|e| (e.name.clone(), e.id))
            .collect();

        let mut graph = Graph {
            nodes: self.nodes,
            elements: self.elements,
            loops: Vec::with_capacity(self.loops.len()),
            reference,
            node_offsets,
            node_incidents,
            node_names,
            element_names,
        };

        let mut loop_names = HashMap::new();
        for (i, pending) in self.loops.iter().enumerate() {
            if loop_names.insert(pending.name.clone(), i).is_some() {
                return Err(GraphError::DuplicateName {
                    what: "loop",
                    name: pending.name.clone(),
                });
            }
            let members = pending
                .members
                .iter()
                .map(|m| match m {
                    Member::Id(id) => Ok(*id),
                    Member::Token(token) => graph.resolve_element(token),
                })
                .collect::<GraphResult<Vec<_>>>()?;
            let (start, steps) = validate::trace_loop(&pending.name, &members, &graph.elements)?;
            graph.loops.push(Loop {
                id: LoopId::from_usize(i),
                name: pending.name.clone(),
                start,
                steps,
            });
        }

        Ok(graph)
    }

    /// Build compact incidence lists: for each node, its elements and flow signs.
    fn build_incidence(nodes: &[Node], elements: &[Element]) -> (Vec<usize>, Vec<Incident>) {
        let mut per_node: Vec<Vec<Incident>> = vec![Vec::new(); nodes.len()];
        for elem in elements {
            per_node[elem.ends.from.idx()].push(Incident {
                elem: elem.id,
                leaving: 1.0,
            });
            per_node[elem.ends.to.idx()].push(Incident {
                elem: elem.id,
                leaving: -1.0,
            });
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(2 * elements.len());
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}
