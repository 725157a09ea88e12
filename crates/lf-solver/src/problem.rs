//! Problem definition for loop/node network solving.

use crate::error::{SolverError, SolverResult};
use crate::flow_map::FlowMap;
use lf_components::Branch;
use lf_core::{ElemId, NodeId, Real};
use lf_graph::{Graph, Node};
use std::collections::HashMap;

/// Coefficients below this are treated as cancelled when deciding whether
/// the flow map already satisfies a node law.
const ROW_EPSILON: Real = 1e-12;

/// Network problem definition.
///
/// Pairs a validated topology with one branch model per element and the map
/// from solver unknowns to element flows. The system has one equation per
/// loop plus one per node row (see [`node_rows`]), and must be square.
pub struct NetworkProblem<'a> {
    /// Network topology
    pub graph: &'a Graph,

    /// Branch models indexed by element
    branches: HashMap<ElemId, Box<dyn Branch>>,

    /// Unknowns to element flows
    flow_map: FlowMap,

    /// Nodes whose balance enters the residual
    node_rows: Vec<NodeId>,

    /// Element flows from the last solve
    flows: Vec<Real>,
}

impl<'a> NetworkProblem<'a> {
    /// Create an empty problem with one unknown per element.
    pub fn new(graph: &'a Graph) -> Self {
        let n = graph.elements().len();
        let flow_map = FlowMap::identity(n);
        Self {
            graph,
            branches: HashMap::new(),
            node_rows: node_rows(graph, &flow_map),
            flow_map,
            flows: vec![0.0; n],
        }
    }

    /// Attach the branch model of an element.
    pub fn add_branch(&mut self, elem: ElemId, branch: Box<dyn Branch>) -> SolverResult<()> {
        if self.graph.element(elem).is_none() {
            return Err(SolverError::ProblemSetup {
                what: format!("Element {elem} is not part of the network"),
            });
        }
        if self.branches.contains_key(&elem) {
            return Err(SolverError::ProblemSetup {
                what: format!("Element {elem} already has a branch model"),
            });
        }
        self.branches.insert(elem, branch);
        Ok(())
    }

    /// Replace the default one-unknown-per-element map.
    pub fn set_flow_map(&mut self, map: FlowMap) -> SolverResult<()> {
        if map.elements() != self.graph.elements().len() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "flow map covers {} elements, network has {}",
                    map.elements(),
                    self.graph.elements().len()
                ),
            });
        }
        self.node_rows = node_rows(self.graph, &map);
        self.flow_map = map;
        Ok(())
    }

    pub fn flow_map(&self) -> &FlowMap {
        &self.flow_map
    }

    pub fn num_unknowns(&self) -> usize {
        self.flow_map.unknowns()
    }

    /// Loop equations followed by node equations.
    pub fn num_equations(&self) -> usize {
        self.graph.loops().len() + self.node_rows.len()
    }

    /// Nodes contributing a balance equation, in declaration order.
    pub fn node_rows(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_rows
            .iter()
            .filter_map(|&id| self.graph.node(id))
    }

    pub fn branch(&self, elem: ElemId) -> SolverResult<&dyn Branch> {
        self.branches
            .get(&elem)
            .map(|b| b.as_ref())
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("Element {elem} has no branch model"),
            })
    }

    /// Element flows written back by the last successful solve (zero before).
    pub fn flows(&self) -> &[Real] {
        &self.flows
    }

    pub fn flow(&self, elem: ElemId) -> Option<Real> {
        self.flows.get(elem.idx()).copied()
    }

    /// Solved flow of a named element.
    ///
    /// An unknown name is an error, never a zero flow.
    pub fn flow_by_name(&self, name: &str) -> SolverResult<Real> {
        let elem = self.graph.element_by_name(name)?;
        self.flow(elem).ok_or_else(|| SolverError::ProblemSetup {
            what: format!("no flow stored for element {name}"),
        })
    }

    pub(crate) fn store_flows(&mut self, flows: Vec<Real>) {
        self.flows = flows;
    }

    /// Validate problem setup.
    pub fn validate(&self) -> SolverResult<()> {
        for elem in self.graph.elements() {
            let branch = self.branch(elem.id)?;
            if branch.polarity() != elem.polarity {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "Element {} is declared {:?} but its model is {:?}",
                        elem.name,
                        elem.polarity,
                        branch.polarity()
                    ),
                });
            }
        }

        if self.flow_map.elements() != self.graph.elements().len() {
            return Err(SolverError::ProblemSetup {
                what: "flow map does not match the element count".to_string(),
            });
        }
        self.flow_map.validate()?;

        for node in self.graph.nodes() {
            if node.demand != 0.0 && node_coefficients(self.graph, &self.flow_map, node.id).is_none()
            {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "node {} has demand {} but the flow map balances it identically",
                        node.name, node.demand
                    ),
                });
            }
        }

        let (rows, cols) = (self.num_equations(), self.num_unknowns());
        if rows != cols {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "{} loops and {} node rows give {rows} equations for {cols} unknowns",
                    self.graph.loops().len(),
                    self.node_rows.len(),
                ),
            });
        }

        Ok(())
    }
}

/// Coefficients of the unknowns in the balance of `node`, or `None` when
/// they all cancel and the flow map satisfies the node law by construction.
fn node_coefficients(graph: &Graph, map: &FlowMap, node: NodeId) -> Option<Vec<Real>> {
    let mut coefs = vec![0.0; map.unknowns()];
    for inc in graph.node_incidents(node) {
        for &(index, coef) in map.row(inc.elem) {
            if let Some(c) = coefs.get_mut(index) {
                *c += inc.leaving * coef;
            }
        }
    }
    let depends = coefs.iter().any(|c| c.abs() > ROW_EPSILON);
    depends.then_some(coefs)
}

/// Nodes whose balance still depends on the unknowns, minus one redundant row.
///
/// The balances of all nodes sum to zero, so one of the remaining rows is
/// implied by the others: the reference node's if it remains, otherwise the
/// last. With one unknown per element this is every node but the reference.
pub fn node_rows(graph: &Graph, map: &FlowMap) -> Vec<NodeId> {
    let mut rows: Vec<NodeId> = graph
        .nodes()
        .iter()
        .filter(|n| node_coefficients(graph, map, n.id).is_some())
        .map(|n| n.id)
        .collect();
    match rows.iter().position(|&id| id == graph.reference_node()) {
        Some(i) => {
            rows.remove(i);
        }
        None => {
            rows.pop();
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_components::{Resistor, VoltageSource};
    use lf_graph::{GraphBuilder, Polarity};

    fn series() -> Graph {
        let mut b = GraphBuilder::new();
        let a = b.add_node("a");
        let n_b = b.add_node("b");
        let c = b.add_node("c");
        let src = b.add_element("ab", a, n_b, Polarity::Directed);
        let r1 = b.add_element("bc", n_b, c, Polarity::Undirected);
        let r2 = b.add_element("ca", c, a, Polarity::Undirected);
        b.add_loop("L1", &[src, r1, r2]);
        b.build().unwrap()
    }

    fn populate(problem: &mut NetworkProblem) {
        let ids: Vec<ElemId> = problem.graph.elements().iter().map(|e| e.id).collect();
        problem
            .add_branch(ids[0], Box::new(VoltageSource::new("ab", 10.0)))
            .unwrap();
        problem
            .add_branch(ids[1], Box::new(Resistor::new("bc", 2.0)))
            .unwrap();
        problem
            .add_branch(ids[2], Box::new(Resistor::new("ca", 3.0)))
            .unwrap();
    }

    #[test]
    fn square_series_problem_validates() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        populate(&mut problem);
        assert_eq!(problem.num_equations(), 3);
        assert_eq!(problem.num_unknowns(), 3);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn missing_branch_rejected() {
        let graph = series();
        let problem = NetworkProblem::new(&graph);
        assert!(matches!(
            problem.validate(),
            Err(SolverError::ProblemSetup { .. })
        ));
    }

    #[test]
    fn duplicate_branch_rejected() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        populate(&mut problem);
        let first = graph.elements()[0].id;
        assert!(
            problem
                .add_branch(first, Box::new(Resistor::new("again", 1.0)))
                .is_err()
        );
    }

    #[test]
    fn polarity_mismatch_rejected() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        let ids: Vec<ElemId> = graph.elements().iter().map(|e| e.id).collect();
        // a resistor where the topology declares a source
        problem
            .add_branch(ids[0], Box::new(Resistor::new("ab", 1.0)))
            .unwrap();
        problem
            .add_branch(ids[1], Box::new(Resistor::new("bc", 2.0)))
            .unwrap();
        problem
            .add_branch(ids[2], Box::new(Resistor::new("ca", 3.0)))
            .unwrap();
        assert!(problem.validate().is_err());
    }

    #[test]
    fn non_square_system_rejected() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        populate(&mut problem);

        // four unknowns for three equations
        let mut map = FlowMap::new(3, 4);
        map.tie(graph.elements()[0].id, &[(0, 1.0)]).unwrap();
        map.tie(graph.elements()[1].id, &[(1, 1.0), (3, 1.0)])
            .unwrap();
        map.tie(graph.elements()[2].id, &[(2, 1.0)]).unwrap();
        problem.set_flow_map(map).unwrap();

        let err = problem.validate().unwrap_err();
        assert!(err.to_string().contains("3 equations for 4 unknowns"));
    }

    #[test]
    fn series_loop_current_drops_node_rows() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        populate(&mut problem);

        let mut map = FlowMap::new(3, 1);
        for elem in graph.elements() {
            map.tie(elem.id, &[(0, 1.0)]).unwrap();
        }
        problem.set_flow_map(map).unwrap();

        assert_eq!(problem.node_rows().count(), 0);
        assert_eq!(problem.num_equations(), 1);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn identity_map_keeps_independent_nodes() {
        let graph = series();
        let rows = node_rows(&graph, &FlowMap::identity(3));
        let independent: Vec<NodeId> = graph.independent_nodes().map(|n| n.id).collect();
        assert_eq!(rows, independent);
    }

    #[test]
    fn demand_on_balanced_node_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node("a");
        let n_b = b.add_node("b");
        let src = b.add_element("ab", a, n_b, Polarity::Directed);
        let r = b.add_element("ba", n_b, a, Polarity::Undirected);
        b.set_demand(a, -1.0);
        b.set_demand(n_b, 1.0);
        b.add_loop("L", &[src, r]);
        let graph = b.build().unwrap();

        let mut problem = NetworkProblem::new(&graph);
        problem
            .add_branch(src, Box::new(VoltageSource::new("ab", 1.0)))
            .unwrap();
        problem
            .add_branch(r, Box::new(Resistor::new("ba", 1.0)))
            .unwrap();
        let mut map = FlowMap::new(2, 1);
        map.tie(src, &[(0, 1.0)]).unwrap();
        map.tie(r, &[(0, 1.0)]).unwrap();
        problem.set_flow_map(map).unwrap();

        let err = problem.validate().unwrap_err();
        assert!(err.to_string().contains("demand"));
    }

    #[test]
    fn flow_map_size_checked() {
        let graph = series();
        let mut problem = NetworkProblem::new(&graph);
        assert!(problem.set_flow_map(FlowMap::identity(2)).is_err());
    }

    #[test]
    fn unknown_flow_name_is_an_error() {
        let graph = series();
        let problem = NetworkProblem::new(&graph);
        assert!(matches!(
            problem.flow_by_name("zz"),
            Err(SolverError::Graph(lf_graph::GraphError::UnknownElement { .. }))
        ));
        assert_eq!(problem.flow_by_name("bc").unwrap(), 0.0);
    }
}
