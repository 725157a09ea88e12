//! Loop and node residual assembly.
//!
//! For a vector of unknowns `x`:
//! - element flows are `flow_map * x`
//! - each loop residual is the potential gained around the closed walk,
//!   `sum(gain(flow_e, traversal_e))`, zero when the loop law holds
//! - each node residual is the net flow leaving the node plus its external
//!   demand, zero when the node law holds
//!
//! Residuals are ordered loops first, then node rows, both in declaration
//! order. Node rows are the independent nodes whose balance the flow map
//! does not already enforce.

use crate::error::{SolverError, SolverResult};
use crate::problem::NetworkProblem;
use lf_core::Real;
use lf_graph::{Graph, Loop, Node};
use nalgebra::DVector;
use tracing::warn;

/// Net potential gained around a loop for the given element flows.
pub fn loop_residual(problem: &NetworkProblem, lp: &Loop, flows: &[Real]) -> SolverResult<Real> {
    let mut total = 0.0;
    for step in &lp.steps {
        let flow = flows
            .get(step.elem.idx())
            .copied()
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("no flow for element {} in loop {}", step.elem, lp.name),
            })?;
        total += problem
            .branch(step.elem)?
            .potential_gain(flow, step.traversal)?;
    }
    Ok(total)
}

/// Net flow leaving a node, including its external demand.
pub fn node_residual(graph: &Graph, node: &Node, flows: &[Real]) -> Real {
    graph
        .node_incidents(node.id)
        .iter()
        .map(|inc| inc.leaving * flows.get(inc.elem.idx()).copied().unwrap_or(0.0))
        .sum::<Real>()
        + node.demand
}

/// Compute the full residual vector for the unknowns `x`.
pub fn compute_residuals(problem: &NetworkProblem, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
    let flows = problem.flow_map().apply(x)?;
    let graph = problem.graph;

    let mut r = Vec::with_capacity(problem.num_equations());
    for lp in graph.loops() {
        r.push(loop_residual(problem, lp, &flows)?);
    }
    for node in problem.node_rows() {
        r.push(node_residual(graph, node, &flows));
    }

    if let Some(i) = r.iter().position(|v| !v.is_finite()) {
        warn!(row = i, "non-finite residual");
        return Err(SolverError::Numeric {
            what: format!("residual {i} is not finite"),
        });
    }

    Ok(DVector::from_vec(r))
}

impl NetworkProblem<'_> {
    /// Residual vector for the unknowns `x`. Does not modify stored flows.
    pub fn residuals(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        compute_residuals(self, x)
    }
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
        let r2 = b.add_element("ac", a, c, Polarity::Undirected);
        b.add_loop("L1", &[src, r1, r2]);
        b.build().unwrap()
    }

    fn problem(graph: &Graph) -> NetworkProblem<'_> {
        let mut p = NetworkProblem::new(graph);
        let ids: Vec<_> = graph.elements().iter().map(|e| e.id).collect();
        p.add_branch(ids[0], Box::new(VoltageSource::new("ab", 10.0)))
            .unwrap();
        p.add_branch(ids[1], Box::new(Resistor::new("bc", 2.0)))
            .unwrap();
        p.add_branch(ids[2], Box::new(Resistor::new("ac", 3.0)))
            .unwrap();
        p
    }

    #[test]
    fn loop_residual_uses_traversal() {
        let graph = series();
        let p = problem(&graph);
        // ac is walked c -> a, against its declared direction, so its flow is -2
        let flows = [2.0, 2.0, -2.0];
        let r = loop_residual(&p, &graph.loops()[0], &flows).unwrap();
        assert!(r.abs() < 1e-12);
    }

    #[test]
    fn node_residual_counts_leaving_flow() {
        let graph = series();
        let b = graph.node_by_name("b").unwrap();
        let node = graph.node(b).unwrap();
        // 3 in through ab, 1 out through bc
        assert_eq!(node_residual(&graph, node, &[3.0, 1.0, 0.0]), -2.0);
    }

    #[test]
    fn residual_order_is_loops_then_nodes() {
        let graph = series();
        let p = problem(&graph);
        let r = p.residuals(&DVector::from_vec(vec![1.0, 1.0, 1.0])).unwrap();
        assert_eq!(r.len(), 3);
        // source +10, bc drops 2, ac walked in reverse with flow 1 gains 3
        assert!((r[0] - (10.0 - 2.0 + 3.0)).abs() < 1e-12);
        // node b: leaving bc (+1), entering ab (-1)
        assert_eq!(r[1], 0.0);
        // node c: entering bc (-1), entering ac (-1)
        assert_eq!(r[2], -2.0);
    }

    #[test]
    fn evaluation_leaves_stored_flows_alone() {
        let graph = series();
        let p = problem(&graph);
        p.residuals(&DVector::from_vec(vec![5.0, 5.0, 5.0])).unwrap();
        assert_eq!(p.flows(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn wrong_length_rejected() {
        let graph = series();
        let p = problem(&graph);
        assert!(p.residuals(&DVector::from_vec(vec![1.0])).is_err());
    }
}
