//! Topology validation logic.

use std::collections::{HashSet, VecDeque};

use lf_core::{ElemId, NodeId, Tolerances, nearly_equal};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Element, Node, Step};

/// Relative slack allowed when checking that demands balance.
const DEMAND_BALANCE_REL: f64 = 1e-9;

/// Validate nodes: at least one, unique names, balanced demands.
pub(crate) fn validate_nodes(nodes: &[Node]) -> GraphResult<()> {
    if nodes.is_empty() {
        return Err(GraphError::Empty);
    }

    let mut names = HashSet::new();
    for node in nodes {
        if !names.insert(node.name.as_str()) {
            return Err(GraphError::DuplicateName {
                what: "node",
                name: node.name.clone(),
            });
        }
    }

    let drawn: f64 = nodes.iter().map(|n| n.demand.max(0.0)).sum();
    let supplied: f64 = nodes.iter().map(|n| (-n.demand).max(0.0)).sum();
    let tol = Tolerances {
        abs: 1e-12,
        rel: DEMAND_BALANCE_REL,
    };
    if !nearly_equal(drawn, supplied, tol) {
        return Err(GraphError::UnbalancedDemand {
            total: drawn - supplied,
        });
    }

    Ok(())
}

/// Validate elements: endpoints exist and differ, names are unique.
pub(crate) fn validate_elements(nodes: &[Node], elements: &[Element]) -> GraphResult<()> {
    let mut names = HashSet::new();
    for elem in elements {
        for node in [elem.ends.from, elem.ends.to] {
            if node.idx() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    elem: elem.name.clone(),
                    node,
                });
            }
        }

        if elem.ends.from == elem.ends.to {
            return Err(GraphError::SelfLoop {
                elem: elem.name.clone(),
            });
        }

        if !names.insert(elem.name.as_str()) {
            return Err(GraphError::DuplicateName {
                what: "element",
                name: elem.name.clone(),
            });
        }
    }
    Ok(())
}

/// Every node must be reachable from the first one through elements.
pub(crate) fn validate_connected(nodes: &[Node], elements: &[Element]) -> GraphResult<()> {
    let mut neighbours: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
    for elem in elements {
        neighbours[elem.ends.from.idx()].push(elem.ends.to);
        neighbours[elem.ends.to.idx()].push(elem.ends.from);
    }

    let mut seen = vec![false; nodes.len()];
    let mut queue = VecDeque::new();
    seen[0] = true;
    queue.push_back(nodes[0].id);

    while let Some(node) = queue.pop_front() {
        for &next in &neighbours[node.idx()] {
            if !seen[next.idx()] {
                seen[next.idx()] = true;
                queue.push_back(next);
            }
        }
    }

    match nodes.iter().find(|n| !seen[n.id.idx()]) {
        Some(node) => Err(GraphError::Disconnected {
            node: node.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Walk a loop's members and record the traversal direction of each step.
///
/// The walk starts at an endpoint of the first member shared with the last
/// member, trying the declared `from` before `to`. Each following member must
/// contain the node where the previous step left off, and the walk must end
/// where it started.
pub(crate) fn trace_loop(
    loop_name: &str,
    members: &[ElemId],
    elements: &[Element],
) -> GraphResult<(NodeId, Vec<Step>)> {
    let (first, last) = match (members.first(), members.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(GraphError::EmptyLoop {
                loop_name: loop_name.to_string(),
            });
        }
    };

    for &elem in members {
        if elem.idx() >= elements.len() {
            return Err(GraphError::InvalidElemRef {
                loop_name: loop_name.to_string(),
                elem,
            });
        }
    }

    let open = |step: usize| GraphError::OpenLoop {
        loop_name: loop_name.to_string(),
        step,
    };

    if members.len() < 2 {
        return Err(open(0));
    }

    let first_ends = elements[first.idx()].ends;
    let last_ends = elements[last.idx()].ends;
    let mut failed_at = None;
    for start in [first_ends.from, first_ends.to] {
        if !last_ends.contains(start) {
            continue;
        }
        match walk_from(start, members, elements) {
            Ok(steps) => return Ok((start, steps)),
            Err(step) => {
                failed_at.get_or_insert(step);
            }
        }
    }

    Err(open(failed_at.unwrap_or(0)))
}

/// Steps of the walk from `start`, or the index of the step that breaks it.
fn walk_from(start: NodeId, members: &[ElemId], elements: &[Element]) -> Result<Vec<Step>, usize> {
    let mut at = start;
    let mut steps = Vec::with_capacity(members.len());
    for (i, &elem) in members.iter().enumerate() {
        let ends = elements[elem.idx()].ends;
        let (traversal, next) = match (ends.traversal_from(at), ends.other(at)) {
            (Some(t), Some(next)) => (t, next),
            _ => return Err(i),
        };
        steps.push(Step {
            elem,
            entry: at,
            traversal,
        });
        at = next;
    }

    if at != start {
        return Err(members.len());
    }
    Ok(steps)
}
