//! Network loading, saving, validation and introspection.

use std::path::Path;

use lf_graph::Traversal;
use lf_project::schema::{NetworkDef, NetworkKind};

use crate::compile::{build_flow_map, build_graph, through_scale};
use crate::error::{AppError, AppResult};

/// Load and validate a description; the format follows the file extension.
pub fn load_network(path: &Path) -> AppResult<NetworkDef> {
    lf_project::load(path).map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a description as YAML or JSON, by extension.
pub fn save_network(path: &Path, def: &NetworkDef) -> AppResult<()> {
    lf_project::save(path, def)?;
    Ok(())
}

/// Check a description down to its topology without solving it.
pub fn validate_network(def: &NetworkDef) -> AppResult<()> {
    lf_project::validate_network(def)?;
    build_graph(def, through_scale(def.kind))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NodeSummary {
    pub name: String,
    /// Demand in description units
    pub demand: f64,
    pub reference: bool,
}

#[derive(Debug, Clone)]
pub struct ElementSummary {
    pub name: String,
    pub from: String,
    pub to: String,
    pub source: bool,
}

#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub name: String,
    /// Element names with the direction the walk takes through each
    pub steps: Vec<(String, Traversal)>,
}

/// Resolved topology of a description, for display.
#[derive(Debug, Clone)]
pub struct NetworkSummary {
    pub name: String,
    pub kind: NetworkKind,
    pub nodes: Vec<NodeSummary>,
    pub elements: Vec<ElementSummary>,
    pub loops: Vec<LoopSummary>,
    /// Equations the solver will assemble: loops plus node rows
    pub equations: usize,
    pub unknowns: usize,
}

pub fn summarize(def: &NetworkDef) -> AppResult<NetworkSummary> {
    lf_project::validate_network(def)?;
    let scale = through_scale(def.kind);
    let graph = build_graph(def, scale)?;
    let flow_map = build_flow_map(def, &graph)?;
    let reference = graph.reference_node();

    let node_name = |id: lf_core::NodeId| {
        graph
            .node(id)
            .map(|n| n.name.clone())
            .ok_or_else(|| AppError::Compile(format!("dangling node {id}")))
    };

    let nodes = graph
        .nodes()
        .iter()
        .map(|n| NodeSummary {
            name: n.name.clone(),
            demand: n.demand / scale,
            reference: n.id == reference,
        })
        .collect();

    let elements = graph
        .elements()
        .iter()
        .zip(&def.elements)
        .map(|(e, d)| -> AppResult<ElementSummary> {
            Ok(ElementSummary {
                name: e.name.clone(),
                from: node_name(e.ends.from)?,
                to: node_name(e.ends.to)?,
                source: d.kind.is_source(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let loops = graph
        .loops()
        .iter()
        .map(|lp| LoopSummary {
            name: lp.name.clone(),
            steps: lp
                .steps
                .iter()
                .map(|s| (graph.elements()[s.elem.idx()].name.clone(), s.traversal))
                .collect(),
        })
        .collect();

    Ok(NetworkSummary {
        name: def.name.clone(),
        kind: def.kind,
        nodes,
        elements,
        loops,
        equations: graph.loops().len() + lf_solver::node_rows(&graph, &flow_map).len(),
        unknowns: flow_map.unknowns(),
    })
}
