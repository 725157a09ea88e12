//! Compilation of a `NetworkDef` into solver inputs.

use std::sync::Arc;

use lf_components::{Branch, Fluid, HeadSource, NoiseSource, Pipe, Resistor, VoltageSource};
use lf_core::Real;
use lf_core::units::{kg_per_m3, lps, m, mm, pa_s};
use lf_graph::{Graph, GraphBuilder, Polarity};
use lf_project::schema::{ElementDef, ElementKind, NetworkDef, NetworkKind};
use lf_project::validate_network;
use lf_solver::{DEFAULT_GUESS, FlowMap};
use tracing::debug;

use crate::error::AppResult;

/// Starting flow in every pipe when a hydraulic description gives no guess.
pub const DEFAULT_HYDRAULIC_GUESS_LPS: Real = 10.0;

/// Solver-ready network: topology, one branch model per element and the flow map.
///
/// Through-quantities are in SI: amperes, or cubic metres per second.
pub struct CompiledNetwork {
    pub name: String,
    pub kind: NetworkKind,
    pub graph: Graph,
    /// Branch models, indexed like `graph.elements()`
    pub branches: Vec<Box<dyn Branch>>,
    pub flow_map: FlowMap,
    /// Initial unknowns in SI
    pub guess: Vec<Real>,
    pub unknown_labels: Vec<String>,
    pub element_labels: Vec<String>,
    /// `-1.0` where the report reads an element against its declared direction
    pub report_signs: Vec<Real>,
}

/// Factor from description units to SI for through-quantities.
pub fn through_scale(kind: NetworkKind) -> Real {
    match kind {
        NetworkKind::Circuit => 1.0,
        NetworkKind::Hydraulic => lps(1.0).value,
    }
}

/// Validate a description and build everything `solve` needs.
///
/// `noise` perturbs transitional pipe friction; pass `MeanOnly` for
/// reproducible results.
pub fn compile(def: &NetworkDef, noise: Arc<dyn NoiseSource>) -> AppResult<CompiledNetwork> {
    validate_network(def)?;
    let scale = through_scale(def.kind);

    let graph = build_graph(def, scale)?;
    let branches = build_branches(def, &noise);

    let flow_map = build_flow_map(def, &graph)?;

    let n = flow_map.unknowns();
    let guess = match (&def.guess, def.kind) {
        (Some(values), _) => values.iter().map(|v| v * scale).collect(),
        (None, NetworkKind::Hydraulic) => vec![DEFAULT_HYDRAULIC_GUESS_LPS * scale; n],
        (None, NetworkKind::Circuit) => vec![DEFAULT_GUESS; n],
    };

    debug!(
        network = %def.name,
        nodes = graph.nodes().len(),
        elements = graph.elements().len(),
        loops = graph.loops().len(),
        "compiled network"
    );

    Ok(CompiledNetwork {
        name: def.name.clone(),
        kind: def.kind,
        unknown_labels: (0..n).map(|i| def.unknown_label(i)).collect(),
        element_labels: def.elements.iter().map(ElementDef::label).collect(),
        report_signs: def.elements.iter().map(report_sign).collect(),
        graph,
        branches,
        flow_map,
        guess,
    })
}

/// Build the topology. Nodes are numbered by first appearance.
pub fn build_graph(def: &NetworkDef, scale: Real) -> AppResult<Graph> {
    let mut builder = GraphBuilder::new();
    for name in def.node_names() {
        builder.add_node(name);
    }
    for node in &def.nodes {
        let id = builder.node(&node.name);
        builder.set_demand(id, node.demand * scale);
        if node.reference {
            builder.set_reference(id);
        }
    }

    for elem in &def.elements {
        let from = builder.node(&elem.from);
        let to = builder.node(&elem.to);
        let polarity = if elem.kind.is_source() {
            Polarity::Directed
        } else {
            Polarity::Undirected
        };
        builder.add_element(elem.label(), from, to, polarity);
    }

    for lp in &def.loops {
        builder.add_loop_named(lp.name.clone(), &lp.elements);
    }

    Ok(builder.build()?)
}

/// One unknown per element unless the description declares fewer, then the ties.
pub fn build_flow_map(def: &NetworkDef, graph: &Graph) -> AppResult<FlowMap> {
    let mut flow_map = match def.unknown_count {
        Some(count) => FlowMap::new(def.elements.len(), count),
        None => FlowMap::identity(def.elements.len()),
    };
    for unknown in &def.unknowns {
        let elem = graph.element_by_name(&unknown.element)?;
        let terms: Vec<(usize, Real)> = unknown.terms.iter().map(|t| (t.index, t.coef)).collect();
        flow_map.tie(elem, &terms)?;
    }
    Ok(flow_map)
}

fn build_branches(def: &NetworkDef, noise: &Arc<dyn NoiseSource>) -> Vec<Box<dyn Branch>> {
    let fluid = def.fluid_or_default();
    let fluid = Fluid::new(pa_s(fluid.mu_pa_s), kg_per_m3(fluid.rho_kg_m3));

    def.elements
        .iter()
        .map(|elem| -> Box<dyn Branch> {
            let name = elem.label();
            match elem.kind {
                ElementKind::Resistor { ohms } => Box::new(Resistor::new(name, ohms)),
                ElementKind::Source { volts } => Box::new(VoltageSource::new(name, volts)),
                ElementKind::Head { head_m } => Box::new(HeadSource::new(name, m(head_m))),
                ElementKind::Pipe {
                    length_m,
                    diameter_mm,
                    roughness_m,
                } => Box::new(
                    Pipe::new(name, m(length_m), mm(diameter_mm), m(roughness_m), fluid)
                        .with_noise(Arc::clone(noise)),
                ),
            }
        })
        .collect()
}

/// Pipes with a derived `a-b` name report flow from the lower-named node.
fn report_sign(elem: &ElementDef) -> Real {
    match (&elem.name, &elem.kind) {
        (None, ElementKind::Pipe { .. }) if elem.from > elem.to => -1.0,
        _ => 1.0,
    }
}
