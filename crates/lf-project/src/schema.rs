//! Network description schema.
//!
//! Through-quantities follow the network kind: amperes for circuits, litres
//! per second for hydraulic networks (node demands, initial guesses). Pipe
//! diameters are given in millimetres, other lengths in metres.

use lf_core::Real;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub name: String,
    #[serde(default)]
    pub kind: NetworkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid: Option<FluidDef>,
    /// Demands and reference choice. Nodes are otherwise implied by element endpoints.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub loops: Vec<LoopDef>,
    /// Number of solver unknowns when fewer than the elements. Every element
    /// must then be tied through `unknowns`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_count: Option<usize>,
    /// Element flows expressed through other unknowns. Untied elements keep their own unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknowns: Vec<UnknownDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guess: Option<Vec<Real>>,
    /// Report labels for unknowns, e.g. `I1`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelDef>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// Resistors and voltage sources
    #[default]
    Circuit,
    /// Pipes and head sources
    Hydraulic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    pub mu_pa_s: Real,
    pub rho_kg_m3: Real,
}

impl Default for FluidDef {
    fn default() -> Self {
        Self {
            mu_pa_s: 0.00089,
            rho_kg_m3: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub name: String,
    /// External flow extracted at the node; negative for a supply.
    #[serde(default)]
    pub demand: Real,
    #[serde(default)]
    pub reference: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub from: String,
    pub to: String,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ElementKind {
    Resistor {
        ohms: Real,
    },
    Source {
        volts: Real,
    },
    Pipe {
        length_m: Real,
        diameter_mm: Real,
        roughness_m: Real,
    },
    Head {
        head_m: Real,
    },
}

impl ElementKind {
    pub fn is_source(&self) -> bool {
        matches!(self, ElementKind::Source { .. } | ElementKind::Head { .. })
    }

    pub fn network_kind(&self) -> NetworkKind {
        match self {
            ElementKind::Resistor { .. } | ElementKind::Source { .. } => NetworkKind::Circuit,
            ElementKind::Pipe { .. } | ElementKind::Head { .. } => NetworkKind::Hydraulic,
        }
    }
}

impl ElementDef {
    /// Declared name, or one derived from the endpoints.
    ///
    /// Pipes get `a-b` with the endpoints in sorted order so that both
    /// declarations of a segment share a name; head sources get `from-to`;
    /// circuit elements get the concatenated endpoint labels.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match self.kind {
            ElementKind::Pipe { .. } => {
                let (a, b) = if self.from <= self.to {
                    (&self.from, &self.to)
                } else {
                    (&self.to, &self.from)
                };
                format!("{a}-{b}")
            }
            ElementKind::Head { .. } => format!("{}-{}", self.from, self.to),
            ElementKind::Resistor { .. } | ElementKind::Source { .. } => {
                format!("{}{}", self.from, self.to)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopDef {
    pub name: String,
    /// Element names, or node pairs such as `a-b`, in walk order.
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnknownDef {
    pub element: String,
    pub terms: Vec<TermDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TermDef {
    pub index: usize,
    pub coef: Real,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelDef {
    pub index: usize,
    pub text: String,
}

impl NetworkDef {
    /// Node names in order of first appearance: element endpoints, then node entries.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let endpoints = self
            .elements
            .iter()
            .flat_map(|e| [e.from.as_str(), e.to.as_str()]);
        let declared = self.nodes.iter().map(|n| n.name.as_str());
        for name in endpoints.chain(declared) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Solver unknowns: the declared count, or one per element.
    pub fn num_unknowns(&self) -> usize {
        self.unknown_count.unwrap_or(self.elements.len())
    }

    pub fn fluid_or_default(&self) -> FluidDef {
        self.fluid.unwrap_or_default()
    }

    /// Report label of unknown `index`: an explicit label, or `I1`, `I2`, ...
    pub fn unknown_label(&self, index: usize) -> String {
        self.labels
            .iter()
            .find(|l| l.index == index)
            .map(|l| l.text.clone())
            .unwrap_or_else(|| format!("I{}", index + 1))
    }
}
