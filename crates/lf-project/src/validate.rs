//! Network description validation.
//!
//! Checks what can be checked on the description alone: names, parameter
//! ranges, kind consistency and index bounds. Loop closure and connectivity
//! are checked when the topology is built.

use crate::schema::{ElementKind, NetworkDef, NetworkKind};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported element: {element} - {reason}")]
    Unsupported { element: String, reason: String },
}

fn invalid(field: String, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_finite(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn check_positive(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn check_non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must not be negative"))
    }
}

pub fn validate_network(def: &NetworkDef) -> Result<(), ValidationError> {
    if def.elements.is_empty() {
        return Err(ValidationError::MissingReference {
            id: "elements".to_string(),
            context: format!("network {}", def.name),
        });
    }

    if let Some(fluid) = &def.fluid {
        check_positive("fluid.mu_pa_s".to_string(), fluid.mu_pa_s)?;
        check_positive("fluid.rho_kg_m3".to_string(), fluid.rho_kg_m3)?;
    }

    let mut element_names = HashSet::new();
    for elem in &def.elements {
        let label = elem.label();
        if !element_names.insert(label.clone()) {
            return Err(ValidationError::DuplicateName {
                name: label,
                context: "elements".to_string(),
            });
        }
        validate_element(def.kind, &label, &elem.from, &elem.to, &elem.kind)?;
    }

    let mut declared = HashSet::new();
    let mut references = 0;
    for node in &def.nodes {
        if !declared.insert(node.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: node.name.clone(),
                context: "nodes".to_string(),
            });
        }
        check_finite(format!("{}.demand", node.name), node.demand)?;
        if node.reference {
            references += 1;
        }
    }
    if references > 1 {
        return Err(ValidationError::InvalidValue {
            field: "nodes.reference".to_string(),
            value: references.to_string(),
            reason: "at most one reference node".to_string(),
        });
    }

    let mut loop_names = HashSet::new();
    for lp in &def.loops {
        if !loop_names.insert(lp.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: lp.name.clone(),
                context: "loops".to_string(),
            });
        }
        if lp.elements.is_empty() {
            return Err(ValidationError::MissingReference {
                id: "elements".to_string(),
                context: format!("loop {}", lp.name),
            });
        }
    }

    let n = def.num_unknowns();
    if let Some(count) = def.unknown_count {
        if count == 0 || count > def.elements.len() {
            return Err(ValidationError::InvalidValue {
                field: "unknown_count".to_string(),
                value: count.to_string(),
                reason: format!("must be between 1 and {} elements", def.elements.len()),
            });
        }
    }
    let mut tied = HashSet::new();
    for unknown in &def.unknowns {
        if !element_names.contains(&unknown.element) {
            return Err(ValidationError::MissingReference {
                id: unknown.element.clone(),
                context: "unknowns".to_string(),
            });
        }
        if !tied.insert(unknown.element.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: unknown.element.clone(),
                context: "unknowns".to_string(),
            });
        }
        for term in &unknown.terms {
            if term.index >= n {
                return Err(ValidationError::InvalidValue {
                    field: format!("unknowns.{}.index", unknown.element),
                    value: term.index.to_string(),
                    reason: format!("only {n} unknowns"),
                });
            }
            check_finite(format!("unknowns.{}.coef", unknown.element), term.coef)?;
        }
    }

    if def.unknown_count.is_some() {
        if let Some(untied) = def
            .elements
            .iter()
            .map(|e| e.label())
            .find(|label| !tied.contains(label.as_str()))
        {
            return Err(ValidationError::MissingReference {
                id: untied,
                context: "unknowns: every element needs a tie when the count is declared"
                    .to_string(),
            });
        }
    }

    if let Some(guess) = &def.guess {
        if guess.len() != n {
            return Err(ValidationError::InvalidValue {
                field: "guess".to_string(),
                value: guess.len().to_string(),
                reason: format!("expected {n} values"),
            });
        }
        for (i, v) in guess.iter().enumerate() {
            check_finite(format!("guess[{i}]"), *v)?;
        }
    }

    let mut labelled = HashSet::new();
    for label in &def.labels {
        if label.index >= n {
            return Err(ValidationError::InvalidValue {
                field: "labels.index".to_string(),
                value: label.index.to_string(),
                reason: format!("only {n} unknowns"),
            });
        }
        if !labelled.insert(label.index) {
            return Err(ValidationError::DuplicateName {
                name: label.index.to_string(),
                context: "labels".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_element(
    network: NetworkKind,
    label: &str,
    from: &str,
    to: &str,
    kind: &ElementKind,
) -> Result<(), ValidationError> {
    if from == to {
        return Err(ValidationError::InvalidValue {
            field: format!("{label}.to"),
            value: to.to_string(),
            reason: "element connects a node to itself".to_string(),
        });
    }

    if kind.network_kind() != network {
        return Err(ValidationError::Unsupported {
            element: label.to_string(),
            reason: format!("not allowed in a {network:?} network"),
        });
    }

    match *kind {
        ElementKind::Resistor { ohms } => check_non_negative(format!("{label}.ohms"), ohms),
        ElementKind::Source { volts } => check_finite(format!("{label}.volts"), volts),
        ElementKind::Head { head_m } => check_finite(format!("{label}.head_m"), head_m),
        ElementKind::Pipe {
            length_m,
            diameter_mm,
            roughness_m,
        } => {
            check_positive(format!("{label}.length_m"), length_m)?;
            check_positive(format!("{label}.diameter_mm"), diameter_mm)?;
            check_non_negative(format!("{label}.roughness_m"), roughness_m)
        }
    }
}
