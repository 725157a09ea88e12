//! Linear map from solver unknowns to element through-quantities.
//!
//! Each element flow is a weighted sum of unknowns. The identity map gives
//! every element its own unknown; `tie` expresses an element flow through
//! other unknowns, e.g. a branch carrying the difference of two currents.

use lf_core::{ElemId, Real};
use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};

/// Element flows as linear combinations of unknowns.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMap {
    unknowns: usize,
    rows: Vec<Vec<(usize, Real)>>,
}

impl FlowMap {
    /// One unknown per element, in element order.
    pub fn identity(n: usize) -> Self {
        Self {
            unknowns: n,
            rows: (0..n).map(|i| vec![(i, 1.0)]).collect(),
        }
    }

    /// Empty map for `elements` flows over `unknowns` unknowns. Every row must be tied before use.
    pub fn new(elements: usize, unknowns: usize) -> Self {
        Self {
            unknowns,
            rows: vec![Vec::new(); elements],
        }
    }

    /// Replace the row of `elem` with `flow = sum(coef * x[index])`.
    pub fn tie(&mut self, elem: ElemId, terms: &[(usize, Real)]) -> SolverResult<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(elem.idx())
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("flow map has {len} elements, cannot tie element {elem}"),
            })?;
        if let Some((index, _)) = terms.iter().find(|(i, _)| *i >= self.unknowns) {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "element {elem} refers to unknown {index}, only {} exist",
                    self.unknowns
                ),
            });
        }
        if terms.iter().any(|(_, c)| !c.is_finite()) {
            return Err(SolverError::ProblemSetup {
                what: format!("element {elem} has a non-finite coefficient"),
            });
        }
        *row = terms.to_vec();
        Ok(())
    }

    pub fn unknowns(&self) -> usize {
        self.unknowns
    }

    pub fn elements(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, elem: ElemId) -> &[(usize, Real)] {
        self.rows.get(elem.idx()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every element is tied to something and every unknown drives some element.
    pub fn validate(&self) -> SolverResult<()> {
        if let Some(i) = self.rows.iter().position(Vec::is_empty) {
            return Err(SolverError::ProblemSetup {
                what: format!("element {i} has no flow expression"),
            });
        }
        let mut used = vec![false; self.unknowns];
        for &(index, coef) in self.rows.iter().flatten() {
            if coef != 0.0 {
                used[index] = true;
            }
        }
        if let Some(i) = used.iter().position(|u| !u) {
            return Err(SolverError::ProblemSetup {
                what: format!("unknown {i} does not appear in any element flow"),
            });
        }
        Ok(())
    }

    /// Evaluate the element flows for the unknowns `x`.
    pub fn apply(&self, x: &DVector<f64>) -> SolverResult<Vec<Real>> {
        if x.len() != self.unknowns {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "expected {} unknowns, got {}",
                    self.unknowns,
                    x.len()
                ),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|row| row.iter().map(|&(i, c)| c * x[i]).sum())
            .collect())
    }
}
