//! Solve execution and report formatting.

use std::sync::Arc;

use lf_components::{GaussianNoise, MeanOnly, NoiseSource};
use lf_core::Real;
use lf_core::units::m3ps;
use lf_project::schema::{NetworkDef, NetworkKind};
use lf_solver::{NetworkProblem, NewtonConfig, solve};
use tracing::info;
use uom::si::volume_rate::liter_per_second;

use crate::compile::{CompiledNetwork, compile, through_scale};
use crate::error::AppResult;

/// Options for a single solve.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Seed for transitional friction noise; `None` uses the deterministic mean.
    pub seed: Option<u64>,
    /// Initial unknowns in description units, replacing the description's own guess.
    pub guess: Option<Vec<Real>>,
    pub newton: Option<NewtonConfig>,
}

impl RunOptions {
    pub fn noise(&self) -> Arc<dyn NoiseSource> {
        match self.seed {
            Some(seed) => Arc::new(GaussianNoise::seeded(seed)),
            None => Arc::new(MeanOnly),
        }
    }
}

/// Outcome of a solve, with everything the report needs.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    pub kind: NetworkKind,
    pub unknown_labels: Vec<String>,
    pub element_labels: Vec<String>,
    /// Solved unknowns in SI
    pub unknowns: Vec<Real>,
    /// Element flows in SI, along each element's declared direction
    pub flows: Vec<Real>,
    pub iterations: usize,
    pub residual_norm: Real,
    report_signs: Vec<Real>,
}

impl RunReport {
    /// Report lines: one per unknown for circuits, one per element for hydraulic networks.
    pub fn lines(&self) -> Vec<String> {
        match self.kind {
            NetworkKind::Circuit => self
                .unknown_labels
                .iter()
                .zip(&self.unknowns)
                .map(|(label, current)| format!("{label} = {current:.1} A"))
                .collect(),
            NetworkKind::Hydraulic => self
                .element_labels
                .iter()
                .enumerate()
                .filter_map(|(i, label)| {
                    self.reported_flow(i)
                        .map(|q| format!("The flow in segment {label} is {q:.2} L/s"))
                })
                .collect(),
        }
    }

    /// Flow of element `index` in report units, read along its label.
    pub fn reported_flow(&self, index: usize) -> Option<Real> {
        let q = self.flows.get(index)? * self.report_signs.get(index)?;
        Some(match self.kind {
            NetworkKind::Circuit => q,
            NetworkKind::Hydraulic => m3ps(q).get::<liter_per_second>(),
        })
    }

    /// Reported flow of the element with this label.
    pub fn flow_of(&self, label: &str) -> Option<Real> {
        self.element_labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.reported_flow(i))
    }
}

impl CompiledNetwork {
    /// Attach the branches to a problem and solve it.
    ///
    /// `guess` is in description units; without it the compiled guess is used.
    pub fn solve(
        self,
        config: Option<NewtonConfig>,
        guess: Option<&[Real]>,
    ) -> AppResult<RunReport> {
        let scale = through_scale(self.kind);
        let x0: Vec<Real> = match guess {
            Some(values) => values.iter().map(|v| v * scale).collect(),
            None => self.guess,
        };

        let mut problem = NetworkProblem::new(&self.graph);
        for (elem, branch) in self.graph.elements().iter().zip(self.branches) {
            problem.add_branch(elem.id, branch)?;
        }
        problem.set_flow_map(self.flow_map)?;

        let solution = solve(&mut problem, config, Some(&x0))?;

        info!(
            network = %self.name,
            iterations = solution.iterations,
            residual_norm = solution.residual_norm,
            "run complete"
        );

        Ok(RunReport {
            name: self.name,
            kind: self.kind,
            unknown_labels: self.unknown_labels,
            element_labels: self.element_labels,
            unknowns: solution.unknowns,
            flows: solution.flows,
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
            report_signs: self.report_signs,
        })
    }
}

/// Compile and solve a description.
pub fn run(def: &NetworkDef, options: &RunOptions) -> AppResult<RunReport> {
    let compiled = compile(def, options.noise())?;
    compiled.solve(options.newton, options.guess.as_deref())
}
