//! Sign conventions and friction-policy properties across branch models.

use lf_components::{
    Branch, Fluid, FrictionPolicy, GaussianNoise, HeadSource, MeanOnly, Pipe, Resistor,
    VoltageSource,
};
use lf_core::Id;
use lf_core::units::{m, mm};
use lf_graph::{Endpoints, Traversal};
use proptest::prelude::*;

fn branches(value: f64) -> Vec<Box<dyn Branch>> {
    vec![
        Box::new(Resistor::new("r", value.abs())),
        Box::new(VoltageSource::new("v", value)),
        Box::new(HeadSource::new("h", m(value))),
        Box::new(Pipe::new("p", m(100.0), mm(150.0), m(0.00025), Fluid::water())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reversing_the_walk_negates_the_gain(value in -50.0f64..50.0, through in -0.5f64..0.5) {
        for branch in branches(value) {
            let fwd = branch.potential_gain(through, Traversal::Forward).unwrap();
            let rev = branch.potential_gain(through, Traversal::Reverse).unwrap();
            prop_assert!((fwd + rev).abs() <= 1e-12 * fwd.abs().max(1.0), "{}", branch.name());
        }
    }

    #[test]
    fn passive_branches_never_gain_along_the_flow(through in -0.5f64..0.5) {
        for branch in branches(3.0).into_iter().filter(|b| !b.is_source()) {
            let gain = branch.potential_gain(through, Traversal::Forward).unwrap();
            prop_assert!(gain * through <= 0.0);
        }
    }

    #[test]
    fn mean_friction_stays_between_its_limits(re in 2000.0f64..4000.0, rr in 0.0f64..0.01) {
        let policy = FrictionPolicy::default();
        let f = policy.friction_factor(re, rr, &MeanOnly).unwrap();
        let lo = policy.turbulent(4000.0, rr).unwrap().min(64.0 / 2000.0);
        let hi = policy.turbulent(4000.0, rr).unwrap().max(64.0 / 2000.0);
        prop_assert!(f >= lo - 1e-12 && f <= hi + 1e-12);
    }
}

#[test]
fn friction_is_continuous_at_regime_limits() {
    let policy = FrictionPolicy::default();
    let rr = 0.00025 / 0.3;
    let below = policy.friction_factor(3999.999, rr, &MeanOnly).unwrap();
    let at = policy.friction_factor(4000.0, rr, &MeanOnly).unwrap();
    assert!((below - at).abs() < 1e-6);

    let at_lam = policy.friction_factor(2000.0, rr, &MeanOnly).unwrap();
    let above = policy.friction_factor(2000.001, rr, &MeanOnly).unwrap();
    assert!((at_lam - above).abs() < 1e-6);
}

#[test]
fn source_polarity_is_directed() {
    for branch in branches(1.0) {
        assert_eq!(branch.is_source(), branch.polarity() == lf_graph::Polarity::Directed);
    }
}

#[test]
fn reversing_source_endpoints_negates_its_rise() {
    let a = Id::from_index(0);
    let b = Id::from_index(1);
    let src = VoltageSource::new("v", 9.0);
    let declared = Endpoints::new(a, b);
    let reversed = Endpoints::new(b, a);

    // a walk entering at a
    let with = src.potential_gain(0.0, declared.traversal_from(a).unwrap()).unwrap();
    let against = src.potential_gain(0.0, reversed.traversal_from(a).unwrap()).unwrap();
    assert_eq!(with, 9.0);
    assert_eq!(against, -9.0);

    // turning the walk around as well restores the rise
    let back = src.potential_gain(0.0, reversed.traversal_from(b).unwrap()).unwrap();
    assert_eq!(back, with);
}

#[test]
fn transitional_draws_scatter_around_the_mean() {
    let policy = FrictionPolicy::default();
    let rr = 0.00025 / 0.1;
    let re = 3000.0;
    let mean = policy.transitional_mean(re, rr).unwrap();
    let sigma = policy.spread * mean;
    let noise = GaussianNoise::seeded(11);

    let draws: Vec<f64> = (0..500)
        .map(|_| policy.friction_factor(re, rr, &noise).unwrap())
        .collect();
    assert!(draws.iter().all(|f| (f - mean).abs() < 6.0 * sigma));
    let avg = draws.iter().sum::<f64>() / draws.len() as f64;
    assert!((avg - mean).abs() < 0.5 * sigma);
}
