//! End-to-end solves of resistor and pipe networks.

use lf_components::{Branch, Fluid, HeadSource, Pipe, Resistor, VoltageSource};
use lf_core::units::{m, mm};
use lf_graph::{Graph, GraphBuilder, Polarity};
use lf_solver::{FlowMap, NetworkProblem, SolverError, solve};
use proptest::prelude::*;

fn attach(problem: &mut NetworkProblem, branches: Vec<Box<dyn Branch>>) {
    let ids: Vec<_> = problem.graph.elements().iter().map(|e| e.id).collect();
    for (id, branch) in ids.into_iter().zip(branches) {
        problem.add_branch(id, branch).unwrap();
    }
}

fn series_graph(reversed_source: bool) -> Graph {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    let c = b.add_node("c");
    let src = if reversed_source {
        b.add_element("ba", n_b, a, Polarity::Directed)
    } else {
        b.add_element("ab", a, n_b, Polarity::Directed)
    };
    let r1 = b.add_element("bc", n_b, c, Polarity::Undirected);
    let r2 = b.add_element("ca", c, a, Polarity::Undirected);
    b.add_loop("L1", &[src, r1, r2]);
    b.build().unwrap()
}

fn solve_series(volts: f64, r1: f64, r2: f64, reversed_source: bool) -> Vec<f64> {
    let graph = series_graph(reversed_source);
    let mut problem = NetworkProblem::new(&graph);
    attach(
        &mut problem,
        vec![
            Box::new(VoltageSource::new("src", volts)),
            Box::new(Resistor::new("bc", r1)),
            Box::new(Resistor::new("ca", r2)),
        ],
    );
    solve(&mut problem, None, None).unwrap().flows
}

/// Four nodes, a 28 V source a->b, resistors bc 4, cd 2, da 2 and a 12 ohm chord ac.
///
/// Series 4 ohm with (12 || 4) = 7 ohm draws 4 A; it splits 3 A through c-d-a and
/// 1 A back from c to a through the chord.
fn two_loop_circuit() -> Graph {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    let c = b.add_node("c");
    let d = b.add_node("d");
    let ab = b.add_element("ab", a, n_b, Polarity::Directed);
    let bc = b.add_element("bc", n_b, c, Polarity::Undirected);
    let cd = b.add_element("cd", c, d, Polarity::Undirected);
    let da = b.add_element("da", d, a, Polarity::Undirected);
    let ac = b.add_element("ac", a, c, Polarity::Undirected);
    b.add_loop("L1", &[ab, bc, ac]);
    b.add_loop("L2", &[ac, cd, da]);
    b.build().unwrap()
}

fn two_loop_branches() -> Vec<Box<dyn Branch>> {
    vec![
        Box::new(VoltageSource::new("ab", 28.0)),
        Box::new(Resistor::new("bc", 4.0)),
        Box::new(Resistor::new("cd", 2.0)),
        Box::new(Resistor::new("da", 2.0)),
        Box::new(Resistor::new("ac", 12.0)),
    ]
}

const TWO_LOOP_CURRENTS: [f64; 5] = [4.0, 4.0, 3.0, 3.0, -1.0];

#[test]
fn series_loop_obeys_ohms_law() {
    let flows = solve_series(12.0, 1.0, 3.0, false);
    for flow in flows {
        assert!((flow - 3.0).abs() < 1e-6, "{flow}");
    }
}

#[test]
fn reversed_source_reverses_current() {
    let forward = solve_series(12.0, 1.0, 3.0, false);
    let reversed = solve_series(12.0, 1.0, 3.0, true);
    // the source's own flow is counted along its declared direction
    assert!((forward[0] - 3.0).abs() < 1e-6);
    assert!((reversed[0] - 3.0).abs() < 1e-6);
    // the passive branches see the current turn around
    assert!((forward[1] + reversed[1]).abs() < 1e-6);
    assert!((forward[2] + reversed[2]).abs() < 1e-6);
}

#[test]
fn two_loop_circuit_matches_hand_solution() {
    let graph = two_loop_circuit();
    let mut problem = NetworkProblem::new(&graph);
    attach(&mut problem, two_loop_branches());

    let solution = solve(&mut problem, None, None).unwrap();

    for (got, want) in solution.flows.iter().zip(TWO_LOOP_CURRENTS) {
        assert_eq!(format!("{got:.1}"), format!("{want:.1}"));
        assert!((got - want).abs() < 1e-6);
    }
    solution.check_residuals(1e-9).unwrap();
    assert!((problem.flow_by_name("ac").unwrap() + 1.0).abs() < 1e-6);
}

#[test]
fn tied_unknowns_reach_the_same_currents() {
    let graph = two_loop_circuit();
    let mut problem = NetworkProblem::new(&graph);
    attach(&mut problem, two_loop_branches());

    let ids: Vec<_> = graph.elements().iter().map(|e| e.id).collect();
    let mut map = FlowMap::identity(5);
    // da carries cd's unknown plus a correction; ac is measured c -> a
    map.tie(ids[3], &[(2, 1.0), (3, 1.0)]).unwrap();
    map.tie(ids[4], &[(4, -1.0)]).unwrap();
    problem.set_flow_map(map).unwrap();

    let solution = solve(&mut problem, None, None).unwrap();

    let expected_unknowns = [4.0, 4.0, 3.0, 0.0, 1.0];
    for (got, want) in solution.unknowns.iter().zip(expected_unknowns) {
        assert!((got - want).abs() < 1e-6, "{got} vs {want}");
    }
    for (got, want) in solution.flows.iter().zip(TWO_LOOP_CURRENTS) {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn one_loop_current_solves_the_series_loop() {
    let graph = series_graph(false);
    let mut problem = NetworkProblem::new(&graph);
    attach(
        &mut problem,
        vec![
            Box::new(VoltageSource::new("src", 12.0)),
            Box::new(Resistor::new("bc", 1.0)),
            Box::new(Resistor::new("ca", 3.0)),
        ],
    );
    let mut map = FlowMap::new(3, 1);
    for elem in graph.elements() {
        map.tie(elem.id, &[(0, 1.0)]).unwrap();
    }
    problem.set_flow_map(map).unwrap();

    let solution = solve(&mut problem, None, None).unwrap();
    assert_eq!(solution.unknowns.len(), 1);
    assert_eq!(solution.residuals.len(), 1);
    assert!((solution.unknowns[0] - 3.0).abs() < 1e-6);
    for flow in &solution.flows {
        assert!((flow - 3.0).abs() < 1e-6);
    }
}

/// Five nodes: a 32 V source a->b, resistors ad 2, bc 2, cd 4, ce 3 and de 5.
///
/// Mesh a-b-c-d-a carries 4.8 A, mesh c-d-e-c carries -1.6 A, so cd takes
/// their sum and ce, walked e -> c, carries 1.6 A from c to e.
fn five_node_circuit() -> Graph {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    let c = b.add_node("c");
    let d = b.add_node("d");
    let e = b.add_node("e");
    let ab = b.add_element("ab", a, n_b, Polarity::Directed);
    let ad = b.add_element("ad", a, d, Polarity::Undirected);
    let bc = b.add_element("bc", n_b, c, Polarity::Undirected);
    let cd = b.add_element("cd", c, d, Polarity::Undirected);
    let ce = b.add_element("ce", c, e, Polarity::Undirected);
    let de = b.add_element("de", d, e, Polarity::Undirected);
    b.add_loop("L1", &[ab, bc, cd, ad]);
    b.add_loop("L2", &[cd, de, ce]);
    b.build().unwrap()
}

fn five_node_branches() -> Vec<Box<dyn Branch>> {
    vec![
        Box::new(VoltageSource::new("ab", 32.0)),
        Box::new(Resistor::new("ad", 2.0)),
        Box::new(Resistor::new("bc", 2.0)),
        Box::new(Resistor::new("cd", 4.0)),
        Box::new(Resistor::new("ce", 3.0)),
        Box::new(Resistor::new("de", 5.0)),
    ]
}

const FIVE_NODE_CURRENTS: [f64; 6] = [4.8, -4.8, 4.8, 3.2, 1.6, -1.6];

#[test]
fn five_node_circuit_matches_hand_solution() {
    let graph = five_node_circuit();
    let mut problem = NetworkProblem::new(&graph);
    attach(&mut problem, five_node_branches());
    assert_eq!(problem.num_equations(), 6);

    let solution = solve(&mut problem, None, None).unwrap();
    solution.check_residuals(1e-9).unwrap();
    for (got, want) in solution.flows.iter().zip(FIVE_NODE_CURRENTS) {
        assert_eq!(format!("{got:.1}"), format!("{want:.1}"));
    }
}

#[test]
fn mesh_currents_need_only_the_loop_laws() {
    let graph = five_node_circuit();
    let mut problem = NetworkProblem::new(&graph);
    attach(&mut problem, five_node_branches());

    let ids: Vec<_> = graph.elements().iter().map(|e| e.id).collect();
    let mut map = FlowMap::new(6, 2);
    map.tie(ids[0], &[(0, 1.0)]).unwrap();
    map.tie(ids[1], &[(0, -1.0)]).unwrap();
    map.tie(ids[2], &[(0, 1.0)]).unwrap();
    map.tie(ids[3], &[(0, 1.0), (1, 1.0)]).unwrap();
    map.tie(ids[4], &[(1, -1.0)]).unwrap();
    map.tie(ids[5], &[(1, 1.0)]).unwrap();
    problem.set_flow_map(map).unwrap();
    assert_eq!(problem.node_rows().count(), 0);

    let solution = solve(&mut problem, None, None).unwrap();
    assert!((solution.unknowns[0] - 4.8).abs() < 1e-6);
    assert!((solution.unknowns[1] + 1.6).abs() < 1e-6);
    for (got, want) in solution.flows.iter().zip(FIVE_NODE_CURRENTS) {
        assert!((got - want).abs() < 1e-6, "{got} vs {want}");
    }
}

#[test]
fn missing_loop_makes_system_non_square() {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    b.add_element("ab", a, n_b, Polarity::Directed);
    b.add_element("ba", n_b, a, Polarity::Undirected);
    let graph = b.build().unwrap();

    let mut problem = NetworkProblem::new(&graph);
    attach(
        &mut problem,
        vec![
            Box::new(VoltageSource::new("ab", 1.0)),
            Box::new(Resistor::new("ba", 1.0)),
        ],
    );
    assert!(matches!(
        solve(&mut problem, None, None),
        Err(SolverError::ProblemSetup { .. })
    ));
}

fn pipe(name: &str, length: f64, d_mm: f64) -> Box<dyn Branch> {
    Box::new(Pipe::new(name, m(length), mm(d_mm), m(0.00025), Fluid::water()))
}

/// 60 L/s enters at a and leaves through b, c and d.
fn pipe_grid() -> Graph {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    let c = b.add_node("c");
    let d = b.add_node("d");
    b.set_demand(a, -0.060);
    b.set_demand(n_b, 0.020);
    b.set_demand(c, 0.025);
    b.set_demand(d, 0.015);
    let ab = b.add_element("a-b", a, n_b, Polarity::Undirected);
    let bc = b.add_element("b-c", n_b, c, Polarity::Undirected);
    let cd = b.add_element("c-d", c, d, Polarity::Undirected);
    let ad = b.add_element("a-d", a, d, Polarity::Undirected);
    let ac = b.add_element("a-c", a, c, Polarity::Undirected);
    b.add_loop("A", &[ab, bc, ac]);
    b.add_loop("B", &[ac, cd, ad]);
    b.build().unwrap()
}

#[test]
fn pipe_grid_balances_flow_and_head() {
    let graph = pipe_grid();
    let mut problem = NetworkProblem::new(&graph);
    attach(
        &mut problem,
        vec![
            pipe("a-b", 250.0, 300.0),
            pipe("b-c", 300.0, 250.0),
            pipe("c-d", 250.0, 250.0),
            pipe("a-d", 300.0, 300.0),
            pipe("a-c", 400.0, 200.0),
        ],
    );

    let solution = solve(&mut problem, None, None).unwrap();
    solution.check_residuals(1e-8).unwrap();

    let q = &solution.flows;
    // everything entering at a leaves through its three pipes
    assert!((q[0] + q[3] + q[4] - 0.060).abs() < 1e-8);
    // the short, wide pipe out of a carries more than the long, narrow chord
    assert!(q[0] > q[4]);
    assert!(q.iter().all(|v| v.is_finite()));
}

#[test]
fn pump_drives_flow_against_friction() {
    let mut b = GraphBuilder::new();
    let a = b.add_node("a");
    let n_b = b.add_node("b");
    let c = b.add_node("c");
    let pump = b.add_element("pump", a, n_b, Polarity::Directed);
    let p1 = b.add_element("b-c", n_b, c, Polarity::Undirected);
    let p2 = b.add_element("a-c", a, c, Polarity::Undirected);
    b.add_loop("L", &[pump, p1, p2]);
    let graph = b.build().unwrap();

    let line1 = Pipe::new("b-c", m(200.0), mm(150.0), m(0.00025), Fluid::water());
    let line2 = Pipe::new("a-c", m(150.0), mm(150.0), m(0.00025), Fluid::water());
    let mut problem = NetworkProblem::new(&graph);
    attach(
        &mut problem,
        vec![
            Box::new(HeadSource::new("pump", m(10.0))),
            Box::new(line1.clone()),
            Box::new(line2.clone()),
        ],
    );

    let solution = solve(&mut problem, None, None).unwrap();
    let q = solution.flows[0];
    assert!(q > 0.0);
    // a-c is declared against the loop, so it carries -q
    assert!((solution.flows[2] + q).abs() < 1e-8);
    let lost = line1.head_loss(q).unwrap() + line2.head_loss(q).unwrap();
    assert!((lost - 10.0).abs() < 1e-6, "{lost}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn series_current_is_v_over_total_r(
        volts in -50.0f64..50.0,
        r1 in 0.5f64..20.0,
        r2 in 0.5f64..20.0,
    ) {
        let flows = solve_series(volts, r1, r2, false);
        let expected = volts / (r1 + r2);
        for flow in flows {
            prop_assert!((flow - expected).abs() < 1e-6);
        }
    }
}
