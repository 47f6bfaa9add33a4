//! Integration tests for the min-cost augmenting-path machine.

mod helpers;

use ruvector_maxflow::run::FlowRun;
use ruvector_maxflow::types::AlgorithmKind;
use ruvector_maxflow::{FlowNetwork, StepEvent};

use helpers::{ford_fulkerson_reference, run_to_end};

/// S-T is short and expensive, S-A-B-T long and cheap.
fn priced_routes() -> FlowNetwork {
    FlowNetwork::builder()
        .source("S")
        .sink("T")
        .edge_with_cost("S", "T", 2, 10)
        .edge_with_cost("S", "A", 3, 1)
        .edge_with_cost("A", "B", 3, 1)
        .edge_with_cost("B", "T", 3, 1)
        .build()
        .unwrap()
}

fn first_path(kind: AlgorithmKind) -> Vec<String> {
    let mut run = FlowRun::new(priced_routes(), kind).unwrap();
    match run.step().unwrap() {
        StepEvent::PathAugmented { path, .. } => path,
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_cost_changes_path_choice() {
    assert_eq!(first_path(AlgorithmKind::AugmentingPath), vec!["S", "T"]);
    assert_eq!(first_path(AlgorithmKind::MinCostAugmentingPath), vec!["S", "A", "B", "T"]);
}

#[test]
fn test_total_cost_reported_at_termination() {
    let mut run = FlowRun::new(priced_routes(), AlgorithmKind::MinCostAugmentingPath).unwrap();
    let events = run_to_end(&mut run);
    match events.last().unwrap() {
        StepEvent::Terminated { total_flow, total_cost, cut_capacity, .. } => {
            assert_eq!(*total_flow, 5);
            assert_eq!(*cut_capacity, 5);
            assert_eq!(*total_cost, Some(29));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(run.network().flow_cost(), 29);
}

#[test]
fn test_cheaper_route_wins_over_equal_flow() {
    // Both routes carry 4 units; the max flow is 4 either way, but only the
    // cheap one should be used.
    let net = FlowNetwork::builder()
        .source("S")
        .sink("T")
        .edge_with_cost("S", "A", 4, 5)
        .edge_with_cost("S", "B", 4, 1)
        .edge_with_cost("A", "C", 4, 0)
        .edge_with_cost("B", "C", 4, 0)
        .edge_with_cost("C", "T", 4, 0)
        .build()
        .unwrap();
    let mut run = FlowRun::new(net, AlgorithmKind::MinCostAugmentingPath).unwrap();
    run_to_end(&mut run);
    assert_eq!(run.current_flow(), 4);
    assert_eq!(run.network().flow_cost(), 4);
    assert_eq!(run.network().edge(0).flow, 0);
}

#[test]
fn test_uncosted_network_gets_max_flow() {
    let mut run = FlowRun::new(ford_fulkerson_reference(), AlgorithmKind::MinCostAugmentingPath).unwrap();
    let events = run_to_end(&mut run);
    assert_eq!(run.current_flow(), 14);
    assert!(matches!(
        events.last(),
        Some(StepEvent::Terminated { total_cost: Some(0), .. })
    ));
}
