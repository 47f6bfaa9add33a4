//! Integration tests for the blocking-flow (Dinic) machine.
//!
//! Tests cover phase structure, level-graph path lengths, and agreement with
//! the reference instances.

mod helpers;

use ruvector_maxflow::run::{AlgorithmState, FlowRun};
use ruvector_maxflow::types::AlgorithmKind;
use ruvector_maxflow::{StepEvent, StepEventKind};

use helpers::{ford_fulkerson_reference, random_network, run_to_end, textbook_six};

#[test]
fn test_reference_instances() {
    for (net, expected) in [(ford_fulkerson_reference(), 14), (textbook_six(), 23)] {
        let mut run = FlowRun::new(net, AlgorithmKind::BlockingFlow).unwrap();
        run_to_end(&mut run);
        assert_eq!(run.current_flow(), expected);
        assert_eq!(run.min_cut().unwrap().capacity, expected);
    }
}

#[test]
fn test_sink_level_strictly_increases_between_phases() {
    let mut run = FlowRun::new(textbook_six(), AlgorithmKind::BlockingFlow).unwrap();
    let events = run_to_end(&mut run);
    let levels: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            StepEvent::PhaseBuilt { sink_level, .. } => Some(*sink_level),
            _ => None,
        })
        .collect();
    assert!(!levels.is_empty());
    assert!(levels.windows(2).all(|w| w[0] < w[1]), "{levels:?}");
}

#[test]
fn test_blocking_paths_match_sink_level() {
    let mut run = FlowRun::new(ford_fulkerson_reference(), AlgorithmKind::BlockingFlow).unwrap();
    let events = run_to_end(&mut run);
    let mut sink_level = 0;
    for event in &events {
        match event {
            StepEvent::PhaseBuilt { sink_level: l, .. } => sink_level = *l,
            StepEvent::BlockingUnitFound { path, amount, .. } => {
                assert_eq!(path.len(), sink_level + 1);
                assert!(*amount > 0);
            }
            _ => {}
        }
    }
}

#[test]
fn test_phase_events_alternate_correctly() {
    let mut run = FlowRun::new(random_network(7, 8, 20, 9), AlgorithmKind::BlockingFlow).unwrap();
    let kinds: Vec<StepEventKind> = run_to_end(&mut run).iter().map(StepEvent::kind).collect();

    // Blocking units only ever appear inside a phase.
    let mut in_phase = false;
    for kind in &kinds {
        match kind {
            StepEventKind::PhaseBuilt => {
                assert!(!in_phase);
                in_phase = true;
            }
            StepEventKind::BlockingUnitFound => assert!(in_phase),
            StepEventKind::PhaseExhausted => {
                assert!(in_phase);
                in_phase = false;
            }
            StepEventKind::Terminated => assert!(!in_phase),
            other => panic!("unexpected event kind {other}"),
        }
    }
}

#[test]
fn test_levels_are_exposed() {
    let mut run = FlowRun::new(ford_fulkerson_reference(), AlgorithmKind::BlockingFlow).unwrap();
    run.step().unwrap();
    let AlgorithmState::BlockingFlow(machine) = run.algorithm() else {
        panic!("wrong algorithm state");
    };
    let net = run.network();
    assert_eq!(machine.phase_count(), 1);
    assert_eq!(machine.levels()[net.source()], Some(0));
    assert_eq!(machine.levels()[net.sink()], Some(3));
    assert_eq!(machine.levels()[net.node_index("G").unwrap()], Some(3));
}
