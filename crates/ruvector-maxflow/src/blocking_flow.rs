//! Blocking-flow state machine (Dinic).
//!
//! Alternates between two kinds of step:
//!
//! - **NeedLevels**: BFS levels from the source over positive-residual arcs.
//!   If the sink gets no level the run terminates; otherwise a new phase
//!   begins.
//! - **BlockingSearch**: one depth-first probe through the level graph
//!   (arcs `u -> v` with `level(v) = level(u) + 1` and positive residual).
//!   A successful probe pushes its bottleneck to the sink; a failed probe
//!   ends the phase.
//!
//! The probe is iterative with an explicit stack and per-node current-arc
//! pointers that persist across probes of the same phase, so the discovery
//! order matches the classic recursive formulation.
//!
//! # Complexity
//!
//! At most V phases, each with at most E successful probes.

use tracing::trace;

use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::residual::{augment, bottleneck, certify_min_cut, level_graph};
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, MinCut, NodeIndex, ResidualArc};

/// Phase of the blocking-flow machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DinicPhase {
    /// The next step builds a level graph.
    NeedLevels,
    /// The next step probes the current level graph.
    BlockingSearch,
    /// Max flow reached.
    Terminated,
}

/// Dinic's algorithm, one level-graph build or one blocking path per step.
#[derive(Debug, Clone)]
pub struct BlockingFlow {
    phase: DinicPhase,
    levels: Vec<Option<usize>>,
    current_arc: Vec<usize>,
    phase_count: usize,
    cut: Option<MinCut>,
}

impl BlockingFlow {
    /// Create a machine for `network`.
    pub fn new(network: &FlowNetwork) -> Self {
        let n = network.node_count();
        Self {
            phase: DinicPhase::NeedLevels,
            levels: vec![None; n],
            current_arc: vec![0; n],
            phase_count: 0,
            cut: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DinicPhase {
        self.phase
    }

    /// Levels of the current (or last) level graph.
    pub fn levels(&self) -> &[Option<usize>] {
        &self.levels
    }

    /// Number of level graphs built so far.
    pub fn phase_count(&self) -> usize {
        self.phase_count
    }

    fn is_admissible(&self, network: &FlowNetwork, arc: &ResidualArc) -> bool {
        match (self.levels[arc.tail], self.levels[arc.head]) {
            (Some(lu), Some(lv)) => lv == lu + 1 && network.residual_capacity(arc) > 0,
            _ => false,
        }
    }

    /// Depth-first probe from the source; returns the arcs of the path found,
    /// or `None` once the source has no admissible arc left.
    fn probe(&mut self, network: &FlowNetwork) -> Option<(Vec<NodeIndex>, Vec<ResidualArc>)> {
        let (source, sink) = (network.source(), network.sink());
        let mut stack: Vec<NodeIndex> = vec![source];
        let mut arcs: Vec<ResidualArc> = Vec::new();

        while let Some(&v) = stack.last() {
            if v == sink {
                return Some((stack, arcs));
            }
            let adjacent = network.residual_arcs(v);
            let mut advanced = false;
            while self.current_arc[v] < adjacent.len() {
                let arc = adjacent[self.current_arc[v]];
                if self.is_admissible(network, &arc) {
                    stack.push(arc.head);
                    arcs.push(arc);
                    advanced = true;
                    break;
                }
                self.current_arc[v] += 1;
            }
            if !advanced {
                // Dead end: retreat and move the parent past this arc.
                stack.pop();
                if arcs.pop().is_some() {
                    if let Some(&parent) = stack.last() {
                        self.current_arc[parent] += 1;
                    }
                }
                trace!(node = v, "dead end");
            }
        }
        None
    }
}

impl StepAlgorithm for BlockingFlow {
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        match self.phase {
            DinicPhase::NeedLevels => {
                self.levels = level_graph(network, network.source());
                let Some(sink_level) = self.levels[network.sink()] else {
                    let total = network.flow_value();
                    let cut = certify_min_cut(network, total)?;
                    let event = StepEvent::terminated(self.kind(), total, &cut, None);
                    self.cut = Some(cut);
                    self.phase = DinicPhase::Terminated;
                    return Ok(event);
                };
                self.current_arc.fill(0);
                self.phase_count += 1;
                self.phase = DinicPhase::BlockingSearch;
                Ok(StepEvent::PhaseBuilt {
                    phase: self.phase_count,
                    sink_level,
                    levelled: self.levels.iter().filter(|l| l.is_some()).count(),
                })
            }
            DinicPhase::BlockingSearch => match self.probe(network) {
                Some((nodes, arcs)) => {
                    let amount = bottleneck(network, &arcs);
                    augment(network, &arcs, amount)?;
                    Ok(StepEvent::BlockingUnitFound {
                        phase: self.phase_count,
                        path: network.path_ids(&nodes),
                        edges: arcs.iter().map(|a| a.edge).collect(),
                        amount,
                        total_flow: network.flow_value(),
                    })
                }
                None => {
                    self.phase = DinicPhase::NeedLevels;
                    Ok(StepEvent::PhaseExhausted {
                        phase: self.phase_count,
                        total_flow: network.flow_value(),
                    })
                }
            },
            DinicPhase::Terminated => Err(FlowError::invariant(
                "blocking-flow machine stepped after termination",
            )),
        }
    }

    fn is_terminated(&self) -> bool {
        self.phase == DinicPhase::Terminated
    }

    fn min_cut(&self) -> Option<&MinCut> {
        self.cut.as_ref()
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::BlockingFlow
    }
}
