//! Min-cost augmenting-path state machine (successive shortest paths).
//!
//! Each step finds the cheapest source-to-sink path in the residual graph,
//! where a forward arc costs its edge's cost and a backward arc refunds it,
//! and pushes the path's bottleneck along it. Edges without a declared cost
//! cost 0. Distances are computed with a FIFO label-correcting search
//! (Bellman-Ford with a work queue) so the refunds on backward arcs are
//! handled exactly.
//!
//! The resulting flow is a maximum flow, and among maximum flows it has
//! minimum total cost as long as the initial network has no negative-cost
//! cycle. A reachable negative cycle is reported as an invariant violation.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::residual::{augment, certify_min_cut, path_from_tree};
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, Cost, MinCut, ResidualArc};

/// Phase of the min-cost machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinCostPhase {
    /// Looking for the next cheapest path.
    Searching,
    /// Max flow reached.
    Terminated,
}

/// Successive shortest paths by cost, one augmentation per step.
#[derive(Debug, Clone)]
pub struct MinCostAugmentingPath {
    phase: MinCostPhase,
    distances: Vec<Option<Cost>>,
    total_cost: Cost,
    cut: Option<MinCut>,
}

impl MinCostAugmentingPath {
    /// Create a machine for `network`.
    pub fn new(network: &FlowNetwork) -> Self {
        Self {
            phase: MinCostPhase::Searching,
            distances: vec![None; network.node_count()],
            total_cost: 0,
            cut: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> MinCostPhase {
        self.phase
    }

    /// Cost of the cheapest residual path to each node, from the most
    /// recent search.
    pub fn distances(&self) -> &[Option<Cost>] {
        &self.distances
    }

    /// Cost of the flow pushed so far.
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Label-correcting search over positive-residual arcs.
    ///
    /// Each label records how many arcs its walk uses. Labels only ever
    /// improve, so a walk of `n` arcs repeats a node whose second visit was
    /// strictly cheaper than its first: a negative-cost cycle.
    fn cheapest_tree(&mut self, network: &FlowNetwork) -> Result<Vec<Option<ResidualArc>>, FlowError> {
        let n = network.node_count();
        let source = network.source();
        let mut parent: Vec<Option<ResidualArc>> = vec![None; n];
        let mut queued = vec![false; n];
        let mut hops = vec![0usize; n];
        let mut queue = VecDeque::new();

        self.distances = vec![None; n];
        self.distances[source] = Some(0);
        queue.push_back(source);
        queued[source] = true;

        while let Some(u) = queue.pop_front() {
            queued[u] = false;
            let Some(du) = self.distances[u] else { continue };
            for arc in network.residual_arcs(u) {
                if network.residual_capacity(arc) <= 0 {
                    continue;
                }
                let candidate = du + network.arc_cost(arc);
                let length = hops[u] + 1;
                let improves = match self.distances[arc.head] {
                    None => arc.head != source,
                    Some(d) => candidate < d,
                };
                if !improves {
                    continue;
                }
                if length >= n || arc.head == source {
                    warn!(node = network.node_id(arc.head), "negative-cost residual cycle");
                    return Err(FlowError::invariant(format!(
                        "negative-cost cycle through '{}' in the residual graph",
                        network.node_id(arc.head),
                    )));
                }
                self.distances[arc.head] = Some(candidate);
                hops[arc.head] = length;
                parent[arc.head] = Some(*arc);
                if !queued[arc.head] {
                    queued[arc.head] = true;
                    queue.push_back(arc.head);
                }
            }
        }
        Ok(parent)
    }
}

impl StepAlgorithm for MinCostAugmentingPath {
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        if self.phase == MinCostPhase::Terminated {
            return Err(FlowError::invariant(
                "min-cost machine stepped after termination",
            ));
        }
        let (source, sink) = (network.source(), network.sink());
        let tree = self.cheapest_tree(network)?;

        let Some(path) = path_from_tree(network, &tree, source, sink) else {
            let total = network.flow_value();
            let cost = network.flow_cost();
            if cost != self.total_cost {
                return Err(FlowError::invariant(format!(
                    "accumulated cost {} differs from flow cost {cost}",
                    self.total_cost
                )));
            }
            let cut = certify_min_cut(network, total)?;
            let event = StepEvent::terminated(self.kind(), total, &cut, Some(cost));
            self.cut = Some(cut);
            self.phase = MinCostPhase::Terminated;
            return Ok(event);
        };

        let unit_cost = self.distances[sink].unwrap_or(0);
        augment(network, &path.arcs, path.bottleneck)?;
        self.total_cost += unit_cost * path.bottleneck;
        trace!(unit_cost, bottleneck = path.bottleneck, "cheapest path augmented");

        Ok(StepEvent::PathAugmented {
            path: network.path_ids(&path.nodes),
            edges: path.edge_ids(),
            bottleneck: path.bottleneck,
            total_flow: network.flow_value(),
            delta: None,
            unit_cost: Some(unit_cost),
        })
    }

    fn is_terminated(&self) -> bool {
        self.phase == MinCostPhase::Terminated
    }

    fn min_cut(&self) -> Option<&MinCut> {
        self.cut.as_ref()
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::MinCostAugmentingPath
    }
}
