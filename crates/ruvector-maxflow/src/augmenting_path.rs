//! Augmenting-path state machine (Ford-Fulkerson with BFS, i.e.
//! Edmonds-Karp).
//!
//! One step is one complete search-and-augment cycle:
//!
//! 1. find the shortest positive-residual path (declaration-order
//!    tie-break);
//! 2. if none exists, certify the min-cut and terminate;
//! 3. otherwise push the path's bottleneck along it.
//!
//! # Complexity
//!
//! At most O(V * E) augmenting steps, each O(E).

use tracing::trace;

use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::residual::{augment, bfs_tree, certify_min_cut, path_from_tree};
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, MinCut, NodeIndex, ResidualArc};

/// Phase of the augmenting-path machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentingPhase {
    /// Looking for the next augmenting path.
    Searching,
    /// Max flow reached.
    Terminated,
}

/// Edmonds-Karp, one augmentation per step.
#[derive(Debug, Clone)]
pub struct AugmentingPathSearch {
    phase: AugmentingPhase,
    parents: Vec<Option<ResidualArc>>,
    augmentations: usize,
    cut: Option<MinCut>,
}

impl AugmentingPathSearch {
    /// Create a machine for `network`.
    pub fn new(network: &FlowNetwork) -> Self {
        Self {
            phase: AugmentingPhase::Searching,
            parents: vec![None; network.node_count()],
            augmentations: 0,
            cut: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> AugmentingPhase {
        self.phase
    }

    /// BFS tree of the most recent search: the arc each node was reached
    /// through.
    pub fn parents(&self) -> &[Option<ResidualArc>] {
        &self.parents
    }

    /// Parent node of `node` in the most recent search tree.
    pub fn parent_of(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.parents[node].map(|a| a.tail)
    }

    /// Number of augmentations performed so far.
    pub fn augmentations(&self) -> usize {
        self.augmentations
    }
}

impl StepAlgorithm for AugmentingPathSearch {
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        if self.phase == AugmentingPhase::Terminated {
            return Err(FlowError::invariant(
                "augmenting-path machine stepped after termination",
            ));
        }
        let (source, sink) = (network.source(), network.sink());
        self.parents = bfs_tree(network, source, 1, Some(sink));

        let Some(path) = path_from_tree(network, &self.parents, source, sink) else {
            let total = network.flow_value();
            let cut = certify_min_cut(network, total)?;
            let event = StepEvent::terminated(self.kind(), total, &cut, None);
            self.cut = Some(cut);
            self.phase = AugmentingPhase::Terminated;
            return Ok(event);
        };

        augment(network, &path.arcs, path.bottleneck)?;
        self.augmentations += 1;
        trace!(bottleneck = path.bottleneck, hops = path.arcs.len(), "augmented");

        Ok(StepEvent::PathAugmented {
            path: network.path_ids(&path.nodes),
            edges: path.edge_ids(),
            bottleneck: path.bottleneck,
            total_flow: network.flow_value(),
            delta: None,
            unit_cost: None,
        })
    }

    fn is_terminated(&self) -> bool {
        self.phase == AugmentingPhase::Terminated
    }

    fn min_cut(&self) -> Option<&MinCut> {
        self.cut.as_ref()
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::AugmentingPath
    }
}
