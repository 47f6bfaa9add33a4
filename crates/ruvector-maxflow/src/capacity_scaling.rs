//! Capacity-scaling state machine.
//!
//! Augmenting paths are restricted to arcs with residual at least Δ. Δ
//! starts at the largest power of two not exceeding the maximum capacity
//! (never below 1) and is halved whenever no Δ-path remains. The run ends
//! when no path exists at Δ = 1, which is the plain residual condition.
//!
//! Step kinds:
//!
//! 1. the first step fixes the initial Δ (`Initialized`);
//! 2. each later step either augments along one shortest Δ-path
//!    (`PathAugmented`) or halves Δ (`ThresholdReduced`);
//! 3. the final step certifies the min-cut (`Terminated`).
//!
//! # Complexity
//!
//! O(E log C) augmentations for maximum capacity C.

use tracing::trace;

use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::residual::{augment, certify_min_cut, shortest_path_with_threshold};
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, Capacity, MinCut};

/// Phase of the capacity-scaling machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingPhase {
    /// Δ not chosen yet.
    Uninitialized,
    /// Searching Δ-paths.
    Scaling,
    /// Max flow reached.
    Terminated,
}

/// Largest power of two `<= max_capacity`, or 1 when `max_capacity < 2`.
pub fn initial_delta(max_capacity: Capacity) -> Capacity {
    let mut delta: Capacity = 1;
    while delta <= max_capacity / 2 {
        delta *= 2;
    }
    delta
}

/// Δ-scaling augmenting paths, one augmentation or one halving per step.
#[derive(Debug, Clone)]
pub struct CapacityScaling {
    phase: ScalingPhase,
    delta: Capacity,
    augmentations_at_delta: usize,
    cut: Option<MinCut>,
}

impl CapacityScaling {
    /// Create a machine for `network`.
    pub fn new(_network: &FlowNetwork) -> Self {
        Self {
            phase: ScalingPhase::Uninitialized,
            delta: 0,
            augmentations_at_delta: 0,
            cut: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ScalingPhase {
        self.phase
    }

    /// Current threshold, or `None` before initialisation.
    pub fn delta(&self) -> Option<Capacity> {
        (self.phase != ScalingPhase::Uninitialized).then_some(self.delta)
    }

    /// Augmentations performed at the current threshold.
    pub fn augmentations_at_delta(&self) -> usize {
        self.augmentations_at_delta
    }
}

impl StepAlgorithm for CapacityScaling {
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        match self.phase {
            ScalingPhase::Uninitialized => {
                self.delta = initial_delta(network.max_capacity());
                self.phase = ScalingPhase::Scaling;
                Ok(StepEvent::Initialized {
                    algorithm: self.kind(),
                    total_flow: network.flow_value(),
                    delta: Some(self.delta),
                    source_height: None,
                    saturated: Vec::new(),
                })
            }
            ScalingPhase::Scaling => {
                let (source, sink) = (network.source(), network.sink());
                if let Some(path) = shortest_path_with_threshold(network, source, sink, self.delta) {
                    augment(network, &path.arcs, path.bottleneck)?;
                    self.augmentations_at_delta += 1;
                    return Ok(StepEvent::PathAugmented {
                        path: network.path_ids(&path.nodes),
                        edges: path.edge_ids(),
                        bottleneck: path.bottleneck,
                        total_flow: network.flow_value(),
                        delta: Some(self.delta),
                        unit_cost: None,
                    });
                }

                let previous_delta = self.delta;
                if previous_delta <= 1 {
                    let total = network.flow_value();
                    let cut = certify_min_cut(network, total)?;
                    let event = StepEvent::terminated(self.kind(), total, &cut, None);
                    self.cut = Some(cut);
                    self.phase = ScalingPhase::Terminated;
                    return Ok(event);
                }
                self.delta = previous_delta / 2;
                self.augmentations_at_delta = 0;
                trace!(previous_delta, delta = self.delta, "threshold halved");
                Ok(StepEvent::ThresholdReduced {
                    previous_delta,
                    delta: self.delta,
                })
            }
            ScalingPhase::Terminated => Err(FlowError::invariant(
                "capacity-scaling machine stepped after termination",
            )),
        }
    }

    fn is_terminated(&self) -> bool {
        self.phase == ScalingPhase::Terminated
    }

    fn min_cut(&self) -> Option<&MinCut> {
        self.cut.as_ref()
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::CapacityScaling
    }
}
