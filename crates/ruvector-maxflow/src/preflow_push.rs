//! Preflow-push (push-relabel) state machine.
//!
//! The first step saturates every edge leaving the source and lifts the
//! source to height `n`. Each later step selects one active node (positive
//! excess, neither source nor sink) in the configured
//! [`ActiveNodeOrder`] and either pushes along an admissible arc
//! (`height(head) = height(tail) - 1`) or, if none exists, relabels it to
//! one more than its lowest residual neighbour. When no active node remains
//! the preflow is a maximum flow and the run terminates.
//!
//! # Invariants
//!
//! - `excess(v) >= 0` for every `v != source` after initialisation;
//! - heights never decrease, and the source height stays `n`;
//! - pushes only go one level downhill.
//!
//! # Complexity
//!
//! O(V^2) relabels and O(V^2 E) pushes.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::config::ActiveNodeOrder;
use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::residual::{augment, certify_min_cut};
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, ArcDirection, Capacity, MinCut, NodeIndex};

/// Phase of the preflow-push machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflowPhase {
    /// Heights and the initial preflow are not set yet.
    Uninitialized,
    /// Discharging active nodes.
    Active,
    /// Max flow reached.
    Terminated,
}

/// Push-relabel, one push or one relabel per step.
#[derive(Debug, Clone)]
pub struct PreflowPush {
    phase: PreflowPhase,
    order: ActiveNodeOrder,
    heights: Vec<usize>,
    excess: Vec<Capacity>,
    queue: VecDeque<NodeIndex>,
    queued: Vec<bool>,
    cut: Option<MinCut>,
}

impl PreflowPush {
    /// Create a machine for `network` that selects active nodes in `order`.
    pub fn new(network: &FlowNetwork, order: ActiveNodeOrder) -> Self {
        let n = network.node_count();
        Self {
            phase: PreflowPhase::Uninitialized,
            order,
            heights: vec![0; n],
            excess: vec![0; n],
            queue: VecDeque::new(),
            queued: vec![false; n],
            cut: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PreflowPhase {
        self.phase
    }

    /// Height of every node.
    pub fn heights(&self) -> &[usize] {
        &self.heights
    }

    /// Excess of every node; the source's is the negated amount it sent.
    pub fn excess(&self) -> &[Capacity] {
        &self.excess
    }

    /// Nodes currently holding excess, in index order.
    pub fn active_nodes(&self, network: &FlowNetwork) -> Vec<NodeIndex> {
        (0..self.excess.len())
            .filter(|&v| self.is_active(network, v))
            .collect()
    }

    fn is_active(&self, network: &FlowNetwork, v: NodeIndex) -> bool {
        v != network.source() && v != network.sink() && self.excess[v] > 0
    }

    fn mark_active(&mut self, network: &FlowNetwork, v: NodeIndex) {
        if self.order == ActiveNodeOrder::Fifo && !self.queued[v] && self.is_active(network, v) {
            self.queued[v] = true;
            self.queue.push_back(v);
        }
    }

    fn select(&mut self, network: &FlowNetwork) -> Option<NodeIndex> {
        match self.order {
            ActiveNodeOrder::LowestIndex => {
                (0..self.excess.len()).find(|&v| self.is_active(network, v))
            }
            ActiveNodeOrder::HighestLabel => (0..self.excess.len())
                .filter(|&v| self.is_active(network, v))
                // max_by_key keeps the last maximum; reverse to favour low indices.
                .rev()
                .max_by_key(|&v| self.heights[v]),
            ActiveNodeOrder::Fifo => {
                while let Some(&front) = self.queue.front() {
                    if self.is_active(network, front) {
                        return Some(front);
                    }
                    self.queue.pop_front();
                    self.queued[front] = false;
                }
                None
            }
        }
    }

    fn initialize(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        let source = network.source();
        self.heights[source] = network.node_count();

        let arcs: Vec<_> = network
            .residual_arcs(source)
            .iter()
            .copied()
            .filter(|a| a.direction == ArcDirection::Forward)
            .collect();
        let mut saturated = Vec::new();
        for arc in arcs {
            let amount = network.residual_capacity(&arc);
            if amount == 0 {
                continue;
            }
            augment(network, &[arc], amount)?;
            self.excess[arc.head] += amount;
            self.excess[source] -= amount;
            saturated.push(arc.edge);
            self.mark_active(network, arc.head);
        }

        self.phase = PreflowPhase::Active;
        Ok(StepEvent::Initialized {
            algorithm: self.kind(),
            total_flow: self.excess[network.sink()],
            delta: None,
            source_height: Some(self.heights[source]),
            saturated,
        })
    }

    fn discharge_once(&mut self, network: &mut FlowNetwork, u: NodeIndex) -> Result<StepEvent, FlowError> {
        let hu = self.heights[u];
        let admissible = network.residual_arcs(u).iter().copied().find(|arc| {
            network.residual_capacity(arc) > 0 && self.heights[arc.head] + 1 == hu
        });

        if let Some(arc) = admissible {
            let amount = self.excess[u].min(network.residual_capacity(&arc));
            augment(network, &[arc], amount)?;
            self.excess[u] -= amount;
            self.excess[arc.head] += amount;
            self.mark_active(network, arc.head);
            trace!(from = u, to = arc.head, amount, "push");
            return Ok(StepEvent::Pushed {
                from: network.node_id(u).to_string(),
                to: network.node_id(arc.head).to_string(),
                edge: arc.edge,
                amount,
                remaining_excess: self.excess[u],
                total_flow: self.excess[network.sink()],
            });
        }

        let lowest = network
            .residual_arcs(u)
            .iter()
            .filter(|arc| network.residual_capacity(arc) > 0)
            .map(|arc| self.heights[arc.head])
            .min();
        let Some(lowest) = lowest else {
            warn!(node = network.node_id(u), "active node has no residual arc");
            return Err(FlowError::invariant(format!(
                "active node '{}' holds excess {} but has no outgoing residual arc",
                network.node_id(u),
                self.excess[u],
            )));
        };
        let new_height = lowest + 1;
        if new_height <= hu {
            return Err(FlowError::invariant(format!(
                "relabel of '{}' would lower its height from {hu} to {new_height}",
                network.node_id(u),
            )));
        }
        self.heights[u] = new_height;
        trace!(node = u, old = hu, new = new_height, "relabel");
        Ok(StepEvent::Relabeled {
            node: network.node_id(u).to_string(),
            old_height: hu,
            new_height,
        })
    }
}

impl StepAlgorithm for PreflowPush {
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        match self.phase {
            PreflowPhase::Uninitialized => self.initialize(network),
            PreflowPhase::Active => match self.select(network) {
                Some(u) => self.discharge_once(network, u),
                None => {
                    let total = self.excess[network.sink()];
                    let cut = certify_min_cut(network, total)?;
                    let event = StepEvent::terminated(self.kind(), total, &cut, None);
                    self.cut = Some(cut);
                    self.phase = PreflowPhase::Terminated;
                    Ok(event)
                }
            },
            PreflowPhase::Terminated => Err(FlowError::invariant(
                "preflow-push machine stepped after termination",
            )),
        }
    }

    fn is_terminated(&self) -> bool {
        self.phase == PreflowPhase::Terminated
    }

    fn min_cut(&self) -> Option<&MinCut> {
        self.cut.as_ref()
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::PreflowPush
    }

    fn flow_value(&self, network: &FlowNetwork) -> Capacity {
        match self.phase {
            PreflowPhase::Uninitialized => 0,
            _ => self.excess[network.sink()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_hop() -> FlowNetwork {
        FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge("S", "A", 5)
            .edge("A", "T", 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_initialization_saturates_source_edges() {
        let mut net = two_hop();
        let mut machine = PreflowPush::new(&net, ActiveNodeOrder::LowestIndex);
        let ev = machine.step(&mut net).unwrap();
        match ev {
            StepEvent::Initialized { source_height, saturated, total_flow, .. } => {
                assert_eq!(source_height, Some(3));
                assert_eq!(saturated, vec![0]);
                assert_eq!(total_flow, 0);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(machine.excess(), &[-5, 5, 0]);
        assert_eq!(machine.active_nodes(&net), vec![1]);
    }

    #[test]
    fn test_excess_returns_to_source() {
        let mut net = two_hop();
        let mut machine = PreflowPush::new(&net, ActiveNodeOrder::LowestIndex);
        let mut events = Vec::new();
        while !machine.is_terminated() {
            events.push(machine.step(&mut net).unwrap());
        }
        assert_eq!(net.flow_value(), 3);
        assert_eq!(machine.excess()[net.sink()], 3);
        assert_eq!(machine.excess()[net.source()], -3);
        assert_eq!(machine.heights()[net.source()], 3);
        // A relabels to 1, pushes 3 to T, relabels above S, returns 2.
        assert!(events.iter().any(|e| matches!(
            e,
            StepEvent::Pushed { to, amount: 2, .. } if to == "S"
        )));
    }

    #[test]
    fn test_fifo_and_highest_label_agree_on_value() {
        for order in [ActiveNodeOrder::Fifo, ActiveNodeOrder::HighestLabel] {
            let mut net = two_hop();
            let mut machine = PreflowPush::new(&net, order);
            while !machine.is_terminated() {
                machine.step(&mut net).unwrap();
            }
            assert_eq!(machine.min_cut().unwrap().capacity, 3);
        }
    }
}
