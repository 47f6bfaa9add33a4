//! Step events.
//!
//! Every call to [`FlowRun::step`](crate::run::FlowRun::step) returns exactly
//! one [`StepEvent`] describing the atomic action just performed. Events carry
//! node identifiers rather than indices so an observer can highlight them
//! without consulting the network.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AlgorithmKind, Capacity, Cost, EdgeId, MinCut};

/// One observable algorithmic action.
///
/// Tagged with `#[serde(tag = "type")]` so events serialise as
/// `{ "type": "PathAugmented", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepEvent {
    /// A machine with an explicit setup phase finished it.
    Initialized {
        /// Algorithm that was initialised.
        algorithm: AlgorithmKind,
        /// Flow value right after initialisation.
        total_flow: Capacity,
        /// Initial scaling threshold (capacity scaling).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delta: Option<Capacity>,
        /// Initial source height (preflow-push).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_height: Option<usize>,
        /// Edges saturated out of the source (preflow-push).
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        saturated: Vec<EdgeId>,
    },

    /// Flow was sent along a whole source-to-sink path.
    PathAugmented {
        /// Node identifiers, source first.
        path: Vec<String>,
        /// Edges used, in path order.
        edges: Vec<EdgeId>,
        /// Amount sent.
        bottleneck: Capacity,
        /// Flow value after the augmentation.
        total_flow: Capacity,
        /// Threshold in force (capacity scaling).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delta: Option<Capacity>,
        /// Per-unit cost of the path (min-cost variant).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit_cost: Option<Cost>,
    },

    /// A fresh level graph was built.
    PhaseBuilt {
        /// Phase number, starting at 1.
        phase: usize,
        /// Level of the sink.
        sink_level: usize,
        /// Number of nodes that received a level.
        levelled: usize,
    },

    /// One blocking-flow path was found inside the current level graph.
    BlockingUnitFound {
        /// Current phase.
        phase: usize,
        /// Node identifiers, source first.
        path: Vec<String>,
        /// Edges used, in path order.
        edges: Vec<EdgeId>,
        /// Amount sent.
        amount: Capacity,
        /// Flow value after the push.
        total_flow: Capacity,
    },

    /// The current level graph holds no further admissible path.
    PhaseExhausted {
        /// Phase that ended.
        phase: usize,
        /// Flow value at the end of the phase.
        total_flow: Capacity,
    },

    /// Excess was pushed across one residual arc.
    Pushed {
        /// Node the excess left.
        from: String,
        /// Node the excess entered.
        to: String,
        /// Edge whose flow changed.
        edge: EdgeId,
        /// Amount pushed.
        amount: Capacity,
        /// Excess left at `from`.
        remaining_excess: Capacity,
        /// Excess at the sink after the push.
        total_flow: Capacity,
    },

    /// A node was lifted.
    Relabeled {
        /// Relabelled node.
        node: String,
        /// Height before.
        old_height: usize,
        /// Height after.
        new_height: usize,
    },

    /// No Δ-path remained; Δ was halved.
    ThresholdReduced {
        /// Threshold before halving.
        previous_delta: Capacity,
        /// Threshold after halving.
        delta: Capacity,
    },

    /// The run finished; the flow is maximum.
    Terminated {
        /// Algorithm that finished.
        algorithm: AlgorithmKind,
        /// Maximum flow value.
        total_flow: Capacity,
        /// Capacity of the extracted min-cut (equal to `total_flow`).
        cut_capacity: Capacity,
        /// Edges of the min-cut.
        cut_edges: Vec<EdgeId>,
        /// Total cost of the final flow (min-cost variant).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_cost: Option<Cost>,
    },
}

impl StepEvent {
    pub(crate) fn terminated(
        algorithm: AlgorithmKind,
        total_flow: Capacity,
        cut: &MinCut,
        total_cost: Option<Cost>,
    ) -> Self {
        StepEvent::Terminated {
            algorithm,
            total_flow,
            cut_capacity: cut.capacity,
            cut_edges: cut.edge_ids(),
            total_cost,
        }
    }

    /// Field-less discriminant of this event.
    pub fn kind(&self) -> StepEventKind {
        match self {
            StepEvent::Initialized { .. } => StepEventKind::Initialized,
            StepEvent::PathAugmented { .. } => StepEventKind::PathAugmented,
            StepEvent::PhaseBuilt { .. } => StepEventKind::PhaseBuilt,
            StepEvent::BlockingUnitFound { .. } => StepEventKind::BlockingUnitFound,
            StepEvent::PhaseExhausted { .. } => StepEventKind::PhaseExhausted,
            StepEvent::Pushed { .. } => StepEventKind::Pushed,
            StepEvent::Relabeled { .. } => StepEventKind::Relabeled,
            StepEvent::ThresholdReduced { .. } => StepEventKind::ThresholdReduced,
            StepEvent::Terminated { .. } => StepEventKind::Terminated,
        }
    }

    /// Flow value reported by the event, if it carries one.
    pub fn total_flow(&self) -> Option<Capacity> {
        match self {
            StepEvent::Initialized { total_flow, .. }
            | StepEvent::PathAugmented { total_flow, .. }
            | StepEvent::BlockingUnitFound { total_flow, .. }
            | StepEvent::PhaseExhausted { total_flow, .. }
            | StepEvent::Pushed { total_flow, .. }
            | StepEvent::Terminated { total_flow, .. } => Some(*total_flow),
            _ => None,
        }
    }

    /// Whether this is the final event of a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepEvent::Terminated { .. })
    }
}

/// Discriminant of a [`StepEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepEventKind {
    /// See [`StepEvent::Initialized`].
    Initialized,
    /// See [`StepEvent::PathAugmented`].
    PathAugmented,
    /// See [`StepEvent::PhaseBuilt`].
    PhaseBuilt,
    /// See [`StepEvent::BlockingUnitFound`].
    BlockingUnitFound,
    /// See [`StepEvent::PhaseExhausted`].
    PhaseExhausted,
    /// See [`StepEvent::Pushed`].
    Pushed,
    /// See [`StepEvent::Relabeled`].
    Relabeled,
    /// See [`StepEvent::ThresholdReduced`].
    ThresholdReduced,
    /// See [`StepEvent::Terminated`].
    Terminated,
}

impl fmt::Display for StepEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepEventKind::Initialized => "initialized",
            StepEventKind::PathAugmented => "path-augmented",
            StepEventKind::PhaseBuilt => "phase-built",
            StepEventKind::BlockingUnitFound => "blocking-unit-found",
            StepEventKind::PhaseExhausted => "phase-exhausted",
            StepEventKind::Pushed => "pushed",
            StepEventKind::Relabeled => "relabeled",
            StepEventKind::ThresholdReduced => "threshold-reduced",
            StepEventKind::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
