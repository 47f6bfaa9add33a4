//! Core value types shared by the network, the residual queries and the
//! algorithm state machines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capacities, flows, excess and scaling thresholds.
///
/// Integer so that every termination and cut check is an exact comparison.
pub type Capacity = i64;

/// Per-unit edge cost, used only by the min-cost variant.
pub type Cost = i64;

/// Dense node index into a [`FlowNetwork`](crate::network::FlowNetwork).
pub type NodeIndex = usize;

/// Stable edge identifier: the edge's declaration index.
pub type EdgeId = usize;

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

/// Role of a node in an s-t network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The unique source.
    Source,
    /// The unique sink.
    Sink,
    /// Any other node.
    Interior,
}

/// A node of the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Caller-supplied identifier, unique within the network.
    pub id: String,
    /// Source, sink or interior.
    pub role: NodeRole,
}

/// A directed capacitated edge.
///
/// `0 <= flow <= capacity` holds at every observable point of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Declaration index.
    pub id: EdgeId,
    /// Tail node.
    pub from: NodeIndex,
    /// Head node.
    pub to: NodeIndex,
    /// Fixed capacity.
    pub capacity: Capacity,
    /// Current flow.
    pub flow: Capacity,
    /// Optional per-unit cost.
    pub cost: Option<Cost>,
}

impl Edge {
    /// Remaining forward capacity, `capacity - flow`.
    #[inline]
    pub fn residual(&self) -> Capacity {
        self.capacity - self.flow
    }

    /// Whether the edge carries as much flow as it can.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.flow == self.capacity
    }
}

// ---------------------------------------------------------------------------
// Residual arcs
// ---------------------------------------------------------------------------

/// Which way a residual arc runs relative to its declared edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcDirection {
    /// Along the edge; residual is `capacity - flow`, use increases flow.
    Forward,
    /// Against the edge; residual is `flow`, use cancels flow.
    Backward,
}

/// One arc of the residual graph.
///
/// Every arc belongs to exactly one declared edge, so two anti-parallel edges
/// `(u, v)` and `(v, u)` keep separate arcs and separate flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidualArc {
    /// Declared edge this arc belongs to.
    pub edge: EdgeId,
    /// Node the arc leaves.
    pub tail: NodeIndex,
    /// Node the arc enters.
    pub head: NodeIndex,
    /// Forward or backward.
    pub direction: ArcDirection,
}

// ---------------------------------------------------------------------------
// AlgorithmKind
// ---------------------------------------------------------------------------

/// Selector for the algorithm bound to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    /// Ford-Fulkerson with BFS path selection (Edmonds-Karp).
    AugmentingPath,
    /// Dinic's level-graph blocking flow.
    BlockingFlow,
    /// Generic push-relabel.
    PreflowPush,
    /// Δ-scaling augmenting paths.
    CapacityScaling,
    /// Successive shortest paths by edge cost.
    MinCostAugmentingPath,
}

impl AlgorithmKind {
    /// Every selectable algorithm.
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::AugmentingPath,
        AlgorithmKind::BlockingFlow,
        AlgorithmKind::PreflowPush,
        AlgorithmKind::CapacityScaling,
        AlgorithmKind::MinCostAugmentingPath,
    ];

    /// Kebab-case name used in logs and serialized events.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::AugmentingPath => "augmenting-path",
            AlgorithmKind::BlockingFlow => "blocking-flow",
            AlgorithmKind::PreflowPush => "preflow-push",
            AlgorithmKind::CapacityScaling => "capacity-scaling",
            AlgorithmKind::MinCostAugmentingPath => "min-cost-augmenting-path",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "augmenting-path" | "edmonds-karp" | "ford-fulkerson" => {
                Ok(AlgorithmKind::AugmentingPath)
            }
            "blocking-flow" | "dinic" => Ok(AlgorithmKind::BlockingFlow),
            "preflow-push" | "push-relabel" => Ok(AlgorithmKind::PreflowPush),
            "capacity-scaling" | "scaling" => Ok(AlgorithmKind::CapacityScaling),
            "min-cost-augmenting-path" | "min-cost" => {
                Ok(AlgorithmKind::MinCostAugmentingPath)
            }
            other => Err(format!("unknown algorithm '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Min-cut
// ---------------------------------------------------------------------------

/// One edge crossing a minimum cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEdge {
    /// Declared edge.
    pub edge: EdgeId,
    /// Tail identifier (source side).
    pub from: String,
    /// Head identifier (sink side).
    pub to: String,
    /// Edge capacity; saturated at termination.
    pub capacity: Capacity,
}

/// A minimum s-t cut extracted from a terminated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinCut {
    /// Node identifiers reachable from the source in the final residual
    /// graph, in node index order.
    pub source_side: Vec<String>,
    /// Edges from the source side to the sink side with positive capacity,
    /// in declaration order.
    pub edges: Vec<CutEdge>,
    /// Sum of the capacities of `edges`.
    pub capacity: Capacity,
}

impl MinCut {
    /// Whether `id` lies on the source side of the cut.
    pub fn contains(&self, id: &str) -> bool {
        self.source_side.iter().any(|n| n == id)
    }

    /// Edge identifiers of the cut, in declaration order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|e| e.edge).collect()
    }
}
