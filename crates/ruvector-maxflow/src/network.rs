//! Flow network: nodes, declared edges with current flows, and the residual
//! adjacency derived from them.
//!
//! Topology and capacities are fixed once a network is built; only edge flows
//! change during a run, and only through [`crate::residual::augment`].
//!
//! # Residual adjacency
//!
//! Each declared edge `e = (u, v)` yields a forward arc `u -> v` (residual
//! `capacity - flow`) in `u`'s list and a backward arc `v -> u` (residual
//! `flow`) in `v`'s list. Lists are filled in declaration order, which makes
//! declaration order the tie-break of every search.
//!
//! # Example
//!
//! ```rust
//! use ruvector_maxflow::network::FlowNetwork;
//!
//! let net = FlowNetwork::builder()
//!     .source("S")
//!     .sink("T")
//!     .edge("S", "A", 4)
//!     .edge("A", "T", 3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(net.node_count(), 3);
//! assert_eq!(net.max_capacity(), 4);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, GraphError};
use crate::types::{
    ArcDirection, Capacity, Cost, Edge, EdgeId, Node, NodeIndex, NodeRole, ResidualArc,
};
use crate::validation::validate_network;

// ---------------------------------------------------------------------------
// FlowNetwork
// ---------------------------------------------------------------------------

/// A directed capacitated s-t network with current flows.
///
/// Cloning copies the edges and their flows; the node table and residual
/// adjacency are shared.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    topology: Arc<Topology>,
    edges: Vec<Edge>,
}

/// The part of a network that never changes after it is built.
#[derive(Debug)]
struct Topology {
    nodes: Vec<Node>,
    index: HashMap<String, NodeIndex>,
    source: NodeIndex,
    sink: NodeIndex,
    adjacency: Vec<Vec<ResidualArc>>,
}

impl FlowNetwork {
    /// Start building a network.
    pub fn builder() -> FlowNetworkBuilder {
        FlowNetworkBuilder::new()
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.topology.nodes.len()
    }

    /// Number of declared edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Source node index.
    #[inline]
    pub fn source(&self) -> NodeIndex {
        self.topology.source
    }

    /// Sink node index.
    #[inline]
    pub fn sink(&self) -> NodeIndex {
        self.topology.sink
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.topology.nodes
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge by identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Identifier of the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn node_id(&self, index: NodeIndex) -> &str {
        &self.topology.nodes[index].id
    }

    /// Index of the node named `id`.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.topology.index.get(id).copied()
    }

    /// Identifiers for a sequence of node indices.
    pub fn path_ids(&self, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|&n| self.topology.nodes[n].id.clone()).collect()
    }

    /// Residual arcs leaving `node`, in declaration order.
    #[inline]
    pub fn residual_arcs(&self, node: NodeIndex) -> &[ResidualArc] {
        &self.topology.adjacency[node]
    }

    /// Current residual capacity of `arc`.
    #[inline]
    pub fn residual_capacity(&self, arc: &ResidualArc) -> Capacity {
        let edge = &self.edges[arc.edge];
        match arc.direction {
            ArcDirection::Forward => edge.capacity - edge.flow,
            ArcDirection::Backward => edge.flow,
        }
    }

    /// Per-unit cost of travelling `arc` (backward arcs refund the cost).
    #[inline]
    pub fn arc_cost(&self, arc: &ResidualArc) -> Cost {
        let cost = self.edges[arc.edge].cost.unwrap_or(0);
        match arc.direction {
            ArcDirection::Forward => cost,
            ArcDirection::Backward => -cost,
        }
    }

    /// Sum of flow on edges leaving `node` (self-loops excluded).
    pub fn outflow(&self, node: NodeIndex) -> Capacity {
        self.topology.adjacency[node]
            .iter()
            .filter(|a| a.direction == ArcDirection::Forward)
            .map(|a| self.edges[a.edge].flow)
            .sum()
    }

    /// Sum of flow on edges entering `node` (self-loops excluded).
    pub fn inflow(&self, node: NodeIndex) -> Capacity {
        self.topology.adjacency[node]
            .iter()
            .filter(|a| a.direction == ArcDirection::Backward)
            .map(|a| self.edges[a.edge].flow)
            .sum()
    }

    /// Inflow minus outflow at `node`.
    pub fn excess(&self, node: NodeIndex) -> Capacity {
        self.inflow(node) - self.outflow(node)
    }

    /// Net flow leaving the source: the value of the current flow.
    pub fn flow_value(&self) -> Capacity {
        self.outflow(self.source()) - self.inflow(self.source())
    }

    /// Net flow entering the sink.
    pub fn sink_inflow(&self) -> Capacity {
        self.inflow(self.sink()) - self.outflow(self.sink())
    }

    /// Largest declared capacity, or 0 for an edgeless network.
    pub fn max_capacity(&self) -> Capacity {
        self.edges.iter().map(|e| e.capacity).max().unwrap_or(0)
    }

    /// Whether any edge declares a cost.
    pub fn has_costs(&self) -> bool {
        self.edges.iter().any(|e| e.cost.is_some())
    }

    /// Total cost of the current flow.
    pub fn flow_cost(&self) -> Cost {
        self.edges
            .iter()
            .map(|e| e.flow * e.cost.unwrap_or(0))
            .sum()
    }

    /// Copy of this network with every flow reset to zero.
    pub fn with_zero_flow(&self) -> Self {
        let mut net = self.clone();
        for edge in &mut net.edges {
            edge.flow = 0;
        }
        net
    }

    pub(crate) fn add_flow(&mut self, edge: EdgeId, delta: Capacity) {
        self.edges[edge].flow += delta;
    }

    // -----------------------------------------------------------------------
    // NetworkSpec conversion
    // -----------------------------------------------------------------------

    /// Build a network from its serializable description.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Self, FlowError> {
        let mut builder = FlowNetworkBuilder::new()
            .source(spec.source.clone())
            .sink(spec.sink.clone());
        for id in &spec.nodes {
            builder = builder.node(id.clone());
        }
        for e in &spec.edges {
            builder.push_edge(e.clone());
        }
        builder.build()
    }

    /// Parse a JSON network description.
    ///
    /// ```rust
    /// use ruvector_maxflow::network::FlowNetwork;
    ///
    /// let net = FlowNetwork::from_json(r#"{
    ///     "edges": [ {"u": "S", "v": "T", "capacity": 5} ]
    /// }"#).unwrap();
    /// assert_eq!(net.node_id(net.source()), "S");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let spec: NetworkSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }

    /// Serializable description of this network, including current flows.
    pub fn to_spec(&self) -> NetworkSpec {
        NetworkSpec {
            nodes: self.topology.nodes.iter().map(|n| n.id.clone()).collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeSpec {
                    u: self.topology.nodes[e.from].id.clone(),
                    v: self.topology.nodes[e.to].id.clone(),
                    capacity: e.capacity,
                    cost: e.cost,
                    flow: e.flow,
                })
                .collect(),
            source: self.topology.nodes[self.topology.source].id.clone(),
            sink: self.topology.nodes[self.topology.sink].id.clone(),
        }
    }

    /// JSON form of [`to_spec`](Self::to_spec).
    pub fn to_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string(&self.to_spec())?)
    }
}

// ---------------------------------------------------------------------------
// NetworkSpec
// ---------------------------------------------------------------------------

/// Serializable network description.
///
/// `source` and `sink` default to `"S"` and `"T"`; `nodes` may be omitted
/// when every node appears in some edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Node identifiers declared up front (fixes their index order).
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Edges in declaration order.
    pub edges: Vec<EdgeSpec>,
    /// Source identifier.
    #[serde(default = "default_source")]
    pub source: String,
    /// Sink identifier.
    #[serde(default = "default_sink")]
    pub sink: String,
}

/// One edge of a [`NetworkSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Tail identifier.
    pub u: String,
    /// Head identifier.
    pub v: String,
    /// Capacity.
    pub capacity: Capacity,
    /// Optional per-unit cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    /// Initial flow; validated but discarded when a run is created.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flow: Capacity,
}

fn default_source() -> String {
    "S".to_string()
}

fn default_sink() -> String {
    "T".to_string()
}

fn is_zero(v: &Capacity) -> bool {
    *v == 0
}

// ---------------------------------------------------------------------------
// FlowNetworkBuilder
// ---------------------------------------------------------------------------

/// Builder for [`FlowNetwork`].
///
/// Nodes are indexed in order of first mention. Designating a second,
/// different source or sink is reported by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct FlowNetworkBuilder {
    nodes: Vec<String>,
    edges: Vec<EdgeSpec>,
    sources: Vec<String>,
    sinks: Vec<String>,
}

impl FlowNetworkBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node.
    pub fn node(mut self, id: impl Into<String>) -> Self {
        self.nodes.push(id.into());
        self
    }

    /// Designate the source.
    pub fn source(mut self, id: impl Into<String>) -> Self {
        self.sources.push(id.into());
        self
    }

    /// Designate the sink.
    pub fn sink(mut self, id: impl Into<String>) -> Self {
        self.sinks.push(id.into());
        self
    }

    /// Add a directed edge.
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>, capacity: Capacity) -> Self {
        self.push_edge(EdgeSpec {
            u: from.into(),
            v: to.into(),
            capacity,
            cost: None,
            flow: 0,
        });
        self
    }

    /// Add a directed edge with a per-unit cost.
    pub fn edge_with_cost(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        capacity: Capacity,
        cost: Cost,
    ) -> Self {
        self.push_edge(EdgeSpec {
            u: from.into(),
            v: to.into(),
            capacity,
            cost: Some(cost),
            flow: 0,
        });
        self
    }

    /// Add several `(from, to, capacity)` edges.
    pub fn with_edges<I, S>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S, Capacity)>,
        S: Into<String>,
    {
        for (u, v, c) in edges {
            self = self.edge(u, v, c);
        }
        self
    }

    fn push_edge(&mut self, spec: EdgeSpec) {
        self.edges.push(spec);
    }

    /// Resolve designations, index nodes, derive the residual adjacency and
    /// validate the result.
    pub fn build(self) -> Result<FlowNetwork, FlowError> {
        let source_id = single_designation(self.sources, GraphError::MissingSource, |first, second| {
            GraphError::DuplicateSource { first, second }
        })?;
        let sink_id = single_designation(self.sinks, GraphError::MissingSink, |first, second| {
            GraphError::DuplicateSink { first, second }
        })?;
        if source_id == sink_id {
            return Err(GraphError::SourceIsSink(source_id).into());
        }

        let mut index: HashMap<String, NodeIndex> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut intern = |id: &str, nodes: &mut Vec<Node>| -> NodeIndex {
            if let Some(&i) = index.get(id) {
                return i;
            }
            let i = nodes.len();
            index.insert(id.to_string(), i);
            nodes.push(Node { id: id.to_string(), role: NodeRole::Interior });
            i
        };

        for id in &self.nodes {
            intern(id, &mut nodes);
        }
        let mut edges = Vec::with_capacity(self.edges.len());
        for (id, spec) in self.edges.iter().enumerate() {
            let from = intern(&spec.u, &mut nodes);
            let to = intern(&spec.v, &mut nodes);
            edges.push(Edge {
                id,
                from,
                to,
                capacity: spec.capacity,
                flow: spec.flow,
                cost: spec.cost,
            });
        }

        let source = *index
            .get(&source_id)
            .ok_or_else(|| GraphError::UnknownNode(source_id.clone()))?;
        let sink = *index
            .get(&sink_id)
            .ok_or_else(|| GraphError::UnknownNode(sink_id.clone()))?;
        nodes[source].role = NodeRole::Source;
        nodes[sink].role = NodeRole::Sink;

        let mut adjacency: Vec<Vec<ResidualArc>> = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            if edge.from == edge.to {
                continue;
            }
            adjacency[edge.from].push(ResidualArc {
                edge: edge.id,
                tail: edge.from,
                head: edge.to,
                direction: ArcDirection::Forward,
            });
            adjacency[edge.to].push(ResidualArc {
                edge: edge.id,
                tail: edge.to,
                head: edge.from,
                direction: ArcDirection::Backward,
            });
        }

        let topology = Topology { nodes, index, source, sink, adjacency };
        let network = FlowNetwork { topology: Arc::new(topology), edges };
        validate_network(&network)?;
        Ok(network)
    }
}

fn single_designation(
    ids: Vec<String>,
    missing: GraphError,
    duplicate: impl Fn(String, String) -> GraphError,
) -> Result<String, GraphError> {
    let mut iter = ids.into_iter();
    let first = iter.next().ok_or(missing)?;
    for other in iter {
        if other != first {
            return Err(duplicate(first, other));
        }
    }
    Ok(first)
}
