//! Residual-graph queries shared by every state machine and by min-cut
//! extraction.
//!
//! All searches are breadth-first and scan each node's residual arcs in
//! declaration order, so among equal-length paths the first-discovered one
//! wins. Nothing here picks paths by capacity.

use std::collections::{BTreeSet, VecDeque};

use tracing::trace;

use crate::error::FlowError;
use crate::network::FlowNetwork;
use crate::types::{ArcDirection, Capacity, CutEdge, EdgeId, MinCut, NodeIndex, ResidualArc};

/// A source-to-sink path in the residual graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentingPath {
    /// Visited nodes, source first, sink last.
    pub nodes: Vec<NodeIndex>,
    /// Arcs between consecutive nodes.
    pub arcs: Vec<ResidualArc>,
    /// Minimum residual capacity over `arcs`.
    pub bottleneck: Capacity,
}

impl AugmentingPath {
    /// Declared edges along the path, in path order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.arcs.iter().map(|a| a.edge).collect()
    }
}

// ---------------------------------------------------------------------------
// Breadth-first searches
// ---------------------------------------------------------------------------

/// BFS tree over arcs with residual `>= threshold`.
///
/// Returns the arc through which each node was first discovered; the source
/// and unreached nodes map to `None`. The search stops as soon as `stop_at`
/// is discovered.
pub fn bfs_tree(
    network: &FlowNetwork,
    source: NodeIndex,
    threshold: Capacity,
    stop_at: Option<NodeIndex>,
) -> Vec<Option<ResidualArc>> {
    let n = network.node_count();
    let mut parent: Vec<Option<ResidualArc>> = vec![None; n];
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    seen[source] = true;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        for arc in network.residual_arcs(u) {
            if seen[arc.head] || network.residual_capacity(arc) < threshold {
                continue;
            }
            seen[arc.head] = true;
            parent[arc.head] = Some(*arc);
            if Some(arc.head) == stop_at {
                return parent;
            }
            queue.push_back(arc.head);
        }
    }
    parent
}

/// Walk a BFS tree back from `sink` to `source`.
pub fn path_from_tree(
    network: &FlowNetwork,
    tree: &[Option<ResidualArc>],
    source: NodeIndex,
    sink: NodeIndex,
) -> Option<AugmentingPath> {
    let mut arcs = Vec::new();
    let mut v = sink;
    while v != source {
        let arc = tree[v]?;
        arcs.push(arc);
        v = arc.tail;
    }
    arcs.reverse();

    let mut nodes = Vec::with_capacity(arcs.len() + 1);
    nodes.push(source);
    nodes.extend(arcs.iter().map(|a| a.head));
    let bottleneck = bottleneck(network, &arcs);
    Some(AugmentingPath { nodes, arcs, bottleneck })
}

/// Shortest augmenting path over arcs with residual `>= threshold`.
///
/// With `threshold = 1` this is the plain residual search; with
/// `threshold = Δ` it is the Δ-residual search of capacity scaling.
pub fn shortest_path_with_threshold(
    network: &FlowNetwork,
    source: NodeIndex,
    sink: NodeIndex,
    threshold: Capacity,
) -> Option<AugmentingPath> {
    let tree = bfs_tree(network, source, threshold.max(1), Some(sink));
    let path = path_from_tree(network, &tree, source, sink);
    trace!(
        threshold,
        found = path.is_some(),
        hops = path.as_ref().map_or(0, |p| p.arcs.len()),
        "residual path search"
    );
    path
}

/// Shortest augmenting path over positive-residual arcs, or `None` if the
/// sink is unreachable.
pub fn shortest_augmenting_path(
    network: &FlowNetwork,
    source: NodeIndex,
    sink: NodeIndex,
) -> Option<AugmentingPath> {
    shortest_path_with_threshold(network, source, sink, 1)
}

/// Membership mask of nodes reachable from `source` over positive-residual
/// arcs. The source is always reachable.
pub fn reachable_mask(network: &FlowNetwork, source: NodeIndex) -> Vec<bool> {
    let tree = bfs_tree(network, source, 1, None);
    let mut mask: Vec<bool> = tree.iter().map(Option::is_some).collect();
    mask[source] = true;
    mask
}

/// Nodes reachable from `source` over positive-residual arcs.
pub fn reachable_set(network: &FlowNetwork, source: NodeIndex) -> BTreeSet<NodeIndex> {
    reachable_mask(network, source)
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| r.then_some(i))
        .collect()
}

/// BFS distance from `source` over positive-residual arcs; `None` for
/// unreached nodes.
pub fn level_graph(network: &FlowNetwork, source: NodeIndex) -> Vec<Option<usize>> {
    let mut level: Vec<Option<usize>> = vec![None; network.node_count()];
    let mut queue = VecDeque::new();
    level[source] = Some(0);
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        let next = level[u].map(|l| l + 1);
        for arc in network.residual_arcs(u) {
            if level[arc.head].is_none() && network.residual_capacity(arc) > 0 {
                level[arc.head] = next;
                queue.push_back(arc.head);
            }
        }
    }
    level
}

// ---------------------------------------------------------------------------
// Augmentation
// ---------------------------------------------------------------------------

/// Minimum residual capacity over `arcs` (0 for an empty slice).
pub fn bottleneck(network: &FlowNetwork, arcs: &[ResidualArc]) -> Capacity {
    arcs.iter()
        .map(|a| network.residual_capacity(a))
        .min()
        .unwrap_or(0)
}

/// Send `amount` units along `arcs`.
///
/// A forward arc raises the flow of its edge, a backward arc lowers it. The
/// whole path is checked before anything is written, so on error the network
/// is untouched.
///
/// # Errors
///
/// [`FlowError::InvariantViolation`] if `amount` is not positive or exceeds
/// the residual capacity of any arc.
pub fn augment(
    network: &mut FlowNetwork,
    arcs: &[ResidualArc],
    amount: Capacity,
) -> Result<(), FlowError> {
    if amount <= 0 {
        return Err(FlowError::invariant(format!(
            "augmentation amount must be positive, got {amount}"
        )));
    }
    for arc in arcs {
        let residual = network.residual_capacity(arc);
        if residual < amount {
            return Err(FlowError::invariant(format!(
                "arc {} -> {} on edge {} has residual {residual} < {amount}",
                network.node_id(arc.tail),
                network.node_id(arc.head),
                arc.edge,
            )));
        }
    }
    for arc in arcs {
        match arc.direction {
            ArcDirection::Forward => network.add_flow(arc.edge, amount),
            ArcDirection::Backward => network.add_flow(arc.edge, -amount),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Min-cut
// ---------------------------------------------------------------------------

/// Edges with positive capacity leaving the set reachable from `source`.
pub fn extract_min_cut(network: &FlowNetwork, source: NodeIndex) -> MinCut {
    let reach = reachable_mask(network, source);
    let edges: Vec<CutEdge> = network
        .edges()
        .iter()
        .filter(|e| e.capacity > 0 && reach[e.from] && !reach[e.to])
        .map(|e| CutEdge {
            edge: e.id,
            from: network.node_id(e.from).to_string(),
            to: network.node_id(e.to).to_string(),
            capacity: e.capacity,
        })
        .collect();
    let capacity = edges.iter().map(|e| e.capacity).sum();
    let source_side = reach
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r)
        .map(|(i, _)| network.node_id(i).to_string())
        .collect();
    MinCut { source_side, edges, capacity }
}

/// Extract the min-cut of a terminated run and cross-check it.
///
/// # Errors
///
/// [`FlowError::InvariantViolation`] if the sink is still reachable or the
/// cut capacity differs from `flow_value`.
pub fn certify_min_cut(network: &FlowNetwork, flow_value: Capacity) -> Result<MinCut, FlowError> {
    let cut = extract_min_cut(network, network.source());
    if cut.contains(network.node_id(network.sink())) {
        return Err(FlowError::invariant(
            "terminated while the sink is still reachable in the residual graph",
        ));
    }
    if cut.capacity != flow_value {
        return Err(FlowError::invariant(format!(
            "min-cut capacity {} differs from flow value {flow_value}",
            cut.capacity
        )));
    }
    Ok(cut)
}
