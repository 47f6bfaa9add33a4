//! Input validation and flow invariant checks.
//!
//! [`validate_network`] runs eagerly when a network is built and again when
//! a run is created, so malformed instances fail with a [`GraphError`] before
//! any algorithm touches them. The `check_*` functions verify the flow
//! invariants of a network mid-run; the run controller calls them after every
//! step and external harnesses may call them directly.
//!
//! # Limits
//!
//! | Resource | Limit       | Constant      |
//! |----------|-------------|---------------|
//! | Nodes    | 1,000,000   | [`MAX_NODES`] |
//! | Edges    | 10,000,000  | [`MAX_EDGES`] |

use crate::error::{FlowError, GraphError};
use crate::network::FlowNetwork;
use crate::types::{Capacity, Cost};

/// Maximum number of nodes in one network.
pub const MAX_NODES: usize = 1_000_000;

/// Maximum number of declared edges in one network.
pub const MAX_EDGES: usize = 10_000_000;

// ---------------------------------------------------------------------------
// Structural validation
// ---------------------------------------------------------------------------

/// Validate the structure and capacities of a network.
///
/// Checks, in order:
///
/// 1. node and edge counts are within [`MAX_NODES`] / [`MAX_EDGES`];
/// 2. source and sink are distinct;
/// 3. no edge has a negative capacity;
/// 4. every flow lies in `[0, capacity]`;
/// 5. the sum of all capacities fits in [`Capacity`];
/// 6. both `node_count * |cost|` for every edge and the sum of
///    `capacity * |cost|` over all edges fit in [`Cost`]. The first bounds
///    any path cost a search can build, the second any flow cost.
///
/// # Errors
///
/// Returns the first [`GraphError`] found.
pub fn validate_network(network: &FlowNetwork) -> Result<(), GraphError> {
    if network.node_count() > MAX_NODES {
        return Err(GraphError::TooLarge {
            what: "nodes",
            actual: network.node_count(),
            limit: MAX_NODES,
        });
    }
    if network.edge_count() > MAX_EDGES {
        return Err(GraphError::TooLarge {
            what: "edges",
            actual: network.edge_count(),
            limit: MAX_EDGES,
        });
    }
    if network.source() == network.sink() {
        return Err(GraphError::SourceIsSink(
            network.node_id(network.source()).to_string(),
        ));
    }

    let mut total: Capacity = 0;
    let mut cost_weight: Cost = 0;
    let nodes = Cost::try_from(network.node_count()).unwrap_or(Cost::MAX);
    for edge in network.edges() {
        if edge.capacity < 0 {
            return Err(GraphError::NegativeCapacity {
                edge: edge.id,
                from: network.node_id(edge.from).to_string(),
                to: network.node_id(edge.to).to_string(),
                capacity: edge.capacity,
            });
        }
        if edge.flow < 0 || edge.flow > edge.capacity {
            return Err(GraphError::FlowOutOfBounds {
                edge: edge.id,
                flow: edge.flow,
                capacity: edge.capacity,
            });
        }
        total = total
            .checked_add(edge.capacity)
            .ok_or(GraphError::CapacityOverflow)?;

        let Some(cost) = edge.cost else { continue };
        let overflow = GraphError::CostOverflow { edge: edge.id, cost };
        let magnitude = cost.checked_abs().ok_or_else(|| overflow.clone())?;
        magnitude.checked_mul(nodes).ok_or_else(|| overflow.clone())?;
        cost_weight = magnitude
            .checked_mul(edge.capacity)
            .and_then(|w| cost_weight.checked_add(w))
            .ok_or(overflow)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Flow invariants
// ---------------------------------------------------------------------------

/// Every edge satisfies `0 <= flow <= capacity`.
pub fn check_capacity_bounds(network: &FlowNetwork) -> Result<(), FlowError> {
    for edge in network.edges() {
        if edge.flow < 0 || edge.flow > edge.capacity {
            return Err(FlowError::invariant(format!(
                "edge {} ({} -> {}) carries flow {} outside [0, {}]",
                edge.id,
                network.node_id(edge.from),
                network.node_id(edge.to),
                edge.flow,
                edge.capacity,
            )));
        }
    }
    Ok(())
}

/// Inflow equals outflow at every node other than source and sink, and the
/// source's net outflow equals the sink's net inflow.
pub fn check_conservation(network: &FlowNetwork) -> Result<(), FlowError> {
    for node in 0..network.node_count() {
        if node == network.source() || node == network.sink() {
            continue;
        }
        let excess = network.excess(node);
        if excess != 0 {
            return Err(FlowError::invariant(format!(
                "flow not conserved at '{}': inflow - outflow = {excess}",
                network.node_id(node),
            )));
        }
    }
    let (out, into) = (network.flow_value(), network.sink_inflow());
    if out != into {
        return Err(FlowError::invariant(format!(
            "source emits {out} but sink absorbs {into}"
        )));
    }
    Ok(())
}

/// Preflow condition: `excess(v) >= 0` for every node other than the source.
pub fn check_preflow(network: &FlowNetwork) -> Result<(), FlowError> {
    for node in 0..network.node_count() {
        if node == network.source() {
            continue;
        }
        let excess = network.excess(node);
        if excess < 0 {
            return Err(FlowError::invariant(format!(
                "negative excess {excess} at '{}'",
                network.node_id(node),
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> FlowNetwork {
        FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge("S", "A", 5)
            .edge("A", "T", 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge("S", "T", -1)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidGraph(GraphError::NegativeCapacity { capacity: -1, .. })
        ));
    }

    #[test]
    fn test_flow_above_capacity_rejected() {
        let err = FlowNetwork::from_json(
            r#"{"edges":[{"u":"S","v":"T","capacity":2,"flow":3}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidGraph(GraphError::FlowOutOfBounds { flow: 3, capacity: 2, .. })
        ));
    }

    #[test]
    fn test_capacity_overflow_rejected() {
        let err = FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge("S", "T", Capacity::MAX)
            .edge("S", "T", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidGraph(GraphError::CapacityOverflow)));
    }

    #[test]
    fn test_cost_overflow_rejected() {
        let err = FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge_with_cost("S", "T", 4, Cost::MAX / 2)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidGraph(GraphError::CostOverflow { edge: 0, .. })
        ));

        let err = FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge_with_cost("S", "T", 0, Cost::MIN)
            .build()
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidGraph(GraphError::CostOverflow { .. })));
    }

    #[test]
    fn test_large_costs_within_bounds_accepted() {
        let net = FlowNetwork::builder()
            .source("S")
            .sink("T")
            .edge_with_cost("S", "A", 2, 1 << 40)
            .edge_with_cost("A", "T", 2, -(1 << 40))
            .build();
        assert!(net.is_ok());
    }

    #[test]
    fn test_conservation_detects_imbalance() {
        let mut net = line();
        assert!(check_conservation(&net).is_ok());
        net.add_flow(0, 2);
        assert!(check_conservation(&net).is_err());
        assert!(check_preflow(&net).is_ok());
        net.add_flow(1, 2);
        assert!(check_conservation(&net).is_ok());
    }

    #[test]
    fn test_capacity_bounds_detects_overflowing_edge() {
        let mut net = line();
        net.add_flow(1, 4);
        let err = check_capacity_bounds(&net).unwrap_err();
        assert!(err.to_string().contains("outside [0, 3]"));
        assert!(check_preflow(&net).is_err());
    }
}
