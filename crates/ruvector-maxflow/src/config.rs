//! Run configuration.

use serde::{Deserialize, Serialize};

/// Order in which preflow-push picks the next active node.
///
/// Every order is deterministic, so replaying a run reproduces its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveNodeOrder {
    /// Lowest node index with positive excess.
    #[default]
    LowestIndex,
    /// First-in first-out: nodes are processed in the order they became
    /// active, and a node keeps the front until it is discharged.
    Fifo,
    /// Highest height first; ties go to the lowest index.
    HighestLabel,
}

/// Per-run settings.
///
/// # Example
///
/// ```rust
/// use ruvector_maxflow::config::{ActiveNodeOrder, RunConfig};
///
/// let config = RunConfig {
///     active_node_order: ActiveNodeOrder::Fifo,
///     ..Default::default()
/// };
/// assert!(config.check_invariants);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Verify capacity bounds, conservation (or the preflow condition) and
    /// flow monotonicity after every step.
    ///
    /// Default: `true`.
    pub check_invariants: bool,

    /// Active-node selection for preflow-push.
    ///
    /// Default: [`ActiveNodeOrder::LowestIndex`].
    pub active_node_order: ActiveNodeOrder,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            check_invariants: true,
            active_node_order: ActiveNodeOrder::default(),
        }
    }
}
