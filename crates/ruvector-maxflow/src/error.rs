//! Error types for the max-flow engine.
//!
//! Three families of failure exist and none of them is retryable:
//!
//! - [`GraphError`]: the supplied instance is malformed. Raised eagerly when a
//!   network is built or a run is created.
//! - [`FlowError::RunAlreadyTerminated`]: the caller stepped a finished run.
//! - [`FlowError::InvariantViolation`]: a flow invariant broke mid-run. This
//!   points at a malformed instance or an engine bug and is never corrected
//!   silently.

use crate::types::{Capacity, Cost, EdgeId};

/// Result type for max-flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Primary error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The network failed validation.
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphError),

    /// `step` was called on a run that already reached termination.
    #[error("run already terminated after {steps} steps")]
    RunAlreadyTerminated {
        /// Number of steps the run executed before terminating.
        steps: u64,
    },

    /// A flow invariant was broken (capacity bound, conservation, excess
    /// sign, height monotonicity, or the max-flow/min-cut equality).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A network description could not be parsed or written.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl FlowError {
    /// Shorthand for [`FlowError::InvariantViolation`].
    pub fn invariant(detail: impl Into<String>) -> Self {
        FlowError::InvariantViolation(detail.into())
    }

    /// True when the error stems from the supplied input rather than from
    /// the engine itself.
    pub fn is_input_error(&self) -> bool {
        matches!(self, FlowError::InvalidGraph(_) | FlowError::Serialization(_))
    }

    /// True when the caller used the API out of order.
    pub fn is_caller_misuse(&self) -> bool {
        matches!(self, FlowError::RunAlreadyTerminated { .. })
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}

/// Validation errors for flow networks.
///
/// These are raised before any algorithm runs so a broken instance never
/// reaches a state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No source was designated.
    #[error("no source node designated")]
    MissingSource,

    /// No sink was designated.
    #[error("no sink node designated")]
    MissingSink,

    /// Source and sink name the same node.
    #[error("source and sink are the same node '{0}'")]
    SourceIsSink(String),

    /// Two different nodes were designated as source.
    #[error("duplicate source designation: '{first}' and '{second}'")]
    DuplicateSource {
        /// First designated source.
        first: String,
        /// Conflicting second designation.
        second: String,
    },

    /// Two different nodes were designated as sink.
    #[error("duplicate sink designation: '{first}' and '{second}'")]
    DuplicateSink {
        /// First designated sink.
        first: String,
        /// Conflicting second designation.
        second: String,
    },

    /// A designation or edge refers to a node that does not exist.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// An edge has a negative capacity.
    #[error("edge {edge} ({from} -> {to}) has negative capacity {capacity}")]
    NegativeCapacity {
        /// Offending edge.
        edge: EdgeId,
        /// Tail node identifier.
        from: String,
        /// Head node identifier.
        to: String,
        /// The negative capacity.
        capacity: Capacity,
    },

    /// An edge carries flow outside `[0, capacity]`.
    #[error("edge {edge} carries flow {flow} outside [0, {capacity}]")]
    FlowOutOfBounds {
        /// Offending edge.
        edge: EdgeId,
        /// Current flow.
        flow: Capacity,
        /// Declared capacity.
        capacity: Capacity,
    },

    /// The sum of capacities does not fit the numeric type.
    #[error("total capacity overflows i64")]
    CapacityOverflow,

    /// Edge costs are large enough that a path or flow cost could overflow.
    #[error("edge {edge}: cost {cost} can overflow i64 path or flow costs")]
    CostOverflow {
        /// First edge at which the bound was exceeded.
        edge: EdgeId,
        /// Its declared cost.
        cost: Cost,
    },

    /// The network exceeds a hard size limit.
    #[error("network too large: {what} = {actual} exceeds limit {limit}")]
    TooLarge {
        /// Which quantity exceeded its limit.
        what: &'static str,
        /// Actual count.
        actual: usize,
        /// Maximum allowed.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::RunAlreadyTerminated { steps: 7 };
        assert_eq!(err.to_string(), "run already terminated after 7 steps");

        let err: FlowError = GraphError::SourceIsSink("S".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid graph: source and sink are the same node 'S'"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(FlowError::from(GraphError::MissingSink).is_input_error());
        assert!(FlowError::RunAlreadyTerminated { steps: 1 }.is_caller_misuse());
        assert!(!FlowError::invariant("excess < 0").is_input_error());
        assert!(!FlowError::invariant("excess < 0").is_caller_misuse());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: FlowError = json_err.into();
        assert!(matches!(err, FlowError::Serialization(_)));
    }
}
