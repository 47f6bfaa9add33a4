//! The capability interface shared by every algorithm state machine.

use crate::error::FlowError;
use crate::events::StepEvent;
use crate::network::FlowNetwork;
use crate::types::{AlgorithmKind, Capacity, MinCut};

/// A max-flow algorithm driven one atomic action at a time.
///
/// Implementations own only their algorithm-private state; the network with
/// its flows is passed in by the run controller on every call.
pub trait StepAlgorithm {
    /// Perform exactly one atomic action and describe it.
    ///
    /// Implementations report termination by returning
    /// [`StepEvent::Terminated`] and flipping [`is_terminated`](Self::is_terminated);
    /// the controller never calls `step` afterwards.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvariantViolation`] if the network is found in a state
    /// the algorithm cannot legally continue from.
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError>;

    /// Whether the machine has reached its terminal state.
    fn is_terminated(&self) -> bool;

    /// The certified min-cut, once terminated.
    fn min_cut(&self) -> Option<&MinCut>;

    /// Which algorithm this machine runs.
    fn kind(&self) -> AlgorithmKind;

    /// Flow value the algorithm currently reports.
    ///
    /// Defaults to the net outflow of the source. Preflow-push reports the
    /// excess at the sink instead.
    fn flow_value(&self, network: &FlowNetwork) -> Capacity {
        network.flow_value()
    }
}
