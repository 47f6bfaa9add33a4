//! Run controller.
//!
//! A [`FlowRun`] binds one network to one algorithm and owns everything that
//! changes while the algorithm executes. Each [`FlowRun::step`] advances a
//! clone of the current [`RunState`] by exactly one atomic action, verifies
//! the flow invariants on the clone, and only then replaces the committed
//! state. A failed step therefore leaves the run exactly where it was.
//!
//! Independent runs share nothing and may be driven from different threads;
//! a single run needs `&mut` access to step.
//!
//! # Example
//!
//! ```rust
//! use ruvector_maxflow::network::FlowNetwork;
//! use ruvector_maxflow::run::FlowRun;
//! use ruvector_maxflow::types::AlgorithmKind;
//!
//! let net = FlowNetwork::builder()
//!     .source("S")
//!     .sink("T")
//!     .edge("S", "A", 4)
//!     .edge("A", "T", 3)
//!     .build()
//!     .unwrap();
//!
//! let mut run = FlowRun::new(net, AlgorithmKind::BlockingFlow).unwrap();
//! while !run.is_terminated() {
//!     run.step().unwrap();
//! }
//! assert_eq!(run.current_flow(), 3);
//! assert_eq!(run.min_cut().unwrap().capacity, 3);
//! ```

use tracing::{debug, info, warn};

use crate::augmenting_path::AugmentingPathSearch;
use crate::blocking_flow::BlockingFlow;
use crate::capacity_scaling::CapacityScaling;
use crate::config::RunConfig;
use crate::error::{FlowError, Result};
use crate::events::StepEvent;
use crate::min_cost::MinCostAugmentingPath;
use crate::network::FlowNetwork;
use crate::preflow_push::PreflowPush;
use crate::traits::StepAlgorithm;
use crate::types::{AlgorithmKind, Capacity, MinCut};
use crate::validation::{check_capacity_bounds, check_conservation, check_preflow, validate_network};

// ---------------------------------------------------------------------------
// AlgorithmState
// ---------------------------------------------------------------------------

/// Algorithm-private state of a run, one variant per algorithm.
///
/// Observers match on the variant to read levels, heights, excess, Δ or the
/// last search tree.
#[derive(Debug, Clone)]
pub enum AlgorithmState {
    /// Edmonds-Karp.
    AugmentingPath(AugmentingPathSearch),
    /// Dinic.
    BlockingFlow(BlockingFlow),
    /// Push-relabel.
    PreflowPush(PreflowPush),
    /// Δ-scaling.
    CapacityScaling(CapacityScaling),
    /// Successive shortest paths by cost.
    MinCostAugmentingPath(MinCostAugmentingPath),
}

impl AlgorithmState {
    /// Fresh machine of the given kind for `network`.
    pub fn new(kind: AlgorithmKind, network: &FlowNetwork, config: &RunConfig) -> Self {
        match kind {
            AlgorithmKind::AugmentingPath => {
                AlgorithmState::AugmentingPath(AugmentingPathSearch::new(network))
            }
            AlgorithmKind::BlockingFlow => AlgorithmState::BlockingFlow(BlockingFlow::new(network)),
            AlgorithmKind::PreflowPush => {
                AlgorithmState::PreflowPush(PreflowPush::new(network, config.active_node_order))
            }
            AlgorithmKind::CapacityScaling => {
                AlgorithmState::CapacityScaling(CapacityScaling::new(network))
            }
            AlgorithmKind::MinCostAugmentingPath => {
                AlgorithmState::MinCostAugmentingPath(MinCostAugmentingPath::new(network))
            }
        }
    }

    /// The machine behind the common step interface.
    pub fn as_algorithm(&self) -> &dyn StepAlgorithm {
        match self {
            AlgorithmState::AugmentingPath(m) => m,
            AlgorithmState::BlockingFlow(m) => m,
            AlgorithmState::PreflowPush(m) => m,
            AlgorithmState::CapacityScaling(m) => m,
            AlgorithmState::MinCostAugmentingPath(m) => m,
        }
    }

    fn as_algorithm_mut(&mut self) -> &mut dyn StepAlgorithm {
        match self {
            AlgorithmState::AugmentingPath(m) => m,
            AlgorithmState::BlockingFlow(m) => m,
            AlgorithmState::PreflowPush(m) => m,
            AlgorithmState::CapacityScaling(m) => m,
            AlgorithmState::MinCostAugmentingPath(m) => m,
        }
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Everything that changes during a run.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The network with current flows.
    pub network: FlowNetwork,
    /// Algorithm-private state.
    pub algorithm: AlgorithmState,
    /// Steps committed so far.
    pub steps: u64,
    /// Flow value after the last committed step.
    pub total_flow: Capacity,
    /// Event of the last committed step.
    pub last_event: Option<StepEvent>,
}

impl RunState {
    fn new(network: FlowNetwork, kind: AlgorithmKind, config: &RunConfig) -> Self {
        let algorithm = AlgorithmState::new(kind, &network, config);
        Self {
            network,
            algorithm,
            steps: 0,
            total_flow: 0,
            last_event: None,
        }
    }

    fn is_terminated(&self) -> bool {
        self.algorithm.as_algorithm().is_terminated()
    }

    fn flow_value(&self) -> Capacity {
        self.algorithm.as_algorithm().flow_value(&self.network)
    }

    /// Flow invariants that must hold after every committed step.
    fn check_invariants(&self, previous_flow: Capacity) -> Result<()> {
        let network = &self.network;
        check_capacity_bounds(network)?;

        match &self.algorithm {
            AlgorithmState::PreflowPush(machine) => {
                check_preflow(network)?;
                if self.is_terminated() {
                    check_conservation(network)?;
                }
                let source_height = machine.heights()[network.source()];
                if self.steps > 0 && source_height != network.node_count() {
                    return Err(FlowError::invariant(format!(
                        "source height {source_height} differs from node count {}",
                        network.node_count()
                    )));
                }
            }
            _ => check_conservation(network)?,
        }

        let flow = self.flow_value();
        if flow < previous_flow {
            return Err(FlowError::invariant(format!(
                "flow value decreased from {previous_flow} to {flow}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FlowRun
// ---------------------------------------------------------------------------

/// One algorithm executing on one network, advanced step by step.
#[derive(Debug, Clone)]
pub struct FlowRun {
    config: RunConfig,
    kind: AlgorithmKind,
    original: FlowNetwork,
    state: RunState,
}

impl FlowRun {
    /// Create a run with the default [`RunConfig`].
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidGraph`] if `network` fails validation.
    pub fn new(network: FlowNetwork, kind: AlgorithmKind) -> Result<Self> {
        Self::with_config(network, kind, RunConfig::default())
    }

    /// Create a run. Flows in `network` are discarded; the run starts from
    /// the zero flow.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidGraph`] if `network` fails validation.
    pub fn with_config(network: FlowNetwork, kind: AlgorithmKind, config: RunConfig) -> Result<Self> {
        validate_network(&network)?;
        let original = network.with_zero_flow();
        let state = RunState::new(original.clone(), kind, &config);
        info!(
            algorithm = %kind,
            nodes = original.node_count(),
            edges = original.edge_count(),
            "run created"
        );
        Ok(Self { config, kind, original, state })
    }

    /// Advance by exactly one atomic action.
    ///
    /// # Errors
    ///
    /// - [`FlowError::RunAlreadyTerminated`] if the run has finished.
    /// - [`FlowError::InvariantViolation`] if the action could not be
    ///   performed legally or left the flow in an illegal state. The run is
    ///   left as it was before the call.
    pub fn step(&mut self) -> Result<StepEvent> {
        if self.state.is_terminated() {
            return Err(FlowError::RunAlreadyTerminated { steps: self.state.steps });
        }

        // Copies flows and machine state; the topology is shared.
        let mut next = self.state.clone();
        let event = match next.algorithm.as_algorithm_mut().step(&mut next.network) {
            Ok(event) => event,
            Err(e) => {
                warn!(algorithm = %self.kind, step = next.steps + 1, error = %e, "step failed");
                return Err(e);
            }
        };
        next.steps += 1;

        if self.config.check_invariants {
            if let Err(e) = next.check_invariants(self.state.total_flow) {
                warn!(algorithm = %self.kind, step = next.steps, error = %e, "invariant check failed");
                return Err(e);
            }
        }

        next.total_flow = next.flow_value();
        next.last_event = Some(event.clone());
        debug!(
            algorithm = %self.kind,
            step = next.steps,
            event = %event.kind(),
            flow = next.total_flow,
            "step"
        );
        if next.is_terminated() {
            info!(
                algorithm = %self.kind,
                steps = next.steps,
                flow = next.total_flow,
                "run terminated"
            );
        }
        self.state = next;
        Ok(event)
    }

    /// Step until termination or until `max_steps` steps were taken,
    /// returning the events produced. A finished run yields no events.
    ///
    /// # Errors
    ///
    /// The first error returned by [`step`](Self::step).
    pub fn advance(&mut self, max_steps: usize) -> Result<Vec<StepEvent>> {
        let mut events = Vec::new();
        while events.len() < max_steps && !self.is_terminated() {
            events.push(self.step()?);
        }
        Ok(events)
    }

    /// Return to the initial state: original capacities, zero flow, a fresh
    /// algorithm machine.
    pub fn reset(&mut self) {
        info!(algorithm = %self.kind, discarded_steps = self.state.steps, "run reset");
        self.state = RunState::new(self.original.clone(), self.kind, &self.config);
    }

    /// Whether the run has finished.
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Flow value reported by the algorithm: net source outflow, or the
    /// sink's excess for preflow-push.
    pub fn current_flow(&self) -> Capacity {
        self.state.total_flow
    }

    /// The certified min-cut, or `None` until the run terminates.
    pub fn min_cut(&self) -> Option<&MinCut> {
        self.state.algorithm.as_algorithm().min_cut()
    }

    /// The network with its current flows.
    pub fn network(&self) -> &FlowNetwork {
        &self.state.network
    }

    /// Algorithm-private state.
    pub fn algorithm(&self) -> &AlgorithmState {
        &self.state.algorithm
    }

    /// The full committed run state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Algorithm bound to this run.
    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    /// Steps committed since creation or the last reset.
    pub fn steps(&self) -> u64 {
        self.state.steps
    }

    /// Event of the last committed step.
    pub fn last_event(&self) -> Option<&StepEvent> {
        self.state.last_event.as_ref()
    }

    /// Settings this run was created with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }
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
    fn test_step_after_termination_is_rejected() {
        let mut run = FlowRun::new(line(), AlgorithmKind::AugmentingPath).unwrap();
        run.advance(100).unwrap();
        assert!(run.is_terminated());
        let steps = run.steps();
        let err = run.step().unwrap_err();
        assert!(matches!(err, FlowError::RunAlreadyTerminated { steps: s } if s == steps));
        assert_eq!(run.steps(), steps);
    }

    #[test]
    fn test_min_cut_absent_until_terminated() {
        let mut run = FlowRun::new(line(), AlgorithmKind::CapacityScaling).unwrap();
        assert!(run.min_cut().is_none());
        run.step().unwrap();
        assert!(run.min_cut().is_none());
        run.advance(100).unwrap();
        assert_eq!(run.min_cut().unwrap().capacity, 3);
    }

    #[test]
    fn test_initial_flows_are_discarded() {
        let net = FlowNetwork::from_json(
            r#"{"edges":[{"u":"S","v":"A","capacity":5,"flow":3},{"u":"A","v":"T","capacity":3,"flow":3}]}"#,
        )
        .unwrap();
        let run = FlowRun::new(net, AlgorithmKind::BlockingFlow).unwrap();
        assert_eq!(run.current_flow(), 0);
        assert!(run.network().edges().iter().all(|e| e.flow == 0));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut run = FlowRun::new(line(), AlgorithmKind::PreflowPush).unwrap();
        run.advance(3).unwrap();
        assert_eq!(run.steps(), 3);
        run.reset();
        assert_eq!(run.steps(), 0);
        assert_eq!(run.current_flow(), 0);
        assert!(run.last_event().is_none());
        assert!(matches!(run.algorithm(), AlgorithmState::PreflowPush(_)));
    }
}
