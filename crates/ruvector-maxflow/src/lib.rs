//! Step-by-step maximum-flow / minimum-cut engine for the ruvector ecosystem.
//!
//! A [`FlowRun`](run::FlowRun) binds a directed capacitated s-t network to
//! one algorithm and advances it one atomic action at a time. Every step
//! returns a [`StepEvent`](events::StepEvent), so callers can observe, replay
//! and verify each intermediate flow. At termination every run yields a
//! certified minimum cut whose capacity equals the flow value.
//!
//! # Available Algorithms
//!
//! | Algorithm | Machine | One step |
//! |-----------|---------|----------|
//! | Edmonds-Karp | [`AugmentingPathSearch`](augmenting_path::AugmentingPathSearch) | shortest path + augment |
//! | Dinic | [`BlockingFlow`](blocking_flow::BlockingFlow) | level graph, or one blocking path |
//! | Push-relabel | [`PreflowPush`](preflow_push::PreflowPush) | one push or one relabel |
//! | Capacity scaling | [`CapacityScaling`](capacity_scaling::CapacityScaling) | Δ-path + augment, or halve Δ |
//! | Min-cost | [`MinCostAugmentingPath`](min_cost::MinCostAugmentingPath) | cheapest path + augment |
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
//!     .edge("S", "A", 3)
//!     .edge("S", "B", 2)
//!     .edge("A", "T", 2)
//!     .edge("B", "T", 3)
//!     .build()
//!     .unwrap();
//!
//! let mut run = FlowRun::new(net, AlgorithmKind::AugmentingPath).unwrap();
//! let events = run.advance(usize::MAX).unwrap();
//! assert!(events.last().unwrap().is_terminal());
//! assert_eq!(run.current_flow(), 4);
//! assert_eq!(run.min_cut().unwrap().capacity, 4);
//! ```

pub mod augmenting_path;
pub mod blocking_flow;
pub mod capacity_scaling;
pub mod config;
pub mod error;
pub mod events;
pub mod min_cost;
pub mod network;
pub mod preflow_push;
pub mod residual;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use config::{ActiveNodeOrder, RunConfig};
pub use error::{FlowError, GraphError};
pub use events::{StepEvent, StepEventKind};
pub use network::{FlowNetwork, FlowNetworkBuilder, NetworkSpec};
pub use run::FlowRun;
pub use traits::StepAlgorithm;
pub use types::{AlgorithmKind, Capacity, MinCut};
