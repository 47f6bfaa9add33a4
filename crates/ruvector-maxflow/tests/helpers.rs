//! Shared test helpers for the ruvector-maxflow integration test suite.
//!
//! Provides the fixed reference networks, a deterministic random network
//! generator, a brute-force min-cut oracle, and per-algorithm step bounds.

#![allow(dead_code)]

use ruvector_maxflow::network::FlowNetwork;
use ruvector_maxflow::run::FlowRun;
use ruvector_maxflow::types::{AlgorithmKind, Capacity, Cost};
use ruvector_maxflow::StepEvent;

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// A minimal linear congruential generator for deterministic test data.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next u64 value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform value in `[0, bound)`.
    pub fn below(&mut self, bound: u64) -> u64 {
        (self.next_u64() >> 33) % bound
    }
}

// ---------------------------------------------------------------------------
// Reference networks
// ---------------------------------------------------------------------------

/// The 9-node, 12-edge Ford-Fulkerson teaching instance. Max flow 14.
pub fn ford_fulkerson_reference() -> FlowNetwork {
    FlowNetwork::builder()
        .source("S")
        .sink("T")
        .with_edges([
            ("S", "A", 7),
            ("S", "B", 4),
            ("S", "C", 6),
            ("A", "D", 5),
            ("A", "E", 3),
            ("B", "E", 4),
            ("C", "F", 6),
            ("D", "T", 6),
            ("E", "G", 5),
            ("F", "G", 3),
            ("G", "T", 8),
            ("F", "D", 4),
        ])
        .build()
        .unwrap()
}

/// The six-node textbook network with a cross edge and a cycle. Max flow 23.
pub fn textbook_six() -> FlowNetwork {
    FlowNetwork::builder()
        .source("s")
        .sink("t")
        .with_edges([
            ("s", "v1", 16),
            ("s", "v2", 13),
            ("v2", "v1", 4),
            ("v1", "v3", 12),
            ("v3", "v2", 9),
            ("v2", "v4", 14),
            ("v4", "v3", 7),
            ("v3", "t", 20),
            ("v4", "t", 4),
        ])
        .build()
        .unwrap()
}

/// Maximum capacity 100; max flow 57.
pub fn scaling_instance() -> FlowNetwork {
    FlowNetwork::builder()
        .source("S")
        .sink("T")
        .with_edges([("S", "A", 100), ("A", "T", 37), ("S", "B", 20), ("B", "T", 50)])
        .build()
        .unwrap()
}

/// Network on nodes `n0 .. n{n-1}` with source `n0` and sink `n{n-1}`.
pub fn network_from_triples(n: usize, edges: &[(usize, usize, Capacity)]) -> FlowNetwork {
    let mut builder = FlowNetwork::builder()
        .source("n0")
        .sink(format!("n{}", n - 1));
    for i in 0..n {
        builder = builder.node(format!("n{i}"));
    }
    for &(u, v, c) in edges {
        builder = builder.edge(format!("n{u}"), format!("n{v}"), c);
    }
    builder.build().unwrap()
}

/// Like [`network_from_triples`], with a per-unit cost on every edge.
pub fn network_from_costed(n: usize, edges: &[(usize, usize, Capacity, Cost)]) -> FlowNetwork {
    let mut builder = FlowNetwork::builder()
        .source("n0")
        .sink(format!("n{}", n - 1));
    for i in 0..n {
        builder = builder.node(format!("n{i}"));
    }
    for &(u, v, c, cost) in edges {
        builder = builder.edge_with_cost(format!("n{u}"), format!("n{v}"), c, cost);
    }
    builder.build().unwrap()
}

/// Random network with `n >= 2` nodes, `m` edges and capacities in
/// `[0, max_capacity]`. Self-loops and parallel edges may occur.
pub fn random_network(seed: u64, n: usize, m: usize, max_capacity: Capacity) -> FlowNetwork {
    let mut rng = Lcg::new(seed);
    let edges: Vec<(usize, usize, Capacity)> = (0..m)
        .map(|_| {
            let u = rng.below(n as u64) as usize;
            let v = rng.below(n as u64) as usize;
            let c = rng.below(max_capacity as u64 + 1) as Capacity;
            (u, v, c)
        })
        .collect();
    network_from_triples(n, &edges)
}

// ---------------------------------------------------------------------------
// Oracles
// ---------------------------------------------------------------------------

/// Minimum s-t cut capacity by enumerating every source side. Exponential;
/// only for networks of a dozen nodes or fewer.
pub fn brute_force_min_cut(network: &FlowNetwork) -> Capacity {
    let n = network.node_count();
    let (s, t) = (network.source(), network.sink());
    let mut best = Capacity::MAX;
    for mask in 0u32..(1 << n) {
        let in_s = |v: usize| mask & (1 << v) != 0;
        if !in_s(s) || in_s(t) {
            continue;
        }
        let cut: Capacity = network
            .edges()
            .iter()
            .filter(|e| in_s(e.from) && !in_s(e.to))
            .map(|e| e.capacity)
            .sum();
        best = best.min(cut);
    }
    best
}

/// Cheapest cost of a maximum flow, by cycle cancelling: start from the
/// Edmonds-Karp flow and push around negative-cost residual cycles (found
/// with Bellman-Ford from a virtual root) until none is left.
pub fn cycle_cancelling_cost(network: &FlowNetwork) -> Cost {
    let mut run = FlowRun::new(network.clone(), AlgorithmKind::AugmentingPath).unwrap();
    run_to_end(&mut run);

    // (from, to, capacity, cost, flow)
    let mut edges: Vec<(usize, usize, Capacity, Cost, Capacity)> = run
        .network()
        .edges()
        .iter()
        .filter(|e| e.from != e.to)
        .map(|e| (e.from, e.to, e.capacity, e.cost.unwrap_or(0), e.flow))
        .collect();
    let n = network.node_count();
    let tail = |edges: &[(usize, usize, Capacity, Cost, Capacity)], (i, forward): (usize, bool)| {
        if forward { edges[i].0 } else { edges[i].1 }
    };

    loop {
        let mut dist = vec![0 as Cost; n];
        let mut parent: Vec<Option<(usize, bool)>> = vec![None; n];
        let mut last = None;
        for _ in 0..n {
            last = None;
            for (i, &(u, v, cap, cost, flow)) in edges.iter().enumerate() {
                if flow < cap && dist[u] + cost < dist[v] {
                    dist[v] = dist[u] + cost;
                    parent[v] = Some((i, true));
                    last = Some(v);
                }
                if flow > 0 && dist[v] - cost < dist[u] {
                    dist[u] = dist[v] - cost;
                    parent[u] = Some((i, false));
                    last = Some(u);
                }
            }
        }
        let Some(mut x) = last else { break };
        for _ in 0..n {
            x = tail(&edges, parent[x].unwrap());
        }

        let mut cycle = Vec::new();
        let mut v = x;
        loop {
            let arc = parent[v].unwrap();
            cycle.push(arc);
            v = tail(&edges, arc);
            if v == x {
                break;
            }
        }
        let amount = cycle
            .iter()
            .map(|&(i, forward)| if forward { edges[i].2 - edges[i].4 } else { edges[i].4 })
            .min()
            .unwrap();
        for &(i, forward) in &cycle {
            if forward {
                edges[i].4 += amount;
            } else {
                edges[i].4 -= amount;
            }
        }
    }
    edges.iter().map(|e| e.4 * e.3).sum()
}

/// Upper bound on the number of steps `kind` may take on `network`.
pub fn step_bound(kind: AlgorithmKind, network: &FlowNetwork) -> usize {
    let v = network.node_count();
    let e = network.edge_count();
    match kind {
        AlgorithmKind::AugmentingPath => v * e + 1,
        AlgorithmKind::BlockingFlow => v * (e + 2) + 1,
        AlgorithmKind::PreflowPush => 2 * v * v + 4 * v * e + 8 * v * v * e + 2,
        AlgorithmKind::CapacityScaling => {
            let log_c = (network.max_capacity().max(1) as f64).log2().floor() as usize;
            (log_c + 2) * (4 * e + 1) + 2
        }
        AlgorithmKind::MinCostAugmentingPath => {
            let source_out: Capacity = network
                .edges()
                .iter()
                .filter(|edge| edge.from == network.source() && edge.to != edge.from)
                .map(|edge| edge.capacity)
                .sum();
            source_out as usize + 1
        }
    }
}

/// Step `run` to termination, panicking if it exceeds its step bound.
pub fn run_to_end(run: &mut FlowRun) -> Vec<StepEvent> {
    let bound = step_bound(run.kind(), run.network());
    let events = run.advance(bound + 1).unwrap();
    assert!(
        run.is_terminated(),
        "{} did not terminate within {bound} steps",
        run.kind()
    );
    events
}

/// Max flow of `network` under `kind`.
pub fn max_flow(network: &FlowNetwork, kind: AlgorithmKind) -> Capacity {
    let mut run = FlowRun::new(network.clone(), kind).unwrap();
    run_to_end(&mut run);
    run.current_flow()
}
