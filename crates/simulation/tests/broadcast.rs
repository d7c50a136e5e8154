//! End-to-end broadcast scenarios across strategies and network shapes.

use gossipsim_latency::{LatencyConfig, LatencyModel, LatencyTable};
use gossipsim_simulation::{
    run_simulation, BindContext, DropByRatio, GreedyStrategy, HalfGreedyStrategy, Network, Node,
    SimulationError, Strategy, StructuredCycleStrategy,
};
use gossipsim_types::{Location, MessageId, NodeId};
use std::collections::BTreeMap;

fn uniform_model(n: usize) -> LatencyModel {
    model_with(n, |_, _| 1.0, LatencyConfig::default())
}

fn model_with(
    n: usize,
    latency: impl Fn(usize, usize) -> f64,
    config: LatencyConfig,
) -> LatencyModel {
    let mut table = LatencyTable::new();
    for i in 0..n {
        let row: BTreeMap<String, f64> = (0..n)
            .map(|j| (format!("c{j}"), if i == j { 0.0 } else { latency(i, j) }))
            .collect();
        table.insert(format!("c{i}"), row);
    }
    LatencyModel::new(table, config).unwrap()
}

fn network_of(
    n: usize,
    model: LatencyModel,
    seed: u64,
    mut strategy: impl FnMut(usize) -> Box<dyn Strategy>,
) -> Network {
    let nodes: Vec<Node> = (0..n)
        .map(|i| {
            Node::new(
                Location::new(format!("c{i}")),
                NodeId(i as u32),
                strategy(i),
            )
        })
        .collect();
    let mut network = Network::new(nodes, model, seed).unwrap();
    network.initialize().unwrap();
    network
}

#[test]
fn test_structured_cycle_full_coverage() {
    let mut network = network_of(20, uniform_model(20), 0, |_| {
        Box::new(StructuredCycleStrategy::new(6))
    });

    let report = run_simulation(&mut network, NodeId(0), MessageId(1), 100).unwrap();

    assert_eq!(report.completed_nodes, 20, "expander reaches every node");
    let tick = report.completion_tick.expect("broadcast should quiesce");
    // Three edge-disjoint cycles give a much shorter path than the
    // 10-hop worst case of a single ring.
    assert!(tick <= 10, "low-diameter topology took {tick} ticks");
    assert!(report.total_packets <= 20 * 6);
}

#[test]
fn test_greedy_chain_propagates() {
    // Cities on a line: greedy degree-2 wires each node to its immediate
    // neighbors, so the broadcast walks the line end to end.
    let model = model_with(
        10,
        |i, j| (i.abs_diff(j) * 10) as f64,
        LatencyConfig::default(),
    );
    let mut network = network_of(10, model, 3, |_| Box::new(GreedyStrategy::new(2)));

    let report = run_simulation(&mut network, NodeId(0), MessageId(1), 10_000).unwrap();

    assert_eq!(report.completed_nodes, 10);
    // Far end of the line completes last.
    let far = &report.nodes[9];
    let near = &report.nodes[1];
    assert!(far.first_receipt_tick.unwrap() > near.first_receipt_tick.unwrap());
}

#[test]
fn test_half_greedy_covers_connected_roster() {
    let mut network = network_of(16, uniform_model(16), 8, |_| {
        Box::new(HalfGreedyStrategy::new(4))
    });
    let report = run_simulation(&mut network, NodeId(3), MessageId(5), 1_000).unwrap();

    assert!(report.completion_tick.is_some());
    assert_eq!(
        report.total_packets,
        report.nodes.iter().map(|n| n.sent_packets).sum::<u64>()
    );
}

/// Strategy with a hand-wired neighbor list; exercises the trait seam the
/// way an anti-entropy or experiment-specific policy would plug in.
#[derive(Debug)]
struct FixedStrategy(Vec<NodeId>);

impl Strategy for FixedStrategy {
    fn bind(&mut self, _ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        Ok(())
    }

    fn neighbors(&self) -> &[NodeId] {
        &self.0
    }
}

#[test]
fn test_unreached_node_is_reported_not_failed() {
    // Ring over nodes 0..2; node 3 is an island with no in-edges.
    let wiring: Vec<Vec<NodeId>> = vec![
        vec![NodeId(1)],
        vec![NodeId(2)],
        vec![NodeId(0)],
        vec![],
    ];
    let mut network = network_of(4, uniform_model(4), 0, |i| {
        Box::new(FixedStrategy(wiring[i].clone()))
    });

    let report = run_simulation(&mut network, NodeId(0), MessageId(1), 100).unwrap();

    // The island is a degenerate outcome, not an error.
    assert!(report.completion_tick.is_some());
    assert_eq!(report.completed_nodes, 3);
    let island = &report.nodes[3];
    assert!(!island.completed);
    assert_eq!(island.received_packets, 0);
    assert_eq!(island.first_receipt_tick, None);
}

#[test]
fn test_cross_provider_latency_delays_receipt() {
    // c0/c1 on AWS, c2 on GCP; base latency 10, cross-provider doubled.
    let config = LatencyConfig {
        provider_list: vec!["AWS".into(), "GCP".into()],
        cross_provider_latency_multiplier: 2.0,
        ..Default::default()
    };
    let model = model_with(3, |_, _| 10.0, config);

    let providers = ["AWS", "AWS", "GCP"];
    let wiring: Vec<Vec<NodeId>> = vec![vec![NodeId(1), NodeId(2)], vec![], vec![]];
    let nodes: Vec<Node> = (0..3)
        .map(|i| {
            Node::new(
                Location::with_provider(format!("c{i}"), providers[i]),
                NodeId(i as u32),
                Box::new(FixedStrategy(wiring[i].clone())) as Box<dyn Strategy>,
            )
        })
        .collect();
    let mut network = Network::new(nodes, model, 0).unwrap();
    network.initialize().unwrap();

    let report = run_simulation(&mut network, NodeId(0), MessageId(1), 100).unwrap();

    // Same provider: 10 ticks. Cross provider: 20.
    assert_eq!(report.nodes[1].first_receipt_tick, Some(10));
    assert_eq!(report.nodes[2].first_receipt_tick, Some(20));
}

#[test]
fn test_lossy_broadcast_is_reproducible() {
    let config = LatencyConfig {
        min_loss: 0.2,
        max_loss: 0.4,
        ..Default::default()
    };
    let run = |seed: u64| {
        let model = model_with(12, |_, _| 5.0, config.clone());
        let nodes: Vec<Node> = (0..12)
            .map(|i| {
                Node::new(
                    Location::new(format!("c{i}")),
                    NodeId(i as u32),
                    Box::new(StructuredCycleStrategy::new(4)) as Box<dyn Strategy>,
                )
            })
            .collect();
        let mut network = Network::new(nodes, model, seed)
            .unwrap()
            .with_loss_policy(Box::new(DropByRatio));
        network.initialize().unwrap();
        run_simulation(&mut network, NodeId(0), MessageId(1), 1_000).unwrap()
    };

    let a = run(77);
    let b = run(77);
    assert_eq!(a.total_packets, b.total_packets);
    assert_eq!(a.dropped_packets, b.dropped_packets);
    assert_eq!(a.completed_nodes, b.completed_nodes);
    assert!(a.dropped_packets <= a.total_packets);
}
