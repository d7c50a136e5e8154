//! Driver loop and final report.

use crate::{Network, SimulationError};
use gossipsim_types::{MessageId, NodeId};
use tracing::{debug, info};

/// Per-node outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct NodeReport {
    pub id: NodeId,
    /// Whether the node received and forwarded the broadcast.
    pub completed: bool,
    /// Tick at which the node first processed the broadcast.
    pub first_receipt_tick: Option<u64>,
    pub sent_packets: u64,
    pub received_packets: u64,
}

/// Final simulation report.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Tick at which the network went quiet; `None` if the tick budget ran
    /// out first.
    pub completion_tick: Option<u64>,
    /// Ticks actually simulated.
    pub ticks_run: u64,
    /// Packets sent across the whole run, dropped ones included.
    pub total_packets: u64,
    /// Packets discarded by the loss policy.
    pub dropped_packets: u64,
    /// Nodes that received and forwarded the broadcast.
    pub completed_nodes: usize,
    pub nodes: Vec<NodeReport>,
}

impl SimulationReport {
    /// Fraction of nodes the broadcast reached.
    pub fn coverage(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.completed_nodes as f64 / self.nodes.len() as f64
    }

    pub fn print_summary(&self) {
        println!("\n═══════════════════════════════════════════");
        println!("         GOSSIP BROADCAST REPORT            ");
        println!("═══════════════════════════════════════════");
        println!();
        match self.completion_tick {
            Some(tick) => println!("Completed at tick: {tick}"),
            None => println!("Did NOT complete within {} ticks", self.ticks_run),
        }
        println!(
            "Coverage: {}/{} nodes ({:.1}%)",
            self.completed_nodes,
            self.nodes.len(),
            self.coverage() * 100.0
        );
        println!();
        println!("Packets:");
        println!("  Sent:    {}", self.total_packets);
        println!("  Dropped: {}", self.dropped_packets);
        println!("═══════════════════════════════════════════\n");
    }
}

/// Run a broadcast from `start` until the network goes quiet or the tick
/// budget is exhausted.
///
/// The minimal driver protocol: start the broadcast, loop `tick()` while
/// `is_active()`, then report completion tick, per-node status, and total
/// packet cost.
pub fn run_simulation(
    network: &mut Network,
    start: NodeId,
    message: MessageId,
    max_ticks: u64,
) -> Result<SimulationReport, SimulationError> {
    network.start_broadcast(start, message)?;

    let mut ticks_run = 0;
    while network.is_active() && ticks_run < max_ticks {
        network.tick();
        ticks_run += 1;

        if network.tick_count() % 100 == 0 {
            let completed = network.nodes().iter().filter(|n| n.completed()).count();
            debug!(
                tick = network.tick_count(),
                completed,
                nodes = network.num_nodes(),
                in_flight = network.in_flight_len(),
                "Broadcast in progress"
            );
        }
    }

    let completed_nodes = network.nodes().iter().filter(|n| n.completed()).count();
    let report = SimulationReport {
        completion_tick: (!network.is_active()).then(|| network.tick_count()),
        ticks_run,
        total_packets: network.total_packets(),
        dropped_packets: network.dropped_packets(),
        completed_nodes,
        nodes: network
            .nodes()
            .iter()
            .map(|node| NodeReport {
                id: node.id(),
                completed: node.completed(),
                first_receipt_tick: node.first_receipt_tick(),
                sent_packets: node.sent_packet_count(),
                received_packets: node.received_packet_count(),
            })
            .collect(),
    };

    info!(
        completion_tick = ?report.completion_tick,
        total_packets = report.total_packets,
        completed = report.completed_nodes,
        nodes = report.nodes.len(),
        "Simulation finished"
    );

    Ok(report)
}
