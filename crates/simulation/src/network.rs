//! The network: roster, event scheduling, and packet delivery.

use crate::node::Node;
use crate::strategy::BindContext;
use crate::SimulationError;
use gossipsim_latency::LatencyModel;
use gossipsim_types::{Location, MessageId, NodeId, Packet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{info, trace};

/// Resolved adjacency: node id to ordered neighbor list.
///
/// The output of [`Network::adjacency`], consumed by graph analysis
/// without any knowledge of strategy internals.
pub type Adjacency = BTreeMap<NodeId, Vec<NodeId>>;

/// Decides whether a packet is dropped, given the pair's loss ratio.
///
/// The latency model computes a loss ratio for every send; what to do with
/// it is policy. The default [`DeliverAll`] never drops, keeping runs
/// fully reproducible regardless of loss configuration; [`DropByRatio`]
/// drops probabilistically with the network's seeded RNG.
pub trait LossPolicy: std::fmt::Debug {
    fn should_drop(&self, loss_ratio: f64, rng: &mut ChaCha8Rng) -> bool;
}

/// Never drop. The loss ratio is computed and ignored.
#[derive(Debug, Default)]
pub struct DeliverAll;

impl LossPolicy for DeliverAll {
    fn should_drop(&self, _loss_ratio: f64, _rng: &mut ChaCha8Rng) -> bool {
        false
    }
}

/// Drop with probability equal to the loss ratio.
#[derive(Debug, Default)]
pub struct DropByRatio;

impl LossPolicy for DropByRatio {
    fn should_drop(&self, loss_ratio: f64, rng: &mut ChaCha8Rng) -> bool {
        loss_ratio > 0.0 && rng.gen::<f64>() < loss_ratio
    }
}

/// A scheduled packet awaiting delivery.
#[derive(Debug)]
struct InFlightPacket {
    arrival_tick: u64,
    /// Send order, for stable tie-breaking at equal arrival ticks.
    seq: u64,
    packet: Packet,
}

/// Owns the roster, the latency model, and the in-flight packet queue;
/// advances simulated time one tick at a time.
///
/// Single-threaded and deterministic: the in-flight list is kept sorted by
/// `(arrival_tick, seq)`, nodes are ticked in roster order, and all
/// randomness flows through one seeded RNG.
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Node>,
    latency: LatencyModel,
    tick_count: u64,
    /// Sorted ascending by `(arrival_tick, seq)`.
    in_flight: Vec<InFlightPacket>,
    next_seq: u64,
    total_packets: u64,
    dropped_packets: u64,
    rng: ChaCha8Rng,
    loss_policy: Box<dyn LossPolicy>,
    initialized: bool,
}

impl Network {
    /// Create a network over a roster.
    ///
    /// Node ids must be dense roster indices (`node-0 .. node-{n-1}`, in
    /// order) and every location must be covered by the latency model;
    /// both are validated here so later lookups cannot fail.
    pub fn new(
        nodes: Vec<Node>,
        latency: LatencyModel,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        for (position, node) in nodes.iter().enumerate() {
            if node.id().index() != position {
                return Err(SimulationError::RosterMismatch {
                    position,
                    found: node.id(),
                });
            }
            if !latency.knows(node.location()) {
                return Err(SimulationError::UnknownLocation(node.location().clone()));
            }
        }

        Ok(Self {
            nodes,
            latency,
            tick_count: 0,
            in_flight: Vec::new(),
            next_seq: 0,
            total_packets: 0,
            dropped_packets: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            loss_policy: Box::new(DeliverAll),
            initialized: false,
        })
    }

    /// Replace the loss policy. Call before running the simulation.
    pub fn with_loss_policy(mut self, policy: Box<dyn LossPolicy>) -> Self {
        self.loss_policy = policy;
        self
    }

    /// Bind every node to this network, resolving all neighbor lists.
    ///
    /// Must be called exactly once, before any traffic. Binding happens in
    /// roster order against one shared RNG, so a given seed always
    /// produces the same topology.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        if self.initialized {
            return Err(SimulationError::AlreadyInitialized);
        }

        let roster: Vec<(NodeId, Location)> = self
            .nodes
            .iter()
            .map(|node| (node.id(), node.location().clone()))
            .collect();

        for index in 0..self.nodes.len() {
            let mut ctx = BindContext {
                self_id: roster[index].0,
                self_location: &roster[index].1,
                roster: &roster,
                latency: &self.latency,
                rng: &mut self.rng,
            };
            self.nodes[index].bind(&mut ctx)?;
        }

        self.initialized = true;
        info!(nodes = self.nodes.len(), "Network initialized");
        Ok(())
    }

    /// Originate a broadcast at `start`, scheduling one packet per
    /// neighbor. The start node completes immediately.
    pub fn start_broadcast(
        &mut self,
        start: NodeId,
        message: MessageId,
    ) -> Result<(), SimulationError> {
        if !self.initialized {
            return Err(SimulationError::NotInitialized);
        }
        if start.index() >= self.nodes.len() {
            return Err(SimulationError::UnknownNode(start));
        }

        let outbound = self.nodes[start.index()].start_broadcast(message, self.tick_count);
        info!(%start, %message, fanout = outbound.len(), "Starting broadcast");
        for packet in outbound {
            self.send(packet);
        }
        Ok(())
    }

    /// Schedule a packet for future delivery.
    ///
    /// Bumps the source's sent counter and the global packet count, then
    /// consults the loss policy with the pair's loss ratio. Surviving
    /// packets arrive `ceil(latency)` ticks from now; insertion preserves
    /// the `(arrival_tick, seq)` sort so equal arrivals deliver in send
    /// order.
    pub fn send(&mut self, packet: Packet) {
        self.nodes[packet.source.index()].record_sent();
        self.total_packets += 1;

        let source = self.nodes[packet.source.index()].location();
        let destination = self.nodes[packet.destination.index()].location();

        let loss_ratio = self.latency.get_loss_ratio(source, destination);
        let latency = self.latency.get_latency(source, destination);

        if self.loss_policy.should_drop(loss_ratio, &mut self.rng) {
            self.dropped_packets += 1;
            trace!(%packet, loss_ratio, "Packet dropped");
            return;
        }

        let arrival_tick = self.tick_count + latency.ceil() as u64;
        let seq = self.next_seq;
        self.next_seq += 1;

        // Existing entries at the same arrival tick all carry a lower seq,
        // so inserting after them keeps (arrival_tick, seq) sorted.
        let at = self
            .in_flight
            .partition_point(|entry| entry.arrival_tick <= arrival_tick);
        self.in_flight.insert(
            at,
            InFlightPacket {
                arrival_tick,
                seq,
                packet,
            },
        );

        trace!(%packet, arrival_tick, "Packet scheduled");
    }

    /// Advance simulated time by one tick.
    ///
    /// Delivers every in-flight packet now due, then gives every node one
    /// round of local processing in roster order, scheduling whatever they
    /// forward.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        let due = self
            .in_flight
            .partition_point(|entry| entry.arrival_tick <= self.tick_count);
        let rest = self.in_flight.split_off(due);
        let arrived = std::mem::replace(&mut self.in_flight, rest);
        for entry in arrived {
            self.nodes[entry.packet.destination.index()].receive_packet(entry.packet);
        }

        for index in 0..self.nodes.len() {
            let outbound = self.nodes[index].tick(self.tick_count);
            for packet in outbound {
                self.send(packet);
            }
        }
    }

    /// True while any packet is in flight or any inbox is non-empty.
    pub fn is_active(&self) -> bool {
        !self.in_flight.is_empty() || self.nodes.iter().any(|node| node.inbox_len() > 0)
    }

    /// Snapshot of every node's resolved neighbor list.
    ///
    /// Available after [`initialize`](Self::initialize); this is the
    /// interface graph-analysis tooling consumes.
    pub fn adjacency(&self) -> Result<Adjacency, SimulationError> {
        if !self.initialized {
            return Err(SimulationError::NotInitialized);
        }
        Ok(self
            .nodes
            .iter()
            .map(|node| (node.id(), node.neighbors().to_vec()))
            .collect())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Packets handed to `send` so far, dropped ones included.
    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Packets the loss policy discarded before scheduling.
    pub fn dropped_packets(&self) -> u64 {
        self.dropped_packets
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    #[cfg(test)]
    pub(crate) fn assert_in_flight_sorted(&self) {
        assert!(self
            .in_flight
            .windows(2)
            .all(|w| (w[0].arrival_tick, w[0].seq) <= (w[1].arrival_tick, w[1].seq)));
    }
}
