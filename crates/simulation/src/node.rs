//! Per-node state machine.
//!
//! Nodes are synchronous and perform no I/O: processing a tick returns the
//! packets the node wants sent, and the network schedules them. This keeps
//! each node the single writer of its own state and makes a whole run
//! deterministic.

use crate::strategy::{BindContext, Strategy};
use crate::SimulationError;
use gossipsim_types::{Location, MessageId, NodeId, Packet};
use std::collections::VecDeque;
use tracing::trace;

/// Lifecycle of a node across a simulation run.
///
/// `Completed` is sticky: it marks that the node has discharged its
/// forwarding obligation. Packets received afterwards are still counted
/// but never re-forwarded, which is what bounds flood traffic to at most
/// one forward per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created, not yet bound to a network.
    Idle,
    /// Strategy resolved, awaiting traffic.
    Bound,
    /// Has pending inbox traffic.
    Active,
    /// Forwarding obligation discharged. Terminal.
    Completed,
}

/// A simulation actor: location, bound strategy, inbox, and counters.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    location: Location,
    strategy: Box<dyn Strategy>,
    state: NodeState,
    inbox: VecDeque<Packet>,
    sent_packet_count: u64,
    received_packet_count: u64,
    /// Tick at which the first packet was processed, for latency reporting.
    first_receipt_tick: Option<u64>,
}

impl Node {
    pub fn new(location: Location, id: NodeId, strategy: Box<dyn Strategy>) -> Self {
        Self {
            id,
            location,
            strategy,
            state: NodeState::Idle,
            inbox: VecDeque::new(),
            sent_packet_count: 0,
            received_packet_count: 0,
            first_receipt_tick: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Whether this node has forwarded (or originated) the broadcast.
    pub fn completed(&self) -> bool {
        self.state == NodeState::Completed
    }

    /// The resolved neighbor list. Empty before binding.
    pub fn neighbors(&self) -> &[NodeId] {
        self.strategy.neighbors()
    }

    pub fn sent_packet_count(&self) -> u64 {
        self.sent_packet_count
    }

    pub fn received_packet_count(&self) -> u64 {
        self.received_packet_count
    }

    pub fn first_receipt_tick(&self) -> Option<u64> {
        self.first_receipt_tick
    }

    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    /// Resolve the strategy's neighbor list. Idle -> Bound.
    ///
    /// Called by `Network::initialize` exactly once per node.
    pub(crate) fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        self.strategy.bind(ctx)?;
        debug_assert!(
            !self.strategy.neighbors().contains(&self.id),
            "strategy produced a self-neighbor"
        );
        self.state = NodeState::Bound;
        Ok(())
    }

    /// Accept a delivered packet into the inbox.
    pub(crate) fn receive_packet(&mut self, packet: Packet) {
        trace!(node = %self.id, %packet, "Received packet");
        self.inbox.push_back(packet);
        self.received_packet_count += 1;
        if self.state == NodeState::Bound {
            self.state = NodeState::Active;
        }
    }

    /// Bookkeeping hook for `Network::send`.
    pub(crate) fn record_sent(&mut self) {
        self.sent_packet_count += 1;
    }

    /// One round of local processing: pop the oldest inbox packet and,
    /// unless already completed, forward the broadcast onward.
    ///
    /// Returns the packets to send; the network schedules them.
    pub(crate) fn tick(&mut self, now: u64) -> Vec<Packet> {
        let Some(packet) = self.inbox.pop_front() else {
            return Vec::new();
        };

        if self.first_receipt_tick.is_none() {
            self.first_receipt_tick = Some(now);
        }

        if self.state == NodeState::Completed {
            // Flood-once: duplicate receipts are recorded, never re-forwarded.
            return Vec::new();
        }
        self.state = NodeState::Completed;

        self.strategy
            .forward_list(Some(packet.source), packet.message)
            .into_iter()
            .map(|to| Packet::new(self.id, to, packet.message))
            .collect()
    }

    /// Originate a broadcast: one packet to every neighbor, then done.
    ///
    /// The originator completes immediately; it does not wait for any
    /// acknowledgement.
    pub(crate) fn start_broadcast(&mut self, message: MessageId, now: u64) -> Vec<Packet> {
        self.state = NodeState::Completed;
        self.first_receipt_tick = Some(now);
        self.strategy
            .forward_list(None, message)
            .into_iter()
            .map(|to| Packet::new(self.id, to, message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Strategy with a pre-resolved neighbor list, for driving the node
    /// state machine directly.
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

    fn test_node(id: u32, neighbors: Vec<NodeId>) -> Node {
        let mut node = Node::new(
            Location::new("A"),
            NodeId(id),
            Box::new(FixedStrategy(neighbors)),
        );
        // Drive the Idle -> Bound edge without a network.
        node.state = NodeState::Bound;
        node
    }

    #[test]
    fn test_idle_until_bound() {
        let node = Node::new(
            Location::new("A"),
            NodeId(0),
            Box::new(FixedStrategy(vec![])),
        );
        assert_eq!(node.state(), NodeState::Idle);
    }

    #[test]
    fn test_receive_activates_and_counts() {
        let mut node = test_node(1, vec![NodeId(2)]);
        node.receive_packet(Packet::new(NodeId(0), NodeId(1), MessageId(7)));

        assert_eq!(node.state(), NodeState::Active);
        assert_eq!(node.received_packet_count(), 1);
        assert_eq!(node.inbox_len(), 1);
    }

    #[test]
    fn test_tick_forwards_once_and_completes() {
        let mut node = test_node(1, vec![NodeId(0), NodeId(2), NodeId(3)]);
        node.receive_packet(Packet::new(NodeId(0), NodeId(1), MessageId(7)));

        let outbound = node.tick(5);
        // Forwards to all neighbors except the sender.
        assert_eq!(outbound.len(), 2);
        assert!(outbound.iter().all(|p| p.source == NodeId(1)));
        assert!(outbound.iter().all(|p| p.destination != NodeId(0)));
        assert_eq!(node.state(), NodeState::Completed);
        assert_eq!(node.first_receipt_tick(), Some(5));
    }

    #[test]
    fn test_completed_is_sticky() {
        let mut node = test_node(1, vec![NodeId(2), NodeId(3)]);
        node.receive_packet(Packet::new(NodeId(2), NodeId(1), MessageId(7)));
        assert_eq!(node.tick(1).len(), 1);

        // A second receipt is counted but never re-forwarded.
        node.receive_packet(Packet::new(NodeId(3), NodeId(1), MessageId(7)));
        assert!(node.tick(2).is_empty());
        assert_eq!(node.received_packet_count(), 2);
        assert_eq!(node.state(), NodeState::Completed);
        // First-receipt tick is not overwritten.
        assert_eq!(node.first_receipt_tick(), Some(1));
    }

    #[test]
    fn test_tick_with_empty_inbox_is_noop() {
        let mut node = test_node(1, vec![NodeId(2)]);
        assert!(node.tick(1).is_empty());
        assert_eq!(node.state(), NodeState::Bound);
    }

    #[test]
    fn test_one_packet_per_tick() {
        let mut node = test_node(1, vec![NodeId(2)]);
        node.receive_packet(Packet::new(NodeId(0), NodeId(1), MessageId(7)));
        node.receive_packet(Packet::new(NodeId(2), NodeId(1), MessageId(7)));

        node.tick(1);
        assert_eq!(node.inbox_len(), 1);
        node.tick(2);
        assert_eq!(node.inbox_len(), 0);
    }

    #[test]
    fn test_start_broadcast_hits_all_neighbors() {
        let mut node = test_node(0, vec![NodeId(1), NodeId(2), NodeId(3)]);
        let outbound = node.start_broadcast(MessageId(9), 0);

        assert_eq!(outbound.len(), 3);
        assert_eq!(node.state(), NodeState::Completed);
        assert_eq!(node.first_receipt_tick(), Some(0));
    }
}
