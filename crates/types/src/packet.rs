//! The message envelope.

use crate::{MessageId, NodeId};
use std::fmt;

/// An immutable message envelope.
///
/// Created by a node when it forwards a broadcast, scheduled by the network
/// for future delivery, and consumed from the destination's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// The node that sent this packet.
    pub source: NodeId,
    /// The node this packet is addressed to.
    pub destination: NodeId,
    /// The broadcast this packet carries.
    pub message: MessageId,
}

impl Packet {
    pub fn new(source: NodeId, destination: NodeId, message: MessageId) -> Self {
        Self {
            source,
            destination,
            message,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.destination, self.message)
    }
}
