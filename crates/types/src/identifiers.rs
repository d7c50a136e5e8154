//! Newtype identifiers.

use std::fmt;

/// Unique identifier for a node in the simulated network.
///
/// Node ids are dense indices into the network roster: the structured-cycle
/// strategy relies on them being `0..n` so that modular stride arithmetic
/// maps onto real nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into roster-ordered collections.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identifier for a broadcast message.
///
/// A broadcast carries no payload in the simulation; the id is the opaque
/// tag nodes use to tell broadcasts apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}
