//! Simulation error types.

use gossipsim_types::{Location, NodeId};
use thiserror::Error;

/// Errors surfaced while configuring or driving a simulation.
///
/// All of these are synchronous configuration errors; once a simulation is
/// initialized and running, the core has no failure paths.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A strategy was asked for more distinct neighbors than the roster
    /// can supply.
    #[error("degree {degree} too large for roster with {peers} peers")]
    DegreeTooLarge { degree: usize, peers: usize },

    /// The simulation was driven before `Network::initialize`.
    #[error("network not initialized")]
    NotInitialized,

    /// `Network::initialize` was called twice.
    #[error("network already initialized")]
    AlreadyInitialized,

    /// A node's location is not covered by the latency model.
    #[error("location {0} is not covered by the latency model")]
    UnknownLocation(Location),

    /// A node id that is not part of the roster.
    #[error("{0} is not part of the roster")]
    UnknownNode(NodeId),

    /// Node ids must be dense roster indices (`node-0 .. node-{n-1}`, in
    /// order); stride arithmetic in the structured strategy depends on it.
    #[error("roster position {position} holds {found}, expected node-{position}")]
    RosterMismatch { position: usize, found: NodeId },
}
