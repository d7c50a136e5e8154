//! Core types for the gossip broadcast simulator.
//!
//! This crate provides the foundational types used throughout the simulator:
//!
//! - **Identifiers**: [`NodeId`], [`MessageId`]
//! - **Geography**: [`Location`] (city plus optional cloud provider)
//! - **Traffic**: [`Packet`], the immutable message envelope
//!
//! It is self-contained with no dependencies, making it the foundation layer.

mod identifiers;
mod location;
mod packet;

pub use identifiers::{MessageId, NodeId};
pub use location::Location;
pub use packet::Packet;
