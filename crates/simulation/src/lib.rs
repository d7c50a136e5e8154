//! Deterministic discrete-event simulator for gossip broadcast.
//!
//! A [`Network`] owns a roster of [`Node`]s, a latency model, and a list of
//! in-flight packets ordered by arrival tick. Time advances in whole-tick
//! increments: each [`Network::tick`] delivers every due packet and then
//! gives every node one round of local processing, in roster order. Given
//! the same seed, a simulation produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Network                        │
//! │                                                     │
//! │  ┌────────────────────────────────────────────────┐ │
//! │  │  in-flight packets, sorted by (arrival, seq)   │ │
//! │  └──────────────────────┬─────────────────────────┘ │
//! │                         │ deliver due               │
//! │                         ▼                           │
//! │  ┌────────────────────────────────────────────────┐ │
//! │  │  nodes: Vec<Node>, ticked in roster order      │ │
//! │  │  each forwards per its bound Strategy          │ │
//! │  └──────────────────────┬─────────────────────────┘ │
//! │                         │ outbound packets          │
//! │                         ▼                           │
//! │            Network::send → schedule arrival         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Neighbor selection is pluggable via the [`Strategy`] trait; the provided
//! variants are random, latency-greedy, half-greedy, and the structured
//! multi-cycle topology built from modular stride search.

mod error;
mod network;
mod node;
mod runner;
mod strategy;
mod structured;

pub use error::SimulationError;
pub use network::{Adjacency, DeliverAll, DropByRatio, LossPolicy, Network};
pub use node::{Node, NodeState};
pub use runner::{run_simulation, NodeReport, SimulationReport};
pub use strategy::{
    BindContext, GreedyStrategy, HalfGreedyStrategy, RandomStrategy, Strategy,
};
pub use structured::StructuredCycleStrategy;
