//! Pairwise latency and loss model.
//!
//! [`LatencyModel`] answers two questions about any pair of node locations:
//! how many ticks a packet takes to travel between them, and with what
//! probability it is lost on the way. Both are pure lookups over an
//! immutable table fixed at construction.
//!
//! Provider awareness: when locations carry a cloud-provider tag, traffic
//! between differing providers is penalized by configurable multipliers.

mod config;
mod model;

pub use config::{LatencyConfig, LatencyError};
pub use model::{LatencyModel, LatencyTable};
