//! Latency model configuration.

use thiserror::Error;

/// Configuration for a [`LatencyModel`](crate::LatencyModel).
#[derive(Debug, Clone)]
pub struct LatencyConfig {
    /// Cloud providers hosting each city. When non-empty, the model's
    /// location roster is the cross product of cities and providers.
    pub provider_list: Vec<String>,
    /// Latency multiplier applied when two locations sit on different
    /// providers.
    pub cross_provider_latency_multiplier: f64,
    /// Loss multiplier applied when two locations sit on different
    /// providers.
    pub cross_provider_loss_multiplier: f64,
    /// Loss ratio at zero latency. Loss is disabled when `max_loss == 0`.
    pub min_loss: f64,
    /// Loss ratio at the largest latency in the table.
    pub max_loss: f64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            provider_list: Vec::new(),
            cross_provider_latency_multiplier: 1.0,
            cross_provider_loss_multiplier: 1.0,
            min_loss: 0.0,
            max_loss: 0.0,
        }
    }
}

/// Errors surfaced while constructing a [`LatencyModel`](crate::LatencyModel).
#[derive(Debug, Error)]
pub enum LatencyError {
    /// `min_loss` must not exceed `max_loss`.
    #[error("invalid loss range: min_loss {min} > max_loss {max}")]
    InvalidLossRange { min: f64, max: f64 },

    /// Latencies are durations; the table must not contain negative entries.
    #[error("negative latency {latency} between {from} and {to}")]
    NegativeLatency {
        from: String,
        to: String,
        latency: f64,
    },
}
