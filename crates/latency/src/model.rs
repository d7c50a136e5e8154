//! The latency/loss lookup table.

use crate::{LatencyConfig, LatencyError};
use gossipsim_types::Location;
use std::collections::BTreeMap;
use tracing::info;

/// Symmetric city-pair latency table, in ticks.
///
/// `table[a][b]` is the one-way latency from city `a` to city `b`. Callers
/// are expected to provide a symmetric table including the zero diagonal.
pub type LatencyTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Pure lookup of pairwise latency and loss probability.
///
/// Immutable once constructed. Loss ratios are interpolated linearly
/// between `min_loss` and `max_loss` as a function of latency relative to
/// the largest latency observed in the table, so longer links lose more
/// packets.
#[derive(Debug, Clone)]
pub struct LatencyModel {
    table: LatencyTable,
    config: LatencyConfig,
    /// Largest latency in the table; scales loss interpolation.
    max_latency: f64,
    has_loss: bool,
}

impl LatencyModel {
    /// Build a model from a city-pair table and configuration.
    ///
    /// Fails when `min_loss > max_loss` or the table contains a negative
    /// latency.
    pub fn new(table: LatencyTable, config: LatencyConfig) -> Result<Self, LatencyError> {
        if config.min_loss > config.max_loss {
            return Err(LatencyError::InvalidLossRange {
                min: config.min_loss,
                max: config.max_loss,
            });
        }

        let mut max_latency: f64 = 0.0;
        for (from, row) in &table {
            for (to, &latency) in row {
                if latency < 0.0 {
                    return Err(LatencyError::NegativeLatency {
                        from: from.clone(),
                        to: to.clone(),
                        latency,
                    });
                }
                max_latency = max_latency.max(latency);
            }
        }

        let has_loss = config.max_loss > 0.0;

        info!(
            cities = table.len(),
            providers = config.provider_list.len(),
            max_latency,
            has_loss,
            "Built latency model"
        );

        Ok(Self {
            table,
            config,
            max_latency,
            has_loss,
        })
    }

    /// Whether this model drops packets at all.
    pub fn has_loss(&self) -> bool {
        self.has_loss
    }

    /// Largest latency in the table.
    pub fn max_latency(&self) -> f64 {
        self.max_latency
    }

    /// All locations this model can answer for.
    ///
    /// With providers configured this is the cross product of cities and
    /// providers; otherwise the bare cities.
    pub fn locations(&self) -> Vec<Location> {
        if self.config.provider_list.is_empty() {
            self.table.keys().map(Location::new).collect()
        } else {
            self.table
                .keys()
                .flat_map(|city| {
                    self.config
                        .provider_list
                        .iter()
                        .map(move |provider| Location::with_provider(city, provider))
                })
                .collect()
        }
    }

    /// Whether a location's city is present in the table.
    pub fn knows(&self, location: &Location) -> bool {
        self.table.contains_key(location.city())
    }

    /// One-way latency between two locations, in ticks.
    ///
    /// The base city-pair latency is multiplied by the cross-provider
    /// factor when the two locations sit on different providers.
    ///
    /// # Panics
    ///
    /// Panics if either location's city is missing from the table. The
    /// network validates its roster against [`Self::knows`] at
    /// initialization, so this is unreachable in a well-formed simulation.
    pub fn get_latency(&self, a: &Location, b: &Location) -> f64 {
        let base = self.base_latency(a, b);
        if a.crosses_provider(b) {
            base * self.config.cross_provider_latency_multiplier
        } else {
            base
        }
    }

    /// Probability that a packet between the two locations is lost.
    ///
    /// Zero when loss is disabled. Otherwise interpolates between
    /// `min_loss` and `max_loss` proportionally to the base city-pair
    /// latency, then applies the cross-provider loss multiplier when the
    /// providers differ.
    pub fn get_loss_ratio(&self, a: &Location, b: &Location) -> f64 {
        if !self.has_loss {
            return 0.0;
        }

        let base = self.base_latency(a, b);
        let scale = if self.max_latency > 0.0 {
            base / self.max_latency
        } else {
            0.0
        };
        let base_loss =
            self.config.min_loss + (self.config.max_loss - self.config.min_loss) * scale;

        if a.crosses_provider(b) {
            base_loss * self.config.cross_provider_loss_multiplier
        } else {
            base_loss
        }
    }

    fn base_latency(&self, a: &Location, b: &Location) -> f64 {
        self.table
            .get(a.city())
            .and_then(|row| row.get(b.city()))
            .copied()
            .unwrap_or_else(|| panic!("no latency entry for {a} -> {b}"))
    }
}
