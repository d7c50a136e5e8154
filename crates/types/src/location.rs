//! Geographic locations, optionally tagged with a cloud provider.

use std::fmt;

/// Where a node lives.
///
/// A location is a lookup key into the latency model: a city name plus an
/// optional cloud provider. Two nodes in the same city on different
/// providers see inflated latency/loss (cross-provider multipliers).
///
/// Rendered as `"city"` or `"city (provider)"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    city: String,
    provider: Option<String>,
}

impl Location {
    /// A bare city location.
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            provider: None,
        }
    }

    /// A city hosted by a specific provider.
    pub fn with_provider(city: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            provider: Some(provider.into()),
        }
    }

    /// The city name (the latency table key).
    pub fn city(&self) -> &str {
        &self.city
    }

    /// The provider tag, if any.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Whether two locations sit on different providers.
    ///
    /// Untagged locations never count as cross-provider.
    pub fn crosses_provider(&self, other: &Location) -> bool {
        match (&self.provider, &other.provider) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{} ({})", self.city, provider),
            None => write!(f, "{}", self.city),
        }
    }
}
