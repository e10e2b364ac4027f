//! Sampler health reporting.
//!
//! The sampler never kills the process on its own. It publishes its state
//! here, and the HTTP layer reports a degraded service instead of silently
//! serving stale data.

use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Current state of the sampling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SamplerStatus {
    /// No sample has been attempted yet.
    Starting,
    /// The last acquisition succeeded.
    Running,
    /// Recent acquisitions failed; the sampler is retrying.
    Degraded {
        /// Failures since the last success.
        consecutive_failures: u32,
        /// Message of the most recent failure.
        last_error: String,
    },
    /// The sampler gave up; no new samples will arrive.
    Stopped {
        /// Message of the failure that stopped it.
        last_error: String,
    },
}

impl SamplerStatus {
    /// Returns whether samples are still arriving on schedule.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }
}

/// Shared, cheaply cloneable view of the sampler status.
#[derive(Debug, Clone)]
pub struct Health {
    status: Arc<RwLock<SamplerStatus>>,
}

impl Health {
    /// Creates a health handle in the [`SamplerStatus::Starting`] state.
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(SamplerStatus::Starting)),
        }
    }

    /// Returns a copy of the current status.
    pub fn status(&self) -> SamplerStatus {
        self.status
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns whether the sampler is starting or running.
    pub fn is_healthy(&self) -> bool {
        self.status().is_healthy()
    }

    pub(crate) fn set(&self, status: SamplerStatus) {
        *self
            .status
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = status;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_healthy() {
        let health = Health::new();
        assert_eq!(health.status(), SamplerStatus::Starting);
        assert!(health.is_healthy());
    }

    #[test]
    fn test_clones_share_state() {
        let health = Health::new();
        let view = health.clone();

        health.set(SamplerStatus::Degraded {
            consecutive_failures: 2,
            last_error: "boom".to_string(),
        });

        assert!(!view.is_healthy());
        health.set(SamplerStatus::Running);
        assert!(view.is_healthy());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(SamplerStatus::Stopped {
            last_error: "no cpus".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "stopped", "last_error": "no cpus"}));

        let json = serde_json::to_value(SamplerStatus::Running).unwrap();
        assert_eq!(json, serde_json::json!({"state": "running"}));
    }
}
