//! Configuration types for the ringstat buffer and sampler.
//!
//! These values are fixed at construction time. [`RetentionConfig`] decides
//! how many slots the ring buffer allocates; [`SamplerPolicy`] decides how
//! the sampler reacts when the metric source fails.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Maximum number of slots a ring buffer may allocate.
///
/// At 16 bytes per sample this caps the buffer at 160MB.
pub const MAX_SLOTS: usize = 10_000_000;

/// Sampling frequency and retention limit of a ring buffer.
///
/// The buffer holds `retention / frequency` samples (integer division on
/// nanoseconds). Once full, each new sample overwrites the oldest one.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ringstat::config::RetentionConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // 100ms samples kept for one minute
/// let config = RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(60))?;
/// assert_eq!(config.slot_count(), 600);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Time interval between samples.
    #[serde(with = "duration_serde")]
    pub frequency: Duration,

    /// How much history to keep.
    #[serde(with = "duration_serde")]
    pub retention: Duration,
}

impl RetentionConfig {
    /// Creates a new retention configuration.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Time between samples
    /// * `retention` - How long to retain samples
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if `frequency` is zero or
    /// larger than `retention`, and [`ConfigError::TooManySlots`] if the
    /// resulting buffer would exceed [`MAX_SLOTS`].
    pub fn new(frequency: Duration, retention: Duration) -> Result<Self> {
        let config = Self {
            frequency,
            retention,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.frequency.is_zero() || self.frequency > self.retention {
            return Err(ConfigError::InvalidConfiguration {
                frequency: self.frequency,
                retention: self.retention,
            }
            .into());
        }

        let slot_count = self.retention.as_nanos() / self.frequency.as_nanos();
        if slot_count > MAX_SLOTS as u128 {
            return Err(ConfigError::TooManySlots {
                slot_count,
                max_slots: MAX_SLOTS,
                frequency: self.frequency,
                retention: self.retention,
            }
            .into());
        }

        Ok(())
    }

    /// Computes the number of slots in the ring buffer.
    ///
    /// # Returns
    ///
    /// `retention / frequency`, or 0 if the frequency is zero. Only
    /// meaningful on a validated configuration.
    #[allow(clippy::cast_possible_truncation)] // Bounded by MAX_SLOTS after validation
    pub fn slot_count(&self) -> usize {
        let frequency_nanos = self.frequency.as_nanos();
        if frequency_nanos == 0 {
            return 0;
        }

        (self.retention.as_nanos() / frequency_nanos) as usize
    }
}

/// How the sampler reacts to acquisition failures.
///
/// Every failure is reported through [`Health`](crate::health::Health). The
/// sampler sleeps `retry_backoff` and tries again until more than
/// `max_consecutive_failures` failures happen in a row, then it stops.
/// A policy of `max_consecutive_failures: 0` stops on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplerPolicy {
    /// Consecutive failures tolerated before sampling stops.
    pub max_consecutive_failures: u32,

    /// Pause between a failed acquisition and the next attempt.
    #[serde(with = "duration_serde")]
    pub retry_backoff: Duration,
}

impl SamplerPolicy {
    /// A policy that stops sampling on the first failure.
    pub fn fail_fast() -> Self {
        Self {
            max_consecutive_failures: 0,
            retry_backoff: Duration::ZERO,
        }
    }
}

impl Default for SamplerPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}
