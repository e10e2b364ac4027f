//! Periodic sampling loop.
//!
//! A [`Sampler`] owns the [`RingWriter`] and an [`Acquire`] source. Each
//! cycle it asks the source for a value (which blocks for the sampling
//! interval), stamps it with the wall clock and appends it to the buffer.
//!
//! Acquisition failures are reported through [`Health`] and retried
//! according to the [`SamplerPolicy`]. When the policy is exhausted the loop
//! returns the error instead of terminating the process; the embedding
//! program decides whether that is fatal.

use std::convert::Infallible;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::acquire::Acquire;
use crate::config::SamplerPolicy;
use crate::error::{AcquireError, Result};
use crate::health::{Health, SamplerStatus};
use crate::ring::Sample;
use crate::shared::RingWriter;

/// Name given to the thread started by [`Sampler::spawn`].
pub const SAMPLER_THREAD_NAME: &str = "ringstat-sampler";

/// Returns the current wall-clock time in nanoseconds since the Unix epoch.
///
/// Clamps to 0 before the epoch and to `i64::MAX` past the year 2262.
pub fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
}

/// Drives an [`Acquire`] source and records its values into a ring buffer.
pub struct Sampler<A> {
    acquirer: A,
    writer: RingWriter,
    frequency: Duration,
    policy: SamplerPolicy,
    health: Health,
    clock: Box<dyn FnMut() -> i64 + Send>,
}

impl<A: Acquire> Sampler<A> {
    /// Creates a sampler with the default policy and the system clock.
    ///
    /// # Arguments
    ///
    /// * `acquirer` - Source of values; called with `frequency` each cycle
    /// * `writer` - The buffer's writer half
    /// * `frequency` - Sampling interval
    pub fn new(acquirer: A, writer: RingWriter, frequency: Duration) -> Self {
        Self {
            acquirer,
            writer,
            frequency,
            policy: SamplerPolicy::default(),
            health: Health::new(),
            clock: Box::new(now_ns),
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SamplerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reports status through an existing health handle.
    #[must_use]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Replaces the wall clock used to timestamp samples.
    #[must_use]
    pub fn with_clock(mut self, clock: impl FnMut() -> i64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Returns a handle to this sampler's health status.
    pub fn health(&self) -> Health {
        self.health.clone()
    }

    /// Runs a single sampling cycle.
    ///
    /// Blocks inside the acquisition call, then appends the stamped sample.
    /// Does not touch the health status.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError`] if the source fails; nothing is recorded.
    pub fn step(&mut self) -> std::result::Result<Sample, AcquireError> {
        let value = self.acquirer.acquire(self.frequency)?;
        let sample = Sample::new((self.clock)(), value);
        self.writer.append(sample);
        Ok(sample)
    }

    /// Samples until the failure policy is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error that stopped the loop. The health status
    /// is [`SamplerStatus::Stopped`] by then.
    pub fn run(mut self) -> Result<Infallible> {
        let mut consecutive_failures: u32 = 0;
        let mut running = false;

        loop {
            match self.step() {
                Ok(sample) => {
                    if consecutive_failures > 0 {
                        tracing::info!(consecutive_failures, "sampler recovered");
                    }
                    consecutive_failures = 0;

                    if !running {
                        self.health.set(SamplerStatus::Running);
                        running = true;
                    }

                    tracing::debug!(ts = sample.ts, value = sample.value, "recorded sample");
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    running = false;

                    if consecutive_failures > self.policy.max_consecutive_failures {
                        tracing::error!(consecutive_failures, "sampler stopped: {e}");
                        self.health.set(SamplerStatus::Stopped {
                            last_error: e.to_string(),
                        });
                        return Err(e.into());
                    }

                    tracing::warn!(
                        consecutive_failures,
                        max = self.policy.max_consecutive_failures,
                        "acquisition failed, retrying: {e}"
                    );
                    self.health.set(SamplerStatus::Degraded {
                        consecutive_failures,
                        last_error: e.to_string(),
                    });

                    if !self.policy.retry_backoff.is_zero() {
                        thread::sleep(self.policy.retry_backoff);
                    }
                }
            }
        }
    }

    /// Runs the sampling loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread could not be created.
    pub fn spawn(self) -> io::Result<JoinHandle<Result<Infallible>>>
    where
        A: 'static,
    {
        thread::Builder::new()
            .name(SAMPLER_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }
}
