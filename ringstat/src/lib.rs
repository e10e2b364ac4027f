//! # ringstat
//!
//! Bounded in-memory history for a periodically sampled metric.
//!
//! ringstat samples one scalar value (CPU utilization, queue depth, ...) at a
//! fixed frequency, keeps the most recent `retention / frequency` samples in a
//! circular buffer and answers "give me the last N time-units" queries in
//! chronological order, even after the buffer has wrapped.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Fixed memory: size is determined by configuration, not data volume
//! - One writer, many readers, enforced by ownership of [`RingWriter`]
//! - Pluggable metric source via the [`Acquire`] trait
//! - Acquisition failures are reported through [`Health`], never by aborting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ringstat::{AcquireError, RetentionConfig, Sampler, shared};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 100ms samples kept for one minute
//! let config = RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(60))?;
//! let (writer, reader) = shared::channel(&config)?;
//!
//! // A source that blocks for the interval and returns one value
//! let source = |interval: Duration| -> Result<f64, AcquireError> {
//!     std::thread::sleep(interval);
//!     Ok(42.0)
//! };
//!
//! let sampler = Sampler::new(source, writer, config.frequency);
//! let health = sampler.health();
//! sampler.spawn()?;
//!
//! // Query the last 5 seconds
//! for sample in reader.last(Duration::from_secs(5)) {
//!     println!("{}: {}", sample.ts, sample.value);
//! }
//! assert!(health.is_healthy());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Retention and sampler policy configuration
//! - [`ring`]: Ring buffer and chronological iteration
//! - [`shared`]: Writer/reader handles over a shared buffer
//! - [`acquire`]: Metric source trait
//! - [`sampler`]: Periodic sampling loop
//! - [`health`]: Sampler status reporting
//! - [`query`]: Window request parsing
//! - [`error`]: Error types

pub mod acquire;
pub mod config;
pub mod error;
pub mod health;
pub mod query;
pub mod ring;
pub mod sampler;
pub mod shared;

// Re-export primary API types at crate root for convenience.
pub use acquire::Acquire;
pub use config::{RetentionConfig, SamplerPolicy};
pub use error::{AcquireError, QueryError, Result, RingstatError};
pub use health::{Health, SamplerStatus};
pub use query::{TimeUnit, WindowRequest, parse_window};
pub use ring::{RingBuffer, Sample};
pub use sampler::Sampler;
pub use shared::{RingReader, RingStats, RingWriter};
