//! Single-writer / multi-reader handles over a [`RingBuffer`].
//!
//! [`channel`] splits one buffer into a [`RingWriter`], which is not `Clone`
//! and belongs to the sampler, and any number of [`RingReader`]s for query
//! handlers. Both sides share the buffer behind a read-write lock; a reader
//! holds the lock only while copying out its window.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;

use crate::config::RetentionConfig;
use crate::error::Result;
use crate::ring::{RingBuffer, Sample};

/// Creates a ring buffer for `config` and returns its writer and reader halves.
///
/// # Errors
///
/// Returns [`ConfigError`](crate::error::ConfigError) if the configuration
/// does not validate.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use ringstat::config::RetentionConfig;
/// use ringstat::ring::Sample;
/// use ringstat::shared;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(60))?;
/// let (mut writer, reader) = shared::channel(&config)?;
///
/// writer.append(Sample::new(0, 1.0));
/// assert_eq!(reader.last(Duration::from_secs(1)).len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn channel(config: &RetentionConfig) -> Result<(RingWriter, RingReader)> {
    let ring = Arc::new(RwLock::new(RingBuffer::new(config)?));

    Ok((
        RingWriter {
            ring: Arc::clone(&ring),
        },
        RingReader { ring },
    ))
}

/// The only handle that can append to a shared ring buffer.
#[derive(Debug)]
pub struct RingWriter {
    ring: Arc<RwLock<RingBuffer>>,
}

impl RingWriter {
    /// Appends a sample, overwriting the oldest one once the buffer is full.
    pub fn append(&mut self, sample: Sample) {
        self.write().push(sample);
    }

    /// Returns a new reader over the same buffer.
    pub fn reader(&self) -> RingReader {
        RingReader {
            ring: Arc::clone(&self.ring),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        // A panicking reader cannot leave the buffer half-updated
        self.ring
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Cloneable read-only handle to a shared ring buffer.
#[derive(Debug, Clone)]
pub struct RingReader {
    ring: Arc<RwLock<RingBuffer>>,
}

impl RingReader {
    /// Returns the most recent samples covering `duration`, oldest first.
    ///
    /// See [`RingBuffer::last`] for the window semantics.
    pub fn last(&self, duration: Duration) -> Vec<Sample> {
        self.read().last(duration)
    }

    /// Returns a point-in-time summary of the buffer.
    pub fn stats(&self) -> RingStats {
        let ring = self.read();

        RingStats {
            capacity: ring.capacity(),
            len: ring.len(),
            has_wrapped: ring.has_wrapped(),
            frequency_ns: u64::try_from(ring.frequency().as_nanos()).unwrap_or(u64::MAX),
            oldest_ts: ring.oldest_timestamp(),
            newest_ts: ring.newest_timestamp(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RingBuffer> {
        self.ring
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Summary of a ring buffer's fill state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RingStats {
    /// Number of slots in the buffer.
    pub capacity: usize,
    /// Number of slots holding samples.
    pub len: usize,
    /// Whether the oldest samples are being overwritten.
    pub has_wrapped: bool,
    /// Sampling interval in nanoseconds.
    pub frequency_ns: u64,
    /// Timestamp of the oldest stored sample.
    pub oldest_ts: Option<i64>,
    /// Timestamp of the newest stored sample.
    pub newest_ts: Option<i64>,
}
