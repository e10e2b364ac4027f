//! Ring buffer implementation for ringstat sample storage.
//!
//! This module provides the fixed-capacity circular store that holds the most
//! recent samples and answers "last N time-units" window queries.
//!
//! # Key Features
//!
//! - Allocation-free write path: slots are allocated once at construction
//! - Wraparound detection and handling for reads
//! - Lazy iterators returning samples in chronological order
//! - Unwritten slots are never returned
//!
//! # Design
//!
//! - Write cursor (`head`) is the index of the next slot to be written
//! - `has_wrapped` flips once every slot has been written at least once
//! - Reads linearize `[head, size)` followed by `[0, head)` when wrapped,
//!   otherwise only `[0, head)`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RetentionConfig;
use crate::error::Result;

/// One `(timestamp, value)` observation.
///
/// Serializes as `{"ts": <i64>, "value": <f64>}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock time of the observation, nanoseconds since the Unix epoch.
    pub ts: i64,
    /// The observed value.
    pub value: f64,
}

impl Sample {
    /// Creates a new sample.
    pub fn new(ts: i64, value: f64) -> Self {
        Self { ts, value }
    }
}

/// A fixed-capacity circular buffer of samples.
///
/// Once every slot has been written, each append overwrites the oldest
/// sample. Window queries are quantized to the configured sampling frequency.
///
/// # Thread Safety
///
/// `RingBuffer` itself is not synchronized. Share it between one writer and
/// many readers through [`shared::channel`](crate::shared::channel).
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// Sample slots, zero-valued until written.
    slots: Vec<Sample>,
    /// Index of the next slot to be written.
    head: usize,
    /// Whether every slot has been written at least once.
    has_wrapped: bool,
    /// Sampling interval the buffer was sized for.
    frequency: Duration,
}

impl RingBuffer {
    /// Creates an empty ring buffer sized for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if the
    /// configuration does not validate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use ringstat::config::RetentionConfig;
    /// use ringstat::ring::RingBuffer;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(60))?;
    /// let ring = RingBuffer::new(&config)?;
    /// assert_eq!(ring.capacity(), 600);
    /// assert!(ring.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &RetentionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            slots: vec![Sample::default(); config.slot_count()],
            head: 0,
            has_wrapped: false,
            frequency: config.frequency,
        })
    }

    /// Writes a sample into the slot at the write cursor.
    ///
    /// This is the hot path and performs no allocation. When the cursor
    /// completes its first lap the buffer is marked wrapped; from then on
    /// every push evicts the oldest sample.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::time::Duration;
    /// # use ringstat::config::RetentionConfig;
    /// # use ringstat::ring::{RingBuffer, Sample};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = RetentionConfig::new(Duration::from_secs(1), Duration::from_secs(10))?;
    /// let mut ring = RingBuffer::new(&config)?;
    ///
    /// // CPU at 42.5% one second after the epoch
    /// ring.push(Sample::new(1_000_000_000, 42.5));
    /// assert_eq!(ring.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn push(&mut self, sample: Sample) {
        let size = self.slots.len();

        self.slots[self.head] = sample;

        if self.head + 1 == size {
            self.has_wrapped = true;
        }
        self.head = (self.head + 1) % size;
    }

    /// Returns the most recent samples covering `duration`, oldest first.
    ///
    /// The window holds `duration / frequency` samples (integer division).
    /// When that count is at least the number of stored samples, everything
    /// stored is returned. A `duration` shorter than one sampling interval
    /// yields a count of zero, which also returns everything stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::time::Duration;
    /// # use ringstat::config::RetentionConfig;
    /// # use ringstat::ring::{RingBuffer, Sample};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = RetentionConfig::new(Duration::from_secs(1), Duration::from_secs(10))?;
    /// let mut ring = RingBuffer::new(&config)?;
    /// for i in 1..=5 {
    ///     ring.push(Sample::new(i * 1_000_000_000, i as f64));
    /// }
    ///
    /// let window = ring.last(Duration::from_secs(2));
    /// assert_eq!(window.len(), 2);
    /// assert_eq!(window[0].value, 4.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn last(&self, duration: Duration) -> Vec<Sample> {
        let available = self.len();
        let count = self.window_count(duration);

        let skip = if count == 0 || count >= available {
            0
        } else {
            available - count
        };

        RingIterator::new(self, skip).collect()
    }

    /// Number of samples a window of `duration` covers.
    fn window_count(&self, duration: Duration) -> usize {
        let count = duration.as_nanos() / self.frequency.as_nanos();
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Returns an iterator over all stored samples in chronological order.
    pub fn iter(&self) -> RingIterator<'_> {
        RingIterator::new(self, 0)
    }

    /// Returns the number of slots in the buffer.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots that contain written samples.
    pub fn len(&self) -> usize {
        if self.has_wrapped {
            self.slots.len()
        } else {
            self.head
        }
    }

    /// Returns whether no sample has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether the buffer has wrapped around.
    ///
    /// # Returns
    ///
    /// `true` if every slot has been written at least once.
    pub fn has_wrapped(&self) -> bool {
        self.has_wrapped
    }

    /// Returns the sampling interval the buffer was sized for.
    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    /// Returns the timestamp of the oldest stored sample.
    ///
    /// This is the sample that will be overwritten next once the buffer is full.
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.iter().next().map(|sample| sample.ts)
    }

    /// Returns the timestamp of the newest stored sample.
    pub fn newest_timestamp(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }

        let size = self.slots.len();
        let newest_slot = (self.head + size - 1) % size;
        Some(self.slots[newest_slot].ts)
    }
}

/// Iterator over the samples of a ring buffer.
///
/// Handles wraparound and yields samples in chronological order (oldest to
/// newest). Unwritten slots are never visited.
#[derive(Debug)]
pub struct RingIterator<'a> {
    ring: &'a RingBuffer,
    current_slot: usize,
    slots_remaining: usize,
}

impl<'a> RingIterator<'a> {
    /// Creates an iterator that skips the `skip` oldest samples.
    fn new(ring: &'a RingBuffer, skip: usize) -> Self {
        let available = ring.len();
        let skip = skip.min(available);

        // When wrapped, the oldest sample sits at the write cursor
        let start_slot = if ring.has_wrapped { ring.head } else { 0 };
        let current_slot = if available == 0 {
            0
        } else {
            (start_slot + skip) % ring.slots.len()
        };

        Self {
            ring,
            current_slot,
            slots_remaining: available - skip,
        }
    }
}

impl Iterator for RingIterator<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slots_remaining == 0 {
            return None;
        }

        let sample = self.ring.slots[self.current_slot];
        self.current_slot = (self.current_slot + 1) % self.ring.slots.len();
        self.slots_remaining -= 1;

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots_remaining, Some(self.slots_remaining))
    }
}

impl ExactSizeIterator for RingIterator<'_> {}

impl<'a> IntoIterator for &'a RingBuffer {
    type Item = Sample;
    type IntoIter = RingIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
