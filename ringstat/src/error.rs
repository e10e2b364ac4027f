//! Error types for the ringstat sampling buffer.

use std::time::Duration;

use thiserror::Error;

/// The main error type for all ringstat operations.
///
/// This enum covers every failure that can surface from the library, from
/// validating the retention configuration to acquiring samples and parsing
/// window requests.
#[derive(Error, Debug)]
pub enum RingstatError {
    /// Error validating the retention configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error acquiring a sample from the metric source.
    #[error("acquire error: {0}")]
    Acquire(#[from] AcquireError),

    /// Error parsing a window request (read path).
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Errors that can occur when validating a retention configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The sampling frequency is larger than the retention limit, or zero.
    #[error("invalid configuration: retention ({retention:?}) must be >= frequency ({frequency:?}) and frequency must be non-zero")]
    InvalidConfiguration {
        /// The sampling interval.
        frequency: Duration,
        /// The retention limit.
        retention: Duration,
    },

    /// Retention / frequency would result in too many slots.
    #[error("retention {retention:?} / frequency {frequency:?} would need {slot_count} slots (max {max_slots})")]
    TooManySlots {
        /// The computed slot count.
        slot_count: u128,
        /// The maximum allowed slots.
        max_slots: usize,
        /// The sampling interval.
        frequency: Duration,
        /// The retention limit.
        retention: Duration,
    },
}

/// Error returned by a metric source when no value could be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct AcquireError {
    /// Description of what went wrong.
    pub reason: String,
}

impl AcquireError {
    /// Creates an acquire error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while parsing a window request.
///
/// The messages are what the HTTP layer reports after its `bad request: `
/// prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No query parameter was supplied.
    #[error("missing query param")]
    MissingParam,

    /// A parameter name other than `ns`, `ms` or `s` was supplied.
    #[error("unknown query param: {name}")]
    UnknownParam {
        /// The unrecognized parameter name.
        name: String,
    },

    /// More than one distinct unit parameter was supplied.
    #[error("multiple query params")]
    MultipleParams,

    /// The unit parameter was repeated.
    #[error("invalid query param value")]
    InvalidValueCount,

    /// The unit parameter value is not an unsigned integer.
    #[error("invalid query param value: {raw}")]
    InvalidValue {
        /// The value as received.
        raw: String,
    },
}

/// Type alias for `Result<T, RingstatError>`.
pub type Result<T> = std::result::Result<T, RingstatError>;
