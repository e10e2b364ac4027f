//! Metric acquisition boundary.
//!
//! The sampler does not know where values come from. It calls
//! [`Acquire::acquire`] with the sampling interval, and the implementation
//! blocks for about that long before returning one value. The blocking call
//! is what paces the sampling loop; there is no separate timer.

use std::time::Duration;

use crate::error::AcquireError;

/// A source of scalar metric values.
///
/// Closures of type `FnMut(Duration) -> Result<f64, AcquireError>` implement
/// this trait, which keeps tests free of OS bindings:
///
/// ```rust
/// use std::time::Duration;
/// use ringstat::acquire::Acquire;
/// use ringstat::error::AcquireError;
///
/// let mut next = 0.0;
/// let mut fake = move |_interval: Duration| -> Result<f64, AcquireError> {
///     next += 1.0;
///     Ok(next)
/// };
///
/// assert_eq!(fake.acquire(Duration::ZERO), Ok(1.0));
/// assert_eq!(fake.acquire(Duration::ZERO), Ok(2.0));
/// ```
pub trait Acquire: Send {
    /// Blocks for about `interval` and returns one value.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError`] if the underlying source could not be read.
    fn acquire(&mut self, interval: Duration) -> Result<f64, AcquireError>;
}

impl<F> Acquire for F
where
    F: FnMut(Duration) -> Result<f64, AcquireError> + Send,
{
    fn acquire(&mut self, interval: Duration) -> Result<f64, AcquireError> {
        self(interval)
    }
}
