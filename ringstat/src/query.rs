//! Window request parsing for the read path.
//!
//! A window request names its time unit with the parameter *name* and the
//! amount with its *value*: `ns=<n>`, `ms=<n>` or `s=<n>`. Exactly one such
//! parameter is accepted. Parameters are checked in this order:
//!
//! 1. none at all → [`QueryError::MissingParam`]
//! 2. any name other than `ns`, `ms`, `s` (first one in request order) →
//!    [`QueryError::UnknownParam`]
//! 3. two different unit names → [`QueryError::MultipleParams`]
//! 4. the unit name repeated → [`QueryError::InvalidValueCount`]
//! 5. a value that is not an unsigned integer → [`QueryError::InvalidValue`]
//!
//! # Example Usage
//!
//! ```rust
//! use std::time::Duration;
//! use ringstat::query::parse_window;
//!
//! let request = parse_window(&[("ms", "300")]).unwrap();
//! assert_eq!(request.duration(), Duration::from_millis(300));
//!
//! let err = parse_window(&[("foo", "1")]).unwrap_err();
//! assert_eq!(err.to_string(), "unknown query param: foo");
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::QueryError;

/// Time unit of a window request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// `ns`
    Nanos,
    /// `ms`
    Millis,
    /// `s`
    Secs,
}

impl TimeUnit {
    /// Looks up the unit selected by a query parameter name.
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "ns" => Some(Self::Nanos),
            "ms" => Some(Self::Millis),
            "s" => Some(Self::Secs),
            _ => None,
        }
    }

    /// Returns the query parameter name for this unit.
    pub fn param(self) -> &'static str {
        match self {
            Self::Nanos => "ns",
            Self::Millis => "ms",
            Self::Secs => "s",
        }
    }

    /// Returns `count` of this unit as a duration.
    pub fn duration(self, count: u64) -> Duration {
        match self {
            Self::Nanos => Duration::from_nanos(count),
            Self::Millis => Duration::from_millis(count),
            Self::Secs => Duration::from_secs(count),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// A validated "last N units" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    /// Unit selected by the parameter name.
    pub unit: TimeUnit,
    /// Amount parsed from the parameter value.
    pub count: u64,
}

impl WindowRequest {
    /// Returns the requested window length.
    pub fn duration(&self) -> Duration {
        self.unit.duration(self.count)
    }
}

/// Parses query parameters, in request order, into a window request.
///
/// # Errors
///
/// Returns [`QueryError`] describing the first rule the parameters break,
/// following the order documented at module level.
pub fn parse_window<K, V>(pairs: &[(K, V)]) -> Result<WindowRequest, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let Some((first_name, first_value)) = pairs.first() else {
        return Err(QueryError::MissingParam);
    };

    if let Some((name, _)) = pairs
        .iter()
        .find(|(name, _)| TimeUnit::from_param(name.as_ref()).is_none())
    {
        return Err(QueryError::UnknownParam {
            name: name.as_ref().to_string(),
        });
    }

    let first_name = first_name.as_ref();
    if pairs.iter().any(|(name, _)| name.as_ref() != first_name) {
        return Err(QueryError::MultipleParams);
    }

    if pairs.len() != 1 {
        return Err(QueryError::InvalidValueCount);
    }

    let Some(unit) = TimeUnit::from_param(first_name) else {
        return Err(QueryError::UnknownParam {
            name: first_name.to_string(),
        });
    };

    let raw = first_value.as_ref();
    let count = raw.parse::<u64>().map_err(|_| QueryError::InvalidValue {
        raw: raw.to_string(),
    })?;

    Ok(WindowRequest { unit, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PARAMS: [(&str, &str); 0] = [];

    #[test]
    fn test_units() {
        assert_eq!(
            parse_window(&[("ns", "1500")]).unwrap().duration(),
            Duration::from_nanos(1500)
        );
        assert_eq!(
            parse_window(&[("ms", "300")]).unwrap().duration(),
            Duration::from_millis(300)
        );
        assert_eq!(
            parse_window(&[("s", "60")]).unwrap().duration(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_param_round_trip() {
        for unit in [TimeUnit::Nanos, TimeUnit::Millis, TimeUnit::Secs] {
            assert_eq!(TimeUnit::from_param(unit.param()), Some(unit));
        }
        assert_eq!(TimeUnit::from_param("m"), None);
        assert_eq!(TimeUnit::Millis.to_string(), "ms");
    }

    #[test]
    fn test_missing_param() {
        assert_eq!(parse_window(&NO_PARAMS), Err(QueryError::MissingParam));
    }

    #[test]
    fn test_unknown_param() {
        assert_eq!(
            parse_window(&[("foo", "1")]),
            Err(QueryError::UnknownParam {
                name: "foo".to_string()
            })
        );

        // Unknown names win over any recognized ones, regardless of position
        assert_eq!(
            parse_window(&[("ms", "1"), ("bar", "2"), ("baz", "3")]),
            Err(QueryError::UnknownParam {
                name: "bar".to_string()
            })
        );
    }

    #[test]
    fn test_multiple_params() {
        assert_eq!(
            parse_window(&[("ms", "300"), ("s", "1")]),
            Err(QueryError::MultipleParams)
        );
        assert_eq!(
            parse_window(&[("s", "1"), ("s", "2"), ("ns", "3")]),
            Err(QueryError::MultipleParams)
        );
    }

    #[test]
    fn test_repeated_param() {
        assert_eq!(
            parse_window(&[("ms", "1"), ("ms", "2")]),
            Err(QueryError::InvalidValueCount)
        );
        assert_eq!(
            QueryError::InvalidValueCount.to_string(),
            "invalid query param value"
        );
    }

    #[test]
    fn test_invalid_values() {
        for raw in ["abc", "", "-5", "1.5", "10ms"] {
            assert_eq!(
                parse_window(&[("ms", raw)]),
                Err(QueryError::InvalidValue {
                    raw: raw.to_string()
                })
            );
        }

        let err = parse_window(&[("ms", "abc")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid query param value: abc");
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let request = parse_window(&[("s", "18446744073709551615")]).unwrap();
        assert_eq!(request.duration(), Duration::from_secs(u64::MAX));

        let request = parse_window(&[("ms", "18446744073709551615")]).unwrap();
        assert_eq!(request.count, u64::MAX);
    }

    #[test]
    fn test_accepts_owned_pairs() {
        let pairs = vec![("ns".to_string(), "7".to_string())];
        assert_eq!(parse_window(&pairs).unwrap(), WindowRequest {
            unit: TimeUnit::Nanos,
            count: 7,
        });
    }
}
