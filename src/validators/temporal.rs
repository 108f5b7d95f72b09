//! ISO-8601 date and time strings.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::error::Error;

use super::traits::{must_be, Validator};

/// Which calendar value a [`Temporal`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    /// `2024-02-29`
    Date,
    /// RFC 3339 (`2024-02-29T10:00:00Z`), or the same without an offset.
    Datetime,
    /// `10:00:00`, with optional fractional seconds.
    Time,
}

impl TemporalKind {
    fn name(self) -> &'static str {
        match self {
            TemporalKind::Date => "date",
            TemporalKind::Datetime => "datetime",
            TemporalKind::Time => "time",
        }
    }

    fn parses(self, s: &str) -> bool {
        match self {
            TemporalKind::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            TemporalKind::Datetime => {
                DateTime::parse_from_rfc3339(s).is_ok()
                    || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            }
            TemporalKind::Time => NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok(),
        }
    }
}

/// Accepts strings holding a valid calendar date, datetime or time of day.
///
/// The string is checked, never rewritten: adapting returns it unchanged.
///
/// # Example
///
/// ```rust
/// use shapecheck::Validator;
/// use shapecheck::validators::Temporal;
/// use serde_json::json;
///
/// let date = Temporal::date();
/// assert!(date.is_valid(&json!("2024-02-29")));
/// assert!(!date.is_valid(&json!("2023-02-29")));
///
/// let err = date.validate(&json!(20240229), false).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, "must be date");
/// ```
#[derive(Debug, Clone)]
pub struct Temporal {
    kind: TemporalKind,
}

impl Temporal {
    pub fn new(kind: TemporalKind) -> Self {
        Self { kind }
    }

    pub fn date() -> Self {
        Self::new(TemporalKind::Date)
    }

    pub fn datetime() -> Self {
        Self::new(TemporalKind::Datetime)
    }

    pub fn time() -> Self {
        Self::new(TemporalKind::Time)
    }
}

impl Validator for Temporal {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        match value.as_str() {
            Some(s) if self.kind.parses(s) => Ok(Cow::Borrowed(value)),
            _ => Err(must_be(self.kind.name(), value)),
        }
    }

    fn humanized_name(&self) -> String {
        self.kind.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date() {
        let v = Temporal::date();
        assert!(v.is_valid(&json!("2024-02-29")));
        assert!(v.is_valid(&json!("1999-12-31")));
        assert!(!v.is_valid(&json!("2023-02-29")));
        assert!(!v.is_valid(&json!("2024-13-01")));
        assert!(!v.is_valid(&json!("2024-02-29T10:00:00")));
        assert!(!v.is_valid(&json!("")));
        assert!(!v.is_valid(&json!(null)));
    }

    #[test]
    fn test_datetime_with_and_without_offset() {
        let v = Temporal::datetime();
        assert!(v.is_valid(&json!("2024-02-29T10:00:00Z")));
        assert!(v.is_valid(&json!("2024-02-29T10:00:00.5+02:00")));
        assert!(v.is_valid(&json!("2024-02-29T10:00:00")));
        assert!(!v.is_valid(&json!("2024-02-29")));
        assert!(!v.is_valid(&json!("2024-02-30T10:00:00Z")));
        assert!(!v.is_valid(&json!(1709200800)));
    }

    #[test]
    fn test_time() {
        let v = Temporal::time();
        assert!(v.is_valid(&json!("10:00:00")));
        assert!(v.is_valid(&json!("23:59:59.250")));
        assert!(!v.is_valid(&json!("24:00:00")));
        assert!(!v.is_valid(&json!("10:00")));
        assert!(!v.is_valid(&json!("10:00:00Z")));
    }

    #[test]
    fn test_adapt_leaves_string_untouched() {
        let value = json!("2024-02-29T10:00:00Z");
        let adapted = Temporal::datetime().validate(&value, true).unwrap();
        assert!(matches!(adapted, Cow::Borrowed(_)));
    }

    #[test]
    fn test_reason_names_the_kind() {
        let err = Temporal::time().validate(&json!("noon"), false).unwrap_err();
        let first = err.first().unwrap();
        assert_eq!(first.reason, "must be time");
        assert_eq!(first.value, Some(json!("noon")));
        assert_eq!(Temporal::datetime().humanized_name(), "datetime");
    }
}
