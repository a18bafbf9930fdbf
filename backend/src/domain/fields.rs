//! Typed access to loosely structured request payloads.
//!
//! Survey payloads arrive as JSON objects whose keys depend on the record
//! type. [`FieldReader`] pulls one field at a time, distinguishing an absent
//! key from an explicit `null`, and reports type mismatches as field-level
//! [`Error`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value, json};

use super::Error;
use super::geometry::GeometryError;

/// Field-level validation failure.
pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// A required field was absent or null.
pub fn missing_field(field: &str) -> Error {
    invalid_field(field, "missing_field", format!("missing required field: {field}"))
}

/// A non-null reference did not match an existing record.
pub fn dangling_reference(field: &str, value: i64) -> Error {
    Error::invalid_request(format!("{field} {value} does not reference an existing record"))
        .with_details(json!({ "field": field, "code": "dangling_reference", "value": value }))
}

/// A unique column already holds the submitted value.
pub fn duplicate_value(field: &str) -> Error {
    invalid_field(field, "duplicate", format!("{field} is already in use"))
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        let message = err.to_string();
        match err {
            GeometryError::MalformedGeometry { field, reason } => Self::invalid_request(message)
                .with_details(json!({
                    "field": field,
                    "code": "malformed_geometry",
                    "reason": reason,
                })),
            GeometryError::InvalidCoordinateRange { srid, x, y } => Self::invalid_request(message)
                .with_details(json!({
                    "field": "geom",
                    "code": "invalid_coordinate_range",
                    "srid": srid.code(),
                    "x": x,
                    "y": y,
                })),
        }
    }
}

/// Tri-state field value: `None` when absent, `Some(None)` for `null`.
pub type Presence<T> = Option<Option<T>>;

/// Reads typed fields out of a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    input: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    /// Wrap `input`.
    #[must_use]
    pub const fn new(input: &'a Map<String, Value>) -> Self {
        Self { input }
    }

    fn raw(&self, field: &str) -> Presence<&'a Value> {
        match self.input.get(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => Some(Some(value)),
        }
    }

    fn read<T>(
        &self,
        field: &str,
        expected: &str,
        parse: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<Presence<T>, Error> {
        match self.raw(field) {
            None => Ok(None),
            Some(None) => Ok(Some(None)),
            Some(Some(value)) => parse(value).map(|v| Some(Some(v))).ok_or_else(|| {
                invalid_field(field, "invalid_type", format!("{field} must be {expected}"))
            }),
        }
    }

    /// Text field.
    ///
    /// # Errors
    /// Fails when the value is not a string.
    pub fn text(&self, field: &str) -> Result<Presence<String>, Error> {
        self.read(field, "a string", |value| value.as_str().map(str::to_owned))
    }

    /// Integer field; integral strings are accepted.
    ///
    /// # Errors
    /// Fails when the value is not an integer.
    pub fn integer(&self, field: &str) -> Result<Presence<i64>, Error> {
        self.read(field, "an integer", parse_integer)
    }

    /// Identifier field: a 32-bit integer.
    ///
    /// # Errors
    /// Fails when the value is not an integer or exceeds 32 bits.
    pub fn id(&self, field: &str) -> Result<Presence<i32>, Error> {
        self.read(field, "an integer identifier", |value| {
            parse_integer(value).and_then(|n| i32::try_from(n).ok())
        })
    }

    /// Floating-point field; numeric strings are accepted.
    ///
    /// # Errors
    /// Fails when the value is not a finite number.
    pub fn float(&self, field: &str) -> Result<Presence<f64>, Error> {
        self.read(field, "a number", parse_float)
    }

    /// Timestamp field in RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Fails when the value is not a recognised timestamp.
    pub fn timestamp(&self, field: &str) -> Result<Presence<DateTime<Utc>>, Error> {
        self.read(field, "a timestamp", |value| value.as_str().and_then(parse_timestamp))
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

/// Parse the timestamp formats field devices emit.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
