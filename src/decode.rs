//! Field decoding for daxtab.
//!
//! Converts raw driver fields into native [`Value`]s through a closed
//! dispatch table.

use crate::driver::RawField;
use crate::error::{DaxError, Result};
use crate::table::Value;
use chrono::{NaiveDate, NaiveDateTime};

/// Decodes a single raw driver field into a native value.
///
/// This is a total function over the known field tags; anything outside the
/// set fails with an unsupported-type error carrying the driver's type name.
/// Decimals go through a string-to-float round trip, accepting precision loss.
/// That round trip is deliberate and kept for compatibility with existing
/// consumers of the decoded output.
pub fn decode_field(raw: RawField) -> Result<Value> {
    match raw {
        RawField::Null => Ok(Value::Null),
        RawField::Int(i) => Ok(Value::Int(i)),
        RawField::Decimal(s) => {
            let f: f64 = s
                .trim()
                .parse()
                .map_err(|_| DaxError::driver(format!("Unreadable decimal value '{s}'")))?;
            Ok(Value::Float(f))
        }
        RawField::Float(f) => Ok(Value::Float(f)),
        RawField::Text(s) => Ok(Value::Text(s)),
        RawField::DateTime(s) => {
            let dt = parse_datetime(&s)
                .ok_or_else(|| DaxError::driver(format!("Unreadable date/time value '{s}'")))?;
            Ok(Value::DateTime(dt))
        }
        RawField::Bool(b) => Ok(Value::Bool(b)),
        RawField::Other { type_name } => Err(DaxError::unsupported_type(type_name)),
    }
}

/// Date/time formats tried in order, with and without time components.
/// Month-first forms come before day-first forms because the engine's default
/// rendering is en-US; ambiguous strings resolve that way.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Best-effort parse of an engine-rendered date/time string.
///
/// Tolerates the common locale-ambiguous renderings a permissive parser
/// would; date-only strings get a midnight time component.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}
