// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! String to scalar conversion.
//!
//! Conversion is permissive on purpose: [`general_bind`] swallows every [`ConversionError`] and
//! substitutes the target's default, so one malformed field never aborts a whole bind. Callers
//! who need strict validation must check bound values themselves.

use crate::context::{BindingContext, Culture};
use crate::number::Number;
use crate::schema::{FloatFormat, IntegerFormat, Schema, Type};
use crate::value::Value;

use std::sync::Arc;

use log::debug;

/// Why a raw value could not be converted. Never surfaced by a bind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("`{raw}` is not a valid {type_name}")]
    Invalid { raw: Arc<str>, type_name: Arc<str> },

    #[error("`{raw}` is out of range for {type_name}")]
    OutOfRange { raw: Arc<str>, type_name: Arc<str> },

    #[error("{type_name} cannot be converted from text")]
    Unsupported { type_name: Arc<str> },
}

impl ConversionError {
    fn invalid(raw: &str, schema: &Schema) -> Self {
        ConversionError::Invalid {
            raw: raw.into(),
            type_name: schema.type_name(),
        }
    }
}

/// Value used when nothing is registered for a type.
pub fn natural_default(schema: &Schema) -> Value {
    match schema.as_type() {
        Type::Boolean => Value::Bool(false),
        Type::Integer { .. } => Value::from(0u64),
        Type::Number { .. } => Value::from(0.0),
        Type::String => Value::from(""),
        Type::Char => Value::from("\0"),
        Type::Enum { values, .. } => values
            .first()
            .map_or(Value::Null, |v| Value::String(v.clone())),
        Type::DateTime => Value::from("0001-01-01T00:00:00"),
        Type::Date => Value::from("0001-01-01"),
        Type::Time => Value::from("00:00:00"),
        Type::Uuid => Value::from("00000000-0000-0000-0000-000000000000"),
        Type::Custom { .. } | Type::Array { .. } | Type::Set { .. } | Type::Object { .. } => {
            Value::Null
        }
    }
}

/// Bind the scalar leaf described by `context`.
///
/// Blank input yields the default; so does input that fails to convert.
pub fn general_bind(context: &BindingContext) -> Value {
    let raw = match context.raw_value() {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return context.default_value().clone(),
    };

    match convert_scalar(context.schema(), raw, context.culture()) {
        Ok(value) => value,
        Err(e) => {
            debug!("`{}`: {e}; falling back to default", context.name());
            context.default_value().clone()
        }
    }
}

/// Convert non-blank `raw` text into a value of the scalar `schema`.
///
/// The text is first parsed directly as the destination type. If that fails it is read as a
/// JSON literal and that representation is coerced, which accepts forms such as `"5"` or
/// `1e3` for integers.
pub fn convert_scalar(schema: &Schema, raw: &str, culture: &Culture) -> Result<Value, ConversionError> {
    match convert_into(schema, raw, culture) {
        Ok(value) => Ok(value),
        Err(e @ ConversionError::Unsupported { .. }) => Err(e),
        Err(e) => convert_from_representation(schema, raw, culture).ok_or(e),
    }
}

fn convert_into(schema: &Schema, raw: &str, culture: &Culture) -> Result<Value, ConversionError> {
    let text = raw.trim();
    match schema.as_type() {
        Type::Boolean => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| ConversionError::invalid(raw, schema)),
        Type::Integer { format } => parse_integer(text, *format, schema),
        Type::Number { format } => parse_float(text, *format, culture, schema),
        Type::String => Ok(Value::from(raw)),
        Type::Char => parse_char(raw)
            .map(|c| Value::from(c.to_string()))
            .ok_or_else(|| ConversionError::invalid(raw, schema)),
        Type::Enum { values, .. } => parse_enum(text, values)
            .map(Value::String)
            .ok_or_else(|| ConversionError::invalid(raw, schema)),
        Type::DateTime => temporal::date_time(text, schema),
        Type::Date => temporal::date(text, schema),
        Type::Time => temporal::time(text, schema),
        Type::Uuid => identifier::uuid(text, schema),
        Type::Custom { .. } | Type::Array { .. } | Type::Set { .. } | Type::Object { .. } => {
            Err(ConversionError::Unsupported {
                type_name: schema.type_name(),
            })
        }
    }
}

fn convert_from_representation(schema: &Schema, raw: &str, culture: &Culture) -> Option<Value> {
    let literal: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    match (schema.as_type(), &literal) {
        (_, serde_json::Value::String(s)) if s.as_str() != raw => {
            convert_into(schema, s, culture).ok()
        }
        (Type::Boolean, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
        (Type::Integer { format }, serde_json::Value::Number(n)) => {
            let n: Number = n.to_string().parse().ok()?;
            let v = n.as_i128()?;
            let (min, max) = format.range();
            (min..=max).contains(&v).then(|| integer_value(v))
        }
        (Type::Number { format }, serde_json::Value::Number(n)) => {
            let f = n.as_f64()?;
            float_in_range(f, *format).then(|| Value::from(f))
        }
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn integer_value(v: i128) -> Value {
    match (u64::try_from(v), i64::try_from(v)) {
        (Ok(u), _) => Value::from(u),
        (_, Ok(i)) => Value::from(i),
        _ => Value::from(v as f64),
    }
}

fn parse_integer(text: &str, format: IntegerFormat, schema: &Schema) -> Result<Value, ConversionError> {
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('#'));
    let parsed = match hex {
        Some(digits) => u64::from_str_radix(digits, 16).map(i128::from).ok(),
        None => text.parse::<i128>().ok(),
    };

    let v = parsed.ok_or_else(|| ConversionError::invalid(text, schema))?;
    let (min, max) = format.range();
    if (min..=max).contains(&v) {
        Ok(integer_value(v))
    } else {
        Err(ConversionError::OutOfRange {
            raw: text.into(),
            type_name: schema.type_name(),
        })
    }
}

fn float_in_range(f: f64, format: FloatFormat) -> bool {
    match format {
        FloatFormat::Double => f.is_finite(),
        FloatFormat::Float => f.is_finite() && f.abs() <= f64::from(f32::MAX),
    }
}

fn parse_float(
    text: &str,
    format: FloatFormat,
    culture: &Culture,
    schema: &Schema,
) -> Result<Value, ConversionError> {
    let normalized = if culture.is_invariant() {
        text.to_string()
    } else {
        text.replace(culture.decimal_separator, ".")
    };

    let f = normalized
        .parse::<f64>()
        .map_err(|_| ConversionError::invalid(text, schema))?;
    if float_in_range(f, format) {
        Ok(Value::from(f))
    } else {
        Err(ConversionError::OutOfRange {
            raw: text.into(),
            type_name: schema.type_name(),
        })
    }
}

fn parse_char(raw: &str) -> Option<char> {
    let text = if raw.chars().count() > 1 { raw.trim() } else { raw };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_enum(text: &str, values: &[Arc<str>]) -> Option<Arc<str>> {
    if let Some(v) = values.iter().find(|v| v.eq_ignore_ascii_case(text)) {
        return Some(v.clone());
    }
    text.parse::<usize>()
        .ok()
        .and_then(|ordinal| values.get(ordinal))
        .cloned()
}

#[cfg(feature = "time")]
mod temporal {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

    fn parse_date(text: &str) -> Option<NaiveDate> {
        DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
    }

    pub(super) fn date_time(text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        let parsed = DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| {
                DATE_TIME_FORMATS
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
            })
            .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)));

        parsed
            .map(|dt| Value::from(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .ok_or_else(|| ConversionError::invalid(text, schema))
    }

    pub(super) fn date(text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        parse_date(text)
            .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| ConversionError::invalid(text, schema))
    }

    pub(super) fn time(text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        TIME_FORMATS
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
            .map(|t| Value::from(t.format("%H:%M:%S%.f").to_string()))
            .ok_or_else(|| ConversionError::invalid(text, schema))
    }
}

#[cfg(not(feature = "time"))]
mod temporal {
    use super::*;

    fn unsupported(schema: &Schema) -> Result<Value, ConversionError> {
        Err(ConversionError::Unsupported {
            type_name: schema.type_name(),
        })
    }

    pub(super) fn date_time(_text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        unsupported(schema)
    }

    pub(super) fn date(_text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        unsupported(schema)
    }

    pub(super) fn time(_text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        unsupported(schema)
    }
}

mod identifier {
    use super::*;

    #[cfg(feature = "uuid")]
    pub(super) fn uuid(text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        uuid::Uuid::parse_str(text)
            .map(|u| Value::from(u.hyphenated().to_string()))
            .map_err(|_| ConversionError::invalid(text, schema))
    }

    #[cfg(not(feature = "uuid"))]
    pub(super) fn uuid(_text: &str, schema: &Schema) -> Result<Value, ConversionError> {
        Err(ConversionError::Unsupported {
            type_name: schema.type_name(),
        })
    }
}
