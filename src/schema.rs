// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

//! Type descriptors for binding targets.
//!
//! A [`Schema`] tells the binder what shape a value has without any runtime type introspection:
//! a scalar kind, a uniform collection of some element schema, a composite with an ordered table
//! of members, or a type that can only be produced by a registered converter.
//!
//! Schemas are usually obtained from [`crate::Bindable::schema`], built with the constructors on
//! [`Schema`], or deserialized from a JSON document discriminated by `type`:
//!
//! ```json
//! {
//!   "type": "object",
//!   "name": "Order",
//!   "properties": {
//!     "Id":       { "type": "integer", "format": "int32" },
//!     "Express":  "bool",
//!     "Quantity": { "type": "array", "items": { "type": "integer" } }
//!   }
//! }
//! ```
//!
//! A bare string such as `"bool"` or `"i32"` is accepted wherever a schema is expected and names
//! one of the built-in scalar identities.
//!
//! Schemas are immutable and shared behind `Arc`, so one descriptor can serve any number of
//! concurrent binds.
use core::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};


/// Width and signedness of an integer scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerFormat {
    Int8,
    Int16,
    Int32,
    #[default]
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntegerFormat {
    pub fn type_name(&self) -> &'static str {
        match self {
            IntegerFormat::Int8 => "i8",
            IntegerFormat::Int16 => "i16",
            IntegerFormat::Int32 => "i32",
            IntegerFormat::Int64 => "i64",
            IntegerFormat::Uint8 => "u8",
            IntegerFormat::Uint16 => "u16",
            IntegerFormat::Uint32 => "u32",
            IntegerFormat::Uint64 => "u64",
        }
    }

    /// Inclusive range of representable values.
    pub fn range(&self) -> (i128, i128) {
        match self {
            IntegerFormat::Int8 => (i8::MIN.into(), i8::MAX.into()),
            IntegerFormat::Int16 => (i16::MIN.into(), i16::MAX.into()),
            IntegerFormat::Int32 => (i32::MIN.into(), i32::MAX.into()),
            IntegerFormat::Int64 => (i64::MIN.into(), i64::MAX.into()),
            IntegerFormat::Uint8 => (0, u8::MAX.into()),
            IntegerFormat::Uint16 => (0, u16::MAX.into()),
            IntegerFormat::Uint32 => (0, u32::MAX.into()),
            IntegerFormat::Uint64 => (0, u64::MAX.into()),
        }
    }
}

/// Precision of a floating point scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    Float,
    #[default]
    Double,
}

impl FloatFormat {
    pub fn type_name(&self) -> &'static str {
        match self {
            FloatFormat::Float => "f32",
            FloatFormat::Double => "f64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
// Use `type` when deserializing to discriminate between different types.
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
// Raise error if unsupported fields are encountered.
#[serde(deny_unknown_fields)]
pub enum Type {
    Boolean,

    Integer {
        #[serde(default)]
        format: IntegerFormat,
    },

    Number {
        #[serde(default)]
        format: FloatFormat,
    },

    String,

    Char,

    /// Closed set of named values. The first declared value is the natural default.
    Enum {
        name: Arc<str>,
        values: Arc<Vec<Arc<str>>>,
    },

    DateTime,

    Date,

    Time,

    Uuid,

    /// A type that only a registered converter knows how to produce.
    Custom { name: Arc<str> },

    Array { items: Schema },

    Set { items: Schema },

    /// Composite bound member by member.
    Object {
        name: Arc<str>,
        #[serde(default)]
        properties: Arc<IndexMap<Arc<str>, Schema>>,
    },
}

/// Shared, immutable type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    t: Arc<Type>,
}

impl Schema {
    pub fn new(t: Type) -> Self {
        Schema { t: Arc::new(t) }
    }

    /// Returns a reference to the underlying type definition.
    pub fn as_type(&self) -> &Type {
        &self.t
    }

    pub fn boolean() -> Self {
        Self::new(Type::Boolean)
    }

    pub fn integer(format: IntegerFormat) -> Self {
        Self::new(Type::Integer { format })
    }

    pub fn number(format: FloatFormat) -> Self {
        Self::new(Type::Number { format })
    }

    pub fn string() -> Self {
        Self::new(Type::String)
    }

    pub fn char() -> Self {
        Self::new(Type::Char)
    }

    pub fn enumeration<I, S>(name: impl Into<Arc<str>>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::new(Type::Enum {
            name: name.into(),
            values: Arc::new(values.into_iter().map(Into::into).collect()),
        })
    }

    pub fn date_time() -> Self {
        Self::new(Type::DateTime)
    }

    pub fn date() -> Self {
        Self::new(Type::Date)
    }

    pub fn time() -> Self {
        Self::new(Type::Time)
    }

    pub fn uuid() -> Self {
        Self::new(Type::Uuid)
    }

    pub fn custom(name: impl Into<Arc<str>>) -> Self {
        Self::new(Type::Custom { name: name.into() })
    }

    pub fn array(items: Schema) -> Self {
        Self::new(Type::Array { items })
    }

    pub fn set(items: Schema) -> Self {
        Self::new(Type::Set { items })
    }

    /// Composite with members bound in declaration order.
    pub fn object<I, S>(name: impl Into<Arc<str>>, members: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<Arc<str>>,
    {
        Self::new(Type::Object {
            name: name.into(),
            properties: Arc::new(members.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        })
    }

    /// Resolve one of the built-in scalar identities, e.g. `"bool"`, `"u16"`, `"String"`.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let t = match name {
            "bool" => Type::Boolean,
            "i8" => Type::Integer {
                format: IntegerFormat::Int8,
            },
            "i16" => Type::Integer {
                format: IntegerFormat::Int16,
            },
            "i32" => Type::Integer {
                format: IntegerFormat::Int32,
            },
            "i64" => Type::Integer {
                format: IntegerFormat::Int64,
            },
            "u8" => Type::Integer {
                format: IntegerFormat::Uint8,
            },
            "u16" => Type::Integer {
                format: IntegerFormat::Uint16,
            },
            "u32" => Type::Integer {
                format: IntegerFormat::Uint32,
            },
            "u64" => Type::Integer {
                format: IntegerFormat::Uint64,
            },
            "f32" => Type::Number {
                format: FloatFormat::Float,
            },
            "f64" => Type::Number {
                format: FloatFormat::Double,
            },
            "String" => Type::String,
            "char" => Type::Char,
            "DateTime" => Type::DateTime,
            "Date" => Type::Date,
            "Time" => Type::Time,
            "Uuid" => Type::Uuid,
            _ => return None,
        };
        Some(Self::new(t))
    }

    /// Identity used by the converter and default registries.
    ///
    /// Two schemas with the same identity share registrations; there is no structural or
    /// inheritance-based matching beyond this string.
    pub fn type_name(&self) -> Arc<str> {
        match self.as_type() {
            Type::Boolean => "bool".into(),
            Type::Integer { format } => format.type_name().into(),
            Type::Number { format } => format.type_name().into(),
            Type::String => "String".into(),
            Type::Char => "char".into(),
            Type::DateTime => "DateTime".into(),
            Type::Date => "Date".into(),
            Type::Time => "Time".into(),
            Type::Uuid => "Uuid".into(),
            Type::Enum { name, .. } | Type::Custom { name } | Type::Object { name, .. } => {
                name.clone()
            }
            Type::Array { items } => format!("[{}]", items.type_name()).into(),
            Type::Set { items } => format!("Set<{}>", items.type_name()).into(),
        }
    }

    /// Last path segment of the identity (`app::forms::Point` -> `Point`).
    pub fn simple_name(&self) -> Arc<str> {
        let full = self.type_name();
        match full.rsplit(|c: char| c == '.' || c == ':').next() {
            Some(last) if !last.is_empty() && last.len() != full.len() => last.into(),
            _ => full,
        }
    }

    /// Element schema of a collection.
    pub fn items(&self) -> Option<&Schema> {
        match self.as_type() {
            Type::Array { items } | Type::Set { items } => Some(items),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.as_type(), Type::Object { .. })
    }

    /// Parse a schema document.
    pub fn from_serde_json_value(schema: serde_json::Value) -> Result<Self> {
        serde_json::from_value::<Schema>(schema).map_err(|e| anyhow!("Failed to parse schema: {e}"))
    }

    /// Parse a schema document from a string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str::<Schema>(s).map_err(|e| anyhow!("Failed to parse schema: {e}"))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A schema document: a bare scalar name or a full type description.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Name(String),
    Type(Type),
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let t = match SchemaDocument::deserialize(deserializer)? {
            SchemaDocument::Name(name) => {
                return Schema::from_type_name(&name).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown scalar type name `{name}`"))
                });
            }
            SchemaDocument::Type(t) => t,
        };
        if let Type::Object { name, .. } | Type::Enum { name, .. } | Type::Custom { name } = &t {
            if name.trim().is_empty() {
                return Err(serde::de::Error::custom("type name must not be empty"));
            }
        }
        Ok(Schema::new(t))
    }
}
