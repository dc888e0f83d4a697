// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::registry::ConverterRegistry;
use crate::schema::{Schema, Type};

use std::sync::Arc;

use indexmap::IndexMap;

/// Concrete container produced by a collection bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// Ordered, exactly one element per raw value.
    Array,
    /// Ordered and de-duplicated.
    Set,
}

/// How a target type is bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// A registered converter produces the value.
    Custom,
    /// Parsed from one raw value.
    Scalar,
    /// One element bind per raw value.
    Collection {
        items: &'a Schema,
        shape: CollectionShape,
    },
    /// Members bound one by one under an extended path.
    Composite {
        name: &'a Arc<str>,
        properties: &'a IndexMap<Arc<str>, Schema>,
    },
}

/// Classify `schema`. A registered converter always wins, even over a scalar kind.
pub fn classify<'a>(schema: &'a Schema, converters: &ConverterRegistry) -> Classification<'a> {
    match schema.as_type() {
        Type::Custom { .. } => Classification::Custom,
        _ if converters.contains(&schema.type_name()) => Classification::Custom,
        Type::Boolean
        | Type::Integer { .. }
        | Type::Number { .. }
        | Type::String
        | Type::Char
        | Type::Enum { .. }
        | Type::DateTime
        | Type::Date
        | Type::Time
        | Type::Uuid => Classification::Scalar,
        Type::Array { items } => Classification::Collection {
            items,
            shape: CollectionShape::Array,
        },
        Type::Set { items } => Classification::Collection {
            items,
            shape: CollectionShape::Set,
        },
        Type::Object { name, properties } => Classification::Composite { name, properties },
    }
}
