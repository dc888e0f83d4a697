// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::schema::Schema;
use crate::value::Value;

use std::sync::Arc;

use serde::Deserialize;

/// Locale information used when parsing raw text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Culture {
    pub name: Arc<str>,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

fn default_decimal_separator() -> char {
    '.'
}

impl Culture {
    pub fn invariant() -> Self {
        Self {
            name: "invariant".into(),
            decimal_separator: '.',
        }
    }

    pub fn new(name: impl Into<Arc<str>>, decimal_separator: char) -> Self {
        Self {
            name: name.into(),
            decimal_separator,
        }
    }

    pub fn is_invariant(&self) -> bool {
        self.decimal_separator == '.'
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

/// State of one step of a bind.
///
/// A fresh context is derived for every collection element and composite member, so each
/// recursive step sees its own target, path and index.
#[derive(Debug, Clone)]
pub struct BindingContext {
    pub(crate) schema: Schema,
    pub(crate) name: Arc<str>,
    pub(crate) culture: Culture,
    pub(crate) raw_value: Option<Arc<str>>,
    pub(crate) default_value: Value,
    pub(crate) index: usize,
    pub(crate) depth: usize,
    pub(crate) visited: Vec<Arc<str>>,
}

impl BindingContext {
    pub fn new(schema: Schema, name: impl Into<Arc<str>>, culture: Culture) -> Self {
        Self {
            schema,
            name: name.into(),
            culture,
            raw_value: None,
            default_value: Value::Null,
            index: 0,
            depth: 0,
            visited: Vec::new(),
        }
    }

    /// Target type of this step.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Dotted parameter path; empty at the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    /// Raw text picked for this step, if the input has one at [`Self::index`].
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Registered or natural default of the target type.
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Position of the element being bound within a multi-valued input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of nested binds between the root and this step.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn with_raw_value(mut self, raw_value: Option<&str>) -> Self {
        self.raw_value = raw_value.map(Into::into);
        self
    }

    pub fn with_default_value(mut self, default_value: Value) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Context for a nested bind of `schema` under `name`.
    pub(crate) fn child(&self, schema: Schema, name: Arc<str>, index: usize) -> Self {
        Self {
            schema,
            name,
            culture: self.culture.clone(),
            raw_value: None,
            default_value: Value::Null,
            index,
            depth: self.depth + 1,
            visited: self.visited.clone(),
        }
    }
}
