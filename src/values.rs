// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Raw request input and its normalized view.
//!
//! The surrounding request layer supplies two ordered sources of `(key, value)` pairs: the form
//! body and the query string. Keys may carry compound-name prefixes produced by nested UI
//! controls (`ctl00$group$field`); only the final segment is significant.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Collaborator interface: the ordered raw pairs of one request.
pub trait ValueSource {
    /// Form-sourced pairs in encounter order. These take precedence.
    fn form_entries(&self) -> Vec<(&str, &str)>;

    /// Query-sourced pairs in encounter order.
    fn query_entries(&self) -> Vec<(&str, &str)>;
}

/// In-memory request input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestValues {
    form: Vec<(Arc<str>, Arc<str>)>,
    query: Vec<(Arc<str>, Arc<str>)>,
}

impl RequestValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.push_form(key, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.push_query(key, value);
        self
    }

    pub fn push_form(&mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) {
        self.form.push((key.into(), value.into()));
    }

    pub fn push_query(&mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) {
        self.query.push((key.into(), value.into()));
    }

    /// Decode `application/x-www-form-urlencoded` form body and query string.
    #[cfg(feature = "urlquery")]
    pub fn from_urlencoded(form: &str, query: &str) -> Self {
        let decode = |s: &str| -> Vec<(Arc<str>, Arc<str>)> {
            url::form_urlencoded::parse(s.trim_start_matches('?').as_bytes())
                .map(|(k, v)| (Arc::from(k.as_ref()), Arc::from(v.as_ref())))
                .collect()
        };
        Self {
            form: decode(form),
            query: decode(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_empty() && self.query.is_empty()
    }
}

impl ValueSource for RequestValues {
    fn form_entries(&self) -> Vec<(&str, &str)> {
        self.form.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect()
    }

    fn query_entries(&self) -> Vec<(&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect()
    }
}

/// Strip compound-name prefixes from a source key.
///
/// Empty segments are ignored, so `a$$b$` normalizes to `b`. A key made only of delimiters has
/// no segment to keep and is used verbatim.
pub fn normalize_key(key: &str, delimiter: char) -> &str {
    key.split(delimiter)
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or(key)
}

type ValueMap = BTreeMap<Arc<str>, Vec<Arc<str>>>;

/// Per-bind normalized snapshot of a [`ValueSource`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedValues {
    form: ValueMap,
    query: ValueMap,
}

impl NormalizedValues {
    pub fn new(source: &dyn ValueSource, delimiter: char) -> Self {
        Self {
            form: Self::normalize(source.form_entries(), delimiter),
            query: Self::normalize(source.query_entries(), delimiter),
        }
    }

    fn normalize(entries: Vec<(&str, &str)>, delimiter: char) -> ValueMap {
        let mut map = ValueMap::new();
        for (key, value) in entries {
            let key = normalize_key(key, delimiter);
            match map.get_mut(key) {
                Some(values) => values.push(value.into()),
                None => {
                    map.insert(key.into(), vec![value.into()]);
                }
            }
        }
        map
    }

    /// All raw values for `key`: form values if there are any, otherwise query values.
    /// Sources are never merged for the same key.
    pub fn get(&self, key: &str) -> &[Arc<str>] {
        match self.form.get(key) {
            Some(values) if !values.is_empty() => values,
            _ => self.query.get(key).map(Vec::as_slice).unwrap_or_default(),
        }
    }

    /// The raw value at `index` for `key`, if present.
    pub fn get_at(&self, key: &str, index: usize) -> Option<&Arc<str>> {
        self.get(key).get(index)
    }
}
