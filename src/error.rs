// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

/// Errors that abort a bind.
///
/// Malformed or missing input never shows up here: a raw value that cannot be converted
/// resolves to the target's default instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A scalar, or a collection of composites, was requested without a parameter name.
    #[error("a parameter name is required to bind `{type_name}`")]
    MissingParameterName { type_name: Arc<str> },

    /// The target needs a custom converter and none is registered for its identity.
    #[error("no converter registered for type `{type_name}`")]
    ConverterNotFound { type_name: Arc<str> },

    /// Nested binds went deeper than the configured ceiling.
    #[error("binding `{path}` exceeded the maximum depth of {limit}")]
    DepthExceeded { path: Arc<str>, limit: usize },

    /// The bound value does not fit the requested Rust type.
    #[error("could not materialize `{type_name}`: {message}")]
    Materialize {
        type_name: Arc<str>,
        message: Arc<str>,
    },
}
