// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod bindable;
mod binder;
mod classify;
mod context;
mod convert;
mod converter;
mod error;
mod number;
mod options;
pub mod registry;
mod schema;
mod value;
mod values;

pub use bindable::Bindable;
pub use binder::Binder;
pub use classify::{classify, Classification, CollectionShape};
pub use context::{BindingContext, Culture};
pub use convert::{convert_scalar, general_bind, natural_default, ConversionError};
pub use converter::{BooleanConverter, Converter};
pub use error::BindError;
pub use number::{Number, ParseNumberError};
pub use options::{BinderOptions, CycleGuard};
pub use registry::{BinderRegistry, ConverterRegistry, DefaultRegistry, RegistryError};
pub use schema::{FloatFormat, IntegerFormat, Schema, Type};
pub use value::Value;
pub use values::{normalize_key, NormalizedValues, RequestValues, ValueSource};
