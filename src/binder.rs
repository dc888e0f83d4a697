// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::bindable::Bindable;
use crate::classify::{classify, Classification, CollectionShape};
use crate::context::BindingContext;
use crate::convert::general_bind;
use crate::converter::Converter;
use crate::error::BindError;
use crate::options::{BinderOptions, CycleGuard};
use crate::registry::{instances, BinderRegistry, RegistryError};
use crate::schema::Schema;
use crate::value::Value;
use crate::values::{NormalizedValues, ValueSource};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The binding engine.
///
/// A `Binder` is cheap to clone and safe to share; every bind call works on its own normalized
/// snapshot of the input, while converters and defaults come from the shared registry.
#[derive(Clone)]
pub struct Binder {
    registry: Arc<BinderRegistry>,
    options: BinderOptions,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// A binder with its own seeded registry and default options.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(BinderRegistry::new()))
    }

    pub fn with_registry(registry: Arc<BinderRegistry>) -> Self {
        Self {
            registry,
            options: BinderOptions::default(),
        }
    }

    /// A binder over the process-wide registry.
    pub fn global() -> Self {
        Self::with_registry(instances::global())
    }

    pub fn with_options(mut self, options: BinderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<BinderRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Install `C` as the converter for `T`, replacing any previous one.
    pub fn register_converter<T, C>(&self) -> Result<(), RegistryError>
    where
        T: Bindable,
        C: Converter + Default + 'static,
    {
        self.registry.register_converter::<T, C>()
    }

    /// Install `value` as the fallback of `T`, replacing any previous one.
    pub fn register_default<T>(&self, value: T) -> Result<(), RegistryError>
    where
        T: Bindable + Serialize,
    {
        self.registry.register_default(value)
    }

    pub fn classify<'a>(&self, schema: &'a Schema) -> Classification<'a> {
        classify(schema, self.registry.converters())
    }

    /// Bind the root value of `T`, with an empty parameter path.
    pub fn bind_root<T>(&self, source: &dyn ValueSource) -> Result<T, BindError>
    where
        T: Bindable + DeserializeOwned,
    {
        self.bind(source, "")
    }

    /// Bind a `T` under `name`.
    ///
    /// Collections without input materialize as empty; see [`Bindable::fill_absent`].
    pub fn bind<T>(&self, source: &dyn ValueSource, name: &str) -> Result<T, BindError>
    where
        T: Bindable + DeserializeOwned,
    {
        let schema = T::schema();
        let value = T::fill_absent(self.bind_value(source, &schema, name)?);
        value.to_typed::<T>().map_err(|e| BindError::Materialize {
            type_name: schema.type_name(),
            message: e.to_string().into(),
        })
    }

    /// Bind a value described by `schema` under `name`.
    pub fn bind_value(
        &self,
        source: &dyn ValueSource,
        schema: &Schema,
        name: &str,
    ) -> Result<Value, BindError> {
        let session = Session {
            registry: &self.registry,
            options: &self.options,
            values: NormalizedValues::new(source, self.options.key_delimiter),
        };
        let context = BindingContext::new(schema.clone(), name, self.options.culture.clone());
        session.bind(context)
    }
}

/// One top-level bind: the shared configuration plus this request's normalized input.
struct Session<'a> {
    registry: &'a BinderRegistry,
    options: &'a BinderOptions,
    values: NormalizedValues,
}

impl Session<'_> {
    fn lookup(&self, name: &str) -> &[Arc<str>] {
        let values = self.values.get(name);
        if values.is_empty() && self.options.leaf_name_fallback {
            if let Some((_, leaf)) = name.rsplit_once('.') {
                if !leaf.is_empty() {
                    return self.values.get(leaf);
                }
            }
        }
        values
    }

    fn bind(&self, context: BindingContext) -> Result<Value, BindError> {
        if context.depth > self.options.max_depth {
            return Err(BindError::DepthExceeded {
                path: context.name.clone(),
                limit: self.options.max_depth,
            });
        }

        let schema = context.schema.clone();
        let classification = classify(&schema, self.registry.converters());
        trace!(
            "binding `{}`[{}] as {} ({classification:?})",
            context.name,
            context.index,
            schema.type_name()
        );

        match classification {
            Classification::Custom => self.bind_custom(context),
            Classification::Scalar => self.bind_scalar(context),
            Classification::Collection { items, shape } => {
                self.bind_collection(context, items, shape)
            }
            Classification::Composite { properties, .. } => {
                self.bind_composite(context, properties)
            }
        }
    }

    fn bind_custom(&self, mut context: BindingContext) -> Result<Value, BindError> {
        let type_name = context.schema.type_name();
        let converter = self.registry.get_converter(&type_name)?;
        context.default_value = self.registry.get_default(&context.schema);
        context.raw_value = self.lookup(&context.name).get(context.index).cloned();
        Ok(converter.convert(&context))
    }

    fn bind_scalar(&self, mut context: BindingContext) -> Result<Value, BindError> {
        if context.name.trim().is_empty() {
            return Err(BindError::MissingParameterName {
                type_name: context.schema.type_name(),
            });
        }
        context.default_value = self.registry.get_default(&context.schema);
        context.raw_value = self.lookup(&context.name).get(context.index).cloned();
        Ok(general_bind(&context))
    }

    fn bind_collection(
        &self,
        context: BindingContext,
        items: &Schema,
        shape: CollectionShape,
    ) -> Result<Value, BindError> {
        let composite_items = matches!(
            classify(items, self.registry.converters()),
            Classification::Composite { .. }
        );
        if composite_items && context.name.trim().is_empty() {
            return Err(BindError::MissingParameterName {
                type_name: context.schema.type_name(),
            });
        }

        let count = self.lookup(&context.name).len();
        if count == 0 {
            return Ok(self.registry.get_default(&context.schema));
        }

        let mut elements = Vec::with_capacity(count);
        for index in 0..count {
            let element = context.child(items.clone(), context.name.clone(), index);
            elements.push(self.bind(element)?);
        }

        Ok(match shape {
            CollectionShape::Array => Value::from(elements),
            CollectionShape::Set => Value::from(elements.into_iter().collect::<BTreeSet<_>>()),
        })
    }

    fn bind_composite(
        &self,
        mut context: BindingContext,
        properties: &IndexMap<Arc<str>, Schema>,
    ) -> Result<Value, BindError> {
        let type_name = context.schema.type_name();
        let rejected = match self.options.cycle_guard {
            CycleGuard::TypeName => {
                !context.name.is_empty() && *context.name != *context.schema.simple_name()
            }
            CycleGuard::VisitedTypes => context.visited.contains(&type_name),
        };
        if rejected {
            debug!(
                "not binding `{}` as {type_name}: rejected by {:?} cycle guard",
                context.name, self.options.cycle_guard
            );
            return Ok(Value::Null);
        }
        context.visited.push(type_name);

        let mut fields = BTreeMap::new();
        for (member, member_schema) in properties.iter() {
            let path: Arc<str> = if context.name.is_empty() {
                member.clone()
            } else {
                format!("{}.{member}", context.name).into()
            };
            let member_context = context.child(member_schema.clone(), path, context.index);
            fields.insert(Value::String(member.clone()), self.bind(member_context)?);
        }

        Ok(Value::from(fields))
    }
}
