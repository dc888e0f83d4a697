// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations, clippy::pattern_type_mismatch)] // registry internals are not debug logged

use crate::bindable::Bindable;
use crate::convert::natural_default;
use crate::converter::{BooleanConverter, Converter};
use crate::error::BindError;
use crate::schema::Schema;
use crate::value::Value;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::debug;
use serde::Serialize;

#[cfg(test)]
mod tests {
    mod converters;
    mod core;
    mod defaults;
}

/// Errors that can occur when interacting with a Registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{registry} registration failed: The name '{name}' is invalid (empty or whitespace-only names are not allowed).")]
    InvalidName { name: Arc<str>, registry: Arc<str> },

    #[error("{registry} registration failed: default for '{name}' could not be captured: {message}")]
    InvalidValue {
        name: Arc<str>,
        registry: Arc<str>,
        message: Arc<str>,
    },
}

/// Validates that a name is not empty or whitespace-only.
pub fn validate_name(name: &str, registry_name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        Err(RegistryError::InvalidName {
            name: Arc::from(name),
            registry: Arc::from(registry_name),
        })
    } else {
        Ok(())
    }
}

/// Generic thread-safe registry keyed by type identity.
///
/// Lookups are hash lookups on the exact identity string. Registering an identity that is
/// already present replaces the previous item.
pub struct Registry<T: ?Sized> {
    inner: DashMap<Arc<str>, Arc<T>>,
    name: Arc<str>,
}

impl<T: ?Sized> Registry<T> {
    /// Create a new, empty registry with a given name.
    pub fn new(registry_name: impl Into<Arc<str>>) -> Self {
        Self {
            inner: DashMap::new(),
            name: registry_name.into(),
        }
    }

    /// Get the name of this registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an item, returning the one it replaced.
    pub fn register(
        &self,
        name: impl Into<Arc<str>>,
        item: Arc<T>,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        let name = name.into();
        validate_name(&name, &self.name)?;
        Ok(self.inner.insert(name, item))
    }

    /// Retrieve an item by name, if it exists.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.inner.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove an item by name. Returns the removed item if it existed.
    pub fn remove(&self, name: &str) -> Option<Arc<T>> {
        self.inner.remove(name).map(|(_, v)| v)
    }

    /// List all registered item names.
    pub fn list_names(&self) -> Vec<Arc<str>> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Check if an item with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Get the number of registered items.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all items from the registry.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

/// Builds the converter instance for a registration.
pub type ConverterFactory = dyn Fn() -> Arc<dyn Converter> + Send + Sync;

/// One registration: its factory and the instance built from it on first use.
///
/// Re-registering an identity swaps the whole slot, so an instance can never outlive the
/// factory it came from.
struct ConverterSlot {
    factory: Box<ConverterFactory>,
    instance: OnceLock<Arc<dyn Converter>>,
}

impl ConverterSlot {
    fn instance(&self) -> Arc<dyn Converter> {
        Arc::clone(self.instance.get_or_init(|| (self.factory)()))
    }
}

/// Type identity -> converter, with one lazily created instance per registration.
pub struct ConverterRegistry {
    slots: Registry<ConverterSlot>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            slots: Registry::new("CONVERTER_REGISTRY"),
        }
    }

    /// Install `C` for `type_name`. `C` is constructed on first use.
    pub fn register<C>(&self, type_name: impl Into<Arc<str>>) -> Result<(), RegistryError>
    where
        C: Converter + Default + 'static,
    {
        self.register_factory(
            type_name,
            Box::new(|| Arc::new(C::default()) as Arc<dyn Converter>),
        )
    }

    /// Install an existing converter instance for `type_name`.
    pub fn register_instance(
        &self,
        type_name: impl Into<Arc<str>>,
        converter: Arc<dyn Converter>,
    ) -> Result<(), RegistryError> {
        self.register_factory(type_name, Box::new(move || Arc::clone(&converter)))
    }

    fn register_factory(
        &self,
        type_name: impl Into<Arc<str>>,
        factory: Box<ConverterFactory>,
    ) -> Result<(), RegistryError> {
        let type_name = type_name.into();
        let slot = Arc::new(ConverterSlot {
            factory,
            instance: OnceLock::new(),
        });
        if self.slots.register(type_name.clone(), slot)?.is_some() {
            debug!("replacing converter for `{type_name}`");
        }
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.slots.contains(type_name)
    }

    /// The shared converter instance for `type_name`.
    pub fn get(&self, type_name: &str) -> Result<Arc<dyn Converter>, BindError> {
        self.slots
            .get(type_name)
            .map(|slot| slot.instance())
            .ok_or_else(|| BindError::ConverterNotFound {
                type_name: type_name.into(),
            })
    }

    pub fn remove(&self, type_name: &str) -> bool {
        self.slots.remove(type_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Type identity -> fallback value.
pub struct DefaultRegistry {
    values: Registry<Value>,
}

impl DefaultRegistry {
    pub fn new() -> Self {
        Self {
            values: Registry::new("DEFAULT_VALUE_REGISTRY"),
        }
    }

    pub fn register(&self, type_name: impl Into<Arc<str>>, value: Value) -> Result<(), RegistryError> {
        self.values.register(type_name, Arc::new(value))?;
        Ok(())
    }

    /// Registered default, or the natural zero value of `schema`.
    pub fn get(&self, schema: &Schema) -> Value {
        match self.values.get(&schema.type_name()) {
            Some(value) => value.as_ref().clone(),
            None => natural_default(schema),
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.values.contains(type_name)
    }

    pub fn remove(&self, type_name: &str) -> Option<Value> {
        self.values.remove(type_name).map(|v| v.as_ref().clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for DefaultRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Converters and defaults consulted by a [`crate::Binder`].
///
/// Registration is typically done once at startup; the registry is then shared read-mostly by
/// every bind. All operations take `&self`.
pub struct BinderRegistry {
    converters: ConverterRegistry,
    defaults: DefaultRegistry,
}

impl BinderRegistry {
    /// A registry seeded with the built-in boolean converter.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry
            .converters
            .register_instance("bool", Arc::new(BooleanConverter))
            .unwrap_or_else(|e| unreachable!("{e}"));
        registry
    }

    /// A registry with no converters or defaults.
    pub fn empty() -> Self {
        Self {
            converters: ConverterRegistry::new(),
            defaults: DefaultRegistry::new(),
        }
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn defaults(&self) -> &DefaultRegistry {
        &self.defaults
    }

    /// Install `C` as the converter for `T`.
    pub fn register_converter<T, C>(&self) -> Result<(), RegistryError>
    where
        T: Bindable,
        C: Converter + Default + 'static,
    {
        self.converters.register::<C>(T::schema().type_name())
    }

    /// Install `value` as the default of `T`.
    pub fn register_default<T>(&self, value: T) -> Result<(), RegistryError>
    where
        T: Bindable + Serialize,
    {
        let type_name = T::schema().type_name();
        let value = Value::from_serialize(&value).map_err(|e| RegistryError::InvalidValue {
            name: type_name.clone(),
            registry: Arc::from(self.defaults.values.name()),
            message: e.to_string().into(),
        })?;
        self.defaults.register(type_name, value)
    }

    pub fn get_converter(&self, type_name: &str) -> Result<Arc<dyn Converter>, BindError> {
        self.converters.get(type_name)
    }

    pub fn get_default(&self, schema: &Schema) -> Value {
        self.defaults.get(schema)
    }
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instances
pub mod instances {
    use super::*;

    lazy_static::lazy_static! {
        /// Process-wide registry, seeded like [`BinderRegistry::new`].
        pub static ref BINDER_REGISTRY: Arc<BinderRegistry> = Arc::new(BinderRegistry::new());
    }

    /// Shared handle to the process-wide registry.
    pub fn global() -> Arc<BinderRegistry> {
        Arc::clone(&BINDER_REGISTRY)
    }
}
