// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::context::BindingContext;
use crate::value::Value;

/// A conversion strategy registered for one type identity.
///
/// One instance is created per registration and shared by every concurrent bind of that type,
/// so implementations must not keep per-call state. `convert` cannot fail: when the raw value
/// is unusable the strategy returns [`BindingContext::default_value`].
pub trait Converter: Send + Sync {
    fn convert(&self, context: &BindingContext) -> Value;
}

impl<F> Converter for F
where
    F: Fn(&BindingContext) -> Value + Send + Sync,
{
    fn convert(&self, context: &BindingContext) -> Value {
        self(context)
    }
}

/// Checkbox-friendly booleans.
///
/// `true`/`True`/`1`/`on` map to `true`. Anything else that is present, including blank text,
/// maps to `false`. A missing or empty raw value yields the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn convert(&self, context: &BindingContext) -> Value {
        match context.raw_value() {
            Some(raw) if !raw.is_empty() => {
                Value::Bool(matches!(raw.trim(), "True" | "true" | "1" | "on"))
            }
            _ => context.default_value().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Culture;
    use crate::schema::Schema;

    fn convert(raw: Option<&str>, default: bool) -> Value {
        let context = BindingContext::new(Schema::boolean(), "flag", Culture::invariant())
            .with_raw_value(raw)
            .with_default_value(Value::Bool(default));
        BooleanConverter.convert(&context)
    }

    #[test]
    fn truthy_values() {
        for raw in ["true", "True", "1", "on", " on "] {
            assert_eq!(convert(Some(raw), false), Value::Bool(true), "{raw}");
        }
    }

    #[test]
    fn falsy_and_unknown_values() {
        for raw in ["false", "False", "0", "off", "  ", "yes", "TRUE", "2"] {
            assert_eq!(convert(Some(raw), true), Value::Bool(false), "{raw}");
        }
    }

    #[test]
    fn missing_value_yields_default() {
        assert_eq!(convert(None, true), Value::Bool(true));
        assert_eq!(convert(Some(""), true), Value::Bool(true));
    }

    #[test]
    fn closures_are_converters() {
        let upper = |context: &BindingContext| match context.raw_value() {
            Some(raw) => Value::from(raw.to_uppercase()),
            None => context.default_value().clone(),
        };
        let context = BindingContext::new(Schema::custom("Code"), "code", Culture::invariant())
            .with_raw_value(Some("ab"));
        assert_eq!(upper.convert(&context), Value::from("AB"));
    }
}
