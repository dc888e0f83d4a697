// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::schema::{FloatFormat, IntegerFormat, Schema};
use crate::value::Value;

use std::collections::BTreeSet;

/// A Rust type with a binding descriptor.
///
/// The schema is what the binder walks; the bound value is then deserialized into the type
/// with serde, so member names in the schema must match the type's serde field names.
pub trait Bindable {
    fn schema() -> Schema;

    /// Rewrite the absent parts of a bound value the way `Self` represents absence.
    ///
    /// A bound collection with no input is `Null`; typed `Vec` and `BTreeSet` targets take it
    /// as empty instead.
    fn fill_absent(value: Value) -> Value {
        value
    }
}

macro_rules! bindable_integer {
    ($($t:ty => $format:ident),* $(,)?) => {
        $(
            impl Bindable for $t {
                fn schema() -> Schema {
                    Schema::integer(IntegerFormat::$format)
                }
            }
        )*
    };
}

bindable_integer!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
);

impl Bindable for bool {
    fn schema() -> Schema {
        Schema::boolean()
    }
}

impl Bindable for f32 {
    fn schema() -> Schema {
        Schema::number(FloatFormat::Float)
    }
}

impl Bindable for f64 {
    fn schema() -> Schema {
        Schema::number(FloatFormat::Double)
    }
}

impl Bindable for String {
    fn schema() -> Schema {
        Schema::string()
    }
}

impl Bindable for char {
    fn schema() -> Schema {
        Schema::char()
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    fn schema() -> Schema {
        Schema::array(T::schema())
    }

    fn fill_absent(value: Value) -> Value {
        match value {
            Value::Null => Value::from(Vec::new()),
            Value::Array(items) => Value::from(
                items
                    .iter()
                    .cloned()
                    .map(T::fill_absent)
                    .collect::<Vec<_>>(),
            ),
            other => other,
        }
    }
}

impl<T: Bindable> Bindable for BTreeSet<T> {
    fn schema() -> Schema {
        Schema::set(T::schema())
    }

    fn fill_absent(value: Value) -> Value {
        match value {
            Value::Null => Value::from(BTreeSet::new()),
            Value::Set(items) => Value::from(
                items
                    .iter()
                    .cloned()
                    .map(T::fill_absent)
                    .collect::<BTreeSet<_>>(),
            ),
            other => other,
        }
    }
}

/// Same descriptor as `T`; an absent bind materializes as `None`.
impl<T: Bindable> Bindable for Option<T> {
    fn schema() -> Schema {
        T::schema()
    }

    fn fill_absent(value: Value) -> Value {
        match value {
            Value::Null => Value::Null,
            present => T::fill_absent(present),
        }
    }
}

#[cfg(feature = "time")]
impl Bindable for chrono::NaiveDateTime {
    fn schema() -> Schema {
        Schema::date_time()
    }
}

#[cfg(feature = "time")]
impl Bindable for chrono::NaiveDate {
    fn schema() -> Schema {
        Schema::date()
    }
}

#[cfg(feature = "time")]
impl Bindable for chrono::NaiveTime {
    fn schema() -> Schema {
        Schema::time()
    }
}

#[cfg(feature = "uuid")]
impl Bindable for uuid::Uuid {
    fn schema() -> Schema {
        Schema::uuid()
    }
}

/// Implement [`Bindable`] for a composite type from its member table.
///
/// ```ignore
/// #[derive(serde::Deserialize)]
/// struct Point {
///     #[serde(rename = "X")]
///     x: i32,
///     #[serde(rename = "Y")]
///     y: i32,
/// }
///
/// bindable_object!(Point { "X": i32, "Y": i32 });
/// ```
///
/// The composite's identity is the type's name as written.
#[macro_export]
macro_rules! bindable_object {
    ($t:ident { $($member:literal : $member_ty:ty),* $(,)? }) => {
        impl $crate::Bindable for $t {
            fn schema() -> $crate::Schema {
                $crate::Schema::object(
                    stringify!($t),
                    [$(($member, <$member_ty as $crate::Bindable>::schema())),*],
                )
            }

            fn fill_absent(value: $crate::Value) -> $crate::Value {
                let mut value = value;
                if let Ok(fields) = value.as_object_mut() {
                    $(
                        let key = $crate::Value::from($member);
                        let member = fields.remove(&key).unwrap_or($crate::Value::Null);
                        fields.insert(key, <$member_ty as $crate::Bindable>::fill_absent(member));
                    )*
                }
                value
            }
        }
    };
}
