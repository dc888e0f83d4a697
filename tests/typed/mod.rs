// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use formbind::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Deserialize)]
struct Point {
    #[serde(rename = "X")]
    x: i32,
    #[serde(rename = "Y")]
    y: i32,
}

bindable_object!(Point { "X": i32, "Y": i32 });

#[derive(Debug, PartialEq, Deserialize)]
struct Contact {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email")]
    email: Option<String>,
    #[serde(rename = "Tags")]
    tags: Vec<String>,
    #[serde(rename = "Subscribe")]
    subscribe: bool,
}

bindable_object!(Contact {
    "Name": String,
    "Email": Option<String>,
    "Tags": Vec<String>,
    "Subscribe": bool,
});

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Money(String);

impl Bindable for Money {
    fn schema() -> Schema {
        Schema::custom("Money")
    }
}

#[derive(Default)]
struct MoneyConverter;

impl Converter for MoneyConverter {
    fn convert(&self, context: &BindingContext) -> Value {
        match context.raw_value() {
            Some(raw) if !raw.trim().is_empty() => Value::from(raw.trim().to_uppercase()),
            _ => context.default_value().clone(),
        }
    }
}

#[test]
fn point() -> Result<()> {
    let input = RequestValues::new().with_form("X", "1").with_form("Y", "2");
    let binder = Binder::new();

    assert_eq!(binder.bind::<Point>(&input, "Point")?, Point { x: 1, y: 2 });
    assert_eq!(binder.bind::<Option<Point>>(&input, "Other")?, None);
    Ok(())
}

#[test]
fn absent_composite_into_required_type() {
    let input = RequestValues::new().with_form("X", "1");
    let err = Binder::new().bind::<Point>(&input, "Other").unwrap_err();
    assert!(matches!(err, BindError::Materialize { ref type_name, .. } if type_name.as_ref() == "Point"));
}

#[test]
fn root_contact() -> Result<()> {
    let input = RequestValues::new()
        .with_form("form$Name", "Ann")
        .with_form("form$Tags", "a")
        .with_form("form$Tags", "b")
        .with_form("form$Subscribe", "on");

    let contact: Contact = Binder::new().bind_root(&input)?;
    assert_eq!(
        contact,
        Contact {
            name: "Ann".to_string(),
            email: Some(String::new()),
            tags: vec!["a".to_string(), "b".to_string()],
            subscribe: true,
        }
    );
    Ok(())
}

#[test]
fn absent_collection_members_bind_empty() -> Result<()> {
    let input = RequestValues::new().with_form("Name", "Ann");
    let binder = Binder::new();

    let contact: Contact = binder.bind_root(&input)?;
    assert_eq!(
        contact,
        Contact {
            name: "Ann".to_string(),
            email: Some(String::new()),
            tags: vec![],
            subscribe: false,
        }
    );

    assert_eq!(binder.bind::<Vec<i32>>(&input, "ids")?, Vec::<i32>::new());
    assert_eq!(binder.bind::<BTreeSet<i32>>(&input, "ids")?, BTreeSet::new());
    assert_eq!(binder.bind::<Option<Vec<i32>>>(&input, "ids")?, None);

    // The untyped result keeps the collection default.
    let bound = binder.bind_value(&input, &Contact::schema(), "")?;
    assert!(bound["Tags"].is_null());
    Ok(())
}

#[test]
fn scalars() -> Result<()> {
    let input = RequestValues::new()
        .with_form("ids", "3")
        .with_form("ids", "1")
        .with_form("ids", "2")
        .with_form("ids", "1")
        .with_query("age", "41")
        .with_query("ratio", "0.25");
    let binder = Binder::new();

    assert_eq!(binder.bind::<Vec<u32>>(&input, "ids")?, vec![3, 1, 2, 1]);
    assert_eq!(
        binder.bind::<BTreeSet<u32>>(&input, "ids")?,
        BTreeSet::from([1, 2, 3])
    );
    assert_eq!(binder.bind::<i64>(&input, "age")?, 41);
    assert_eq!(binder.bind::<f64>(&input, "ratio")?, 0.25);
    assert_eq!(binder.bind::<i64>(&input, "missing")?, 0);
    assert_eq!(binder.bind::<Option<Vec<u32>>>(&input, "missing")?, None);
    Ok(())
}

#[test]
fn boolean_round_trip() -> Result<()> {
    let binder = Binder::new();
    for b in [true, false] {
        let input = RequestValues::new().with_form("flag", b.to_string());
        assert_eq!(binder.bind::<bool>(&input, "flag")?, b);
    }
    Ok(())
}

#[test]
fn missing_parameter_name() {
    let input = RequestValues::new().with_form("age", "41");
    assert_eq!(
        Binder::new().bind_root::<i32>(&input),
        Err(BindError::MissingParameterName {
            type_name: "i32".into()
        })
    );
}

#[test]
fn custom_converter() -> Result<()> {
    let binder = Binder::new();
    let input = RequestValues::new().with_form("total", " eur ");

    assert_eq!(
        binder.bind::<Money>(&input, "total"),
        Err(BindError::ConverterNotFound {
            type_name: "Money".into()
        })
    );

    binder.register_converter::<Money, MoneyConverter>()?;
    binder.register_default(Money("USD".to_string()))?;
    assert_eq!(binder.bind::<Money>(&input, "total")?, Money("EUR".to_string()));
    assert_eq!(binder.bind::<Money>(&input, "other")?, Money("USD".to_string()));
    Ok(())
}

#[test]
fn converter_overrides_builtin() -> Result<()> {
    #[derive(Default)]
    struct Doubling;

    impl Converter for Doubling {
        fn convert(&self, context: &BindingContext) -> Value {
            context
                .raw_value()
                .and_then(|raw| raw.parse::<i64>().ok())
                .map_or_else(|| context.default_value().clone(), |v| Value::from(v * 2))
        }
    }

    let binder = Binder::new();
    binder.register_converter::<i64, Doubling>()?;
    let input = RequestValues::new().with_form("n", "21");

    assert_eq!(binder.bind::<i64>(&input, "n")?, 42);
    // Identity is exact.
    assert_eq!(binder.bind::<i32>(&input, "n")?, 21);
    Ok(())
}

#[test]
fn registered_default() -> Result<()> {
    let binder = Binder::new();
    binder.register_default::<i32>(-1)?;
    let input = RequestValues::new().with_form("n", "oops");

    assert_eq!(binder.bind::<i32>(&input, "n")?, -1);
    assert_eq!(binder.bind::<i32>(&input, "missing")?, -1);
    Ok(())
}

#[cfg(feature = "urlquery")]
#[test]
fn urlencoded() -> Result<()> {
    let input = RequestValues::from_urlencoded("X=3&grid%24Y=4", "?X=9");
    assert_eq!(Binder::new().bind::<Point>(&input, "Point")?, Point { x: 3, y: 4 });
    Ok(())
}

#[cfg(feature = "time")]
#[test]
fn temporal() -> Result<()> {
    use chrono::{NaiveDate, NaiveDateTime};

    let input = RequestValues::new()
        .with_form("day", "2024-02-29")
        .with_form("at", "2024-02-29T08:30:00");
    let binder = Binder::new();

    assert_eq!(
        binder.bind::<NaiveDate>(&input, "day")?,
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert_eq!(
        binder.bind::<NaiveDateTime>(&input, "at")?,
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    );
    Ok(())
}

#[test]
fn schema_from_json() -> Result<()> {
    let schema = Schema::from_json_str(
        r#"{
            "type": "object",
            "name": "Point",
            "properties": { "X": "i32", "Y": { "type": "integer", "format": "int32" } }
        }"#,
    )?;
    assert_eq!(schema, Point::schema());

    let input = RequestValues::new().with_form("X", "7");
    let bound = Binder::new().bind_value(&input, &schema, "Point")?;
    assert_eq!(bound["X"], Value::from(7u64));
    assert_eq!(bound["Y"], Value::from(0u64));
    Ok(())
}

#[test]
fn options_from_json() -> Result<()> {
    let options = BinderOptions::from_json_str(r#"{ "keyDelimiter": "|", "maxDepth": 4 }"#)?;
    let binder = Binder::new().with_options(options);
    let input = RequestValues::new().with_form("a|b|n", "5");

    assert_eq!(binder.bind::<u8>(&input, "n")?, 5);
    assert_eq!(binder.options().max_depth, 4);
    Ok(())
}

#[test]
fn shared_binder_across_threads() -> Result<()> {
    let binder = Arc::new(Binder::new());
    binder.register_converter::<Money, MoneyConverter>()?;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let binder = Arc::clone(&binder);
            thread::spawn(move || {
                let input = RequestValues::new()
                    .with_form("X", i.to_string())
                    .with_form("total", format!("c{i}"));
                (
                    binder.bind::<Point>(&input, "Point"),
                    binder.bind::<Money>(&input, "total"),
                )
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (point, money) = handle.join().unwrap();
        assert_eq!(point?, Point { x: i as i32, y: 0 });
        assert_eq!(money?, Money(format!("C{i}")));
    }
    Ok(())
}

#[test]
fn global_registry_is_shared() -> Result<()> {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ticket(String);

    impl Bindable for Ticket {
        fn schema() -> Schema {
            Schema::custom("typed::Ticket")
        }
    }

    Binder::global().register_converter::<Ticket, MoneyConverter>()?;
    let input = RequestValues::new().with_form("t", "abc");
    assert_eq!(Binder::global().bind::<Ticket>(&input, "t")?, Ticket("ABC".to_string()));
    assert!(!Binder::new().registry().converters().contains("typed::Ticket"));
    Ok(())
}
