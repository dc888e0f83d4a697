// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use formbind::*;
use serde::Deserialize;
use test_generator::test_resources;

// Process expected values specified in yaml to interpret special encodings.
fn process_value(v: &Value) -> Result<Value> {
    match v {
        // Handle set encoded as an object
        // set! :
        //   - item1
        //   - item2
        Value::Object(fields) if fields.len() == 1 && matches!(&v["set!"], Value::Array(_)) => {
            let mut set = std::collections::BTreeSet::new();
            for item in v["set!"].as_array()? {
                set.insert(process_value(item)?);
            }
            Ok(Value::from(set))
        }

        Value::Array(items) => Ok(Value::from(
            items.iter().map(process_value).collect::<Result<Vec<_>>>()?,
        )),

        Value::Object(fields) => {
            let mut object = BTreeMap::new();
            for (key, value) in fields.iter() {
                object.insert(process_value(key)?, process_value(value)?);
            }
            Ok(Value::from(object))
        }

        Value::Set(_) => bail!("unexpected set in value read from yaml"),

        _ => Ok(v.clone()),
    }
}

fn display_values(c: &Value, e: &Value) -> Result<String> {
    Ok(format!(
        "\nleft  = {}\nright = {}\n",
        serde_json::to_string_pretty(c)?,
        serde_json::to_string_pretty(e)?
    ))
}

/// Converters a case can install by name.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum TestConverter {
    /// Upper-cased raw text, or the default when absent.
    Upper,
    /// Character count of the raw text, or the default when absent.
    Length,
    Boolean,
}

impl TestConverter {
    fn install(self, registry: &BinderRegistry, type_name: &str) -> Result<()> {
        let converter: Arc<dyn Converter> = match self {
            TestConverter::Upper => Arc::new(|ctx: &BindingContext| match ctx.raw_value() {
                Some(raw) => Value::from(raw.to_uppercase()),
                None => ctx.default_value().clone(),
            }),
            TestConverter::Length => Arc::new(|ctx: &BindingContext| match ctx.raw_value() {
                Some(raw) => Value::from(raw.chars().count()),
                None => ctx.default_value().clone(),
            }),
            TestConverter::Boolean => Arc::new(BooleanConverter),
        };
        registry
            .converters()
            .register_instance(type_name, converter)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    schema: Schema,
    #[serde(default)]
    name: String,
    #[serde(default)]
    form: Vec<(String, String)>,
    #[serde(default)]
    query: Vec<(String, String)>,
    options: Option<BinderOptions>,
    #[serde(default)]
    converters: BTreeMap<String, TestConverter>,
    #[serde(default)]
    defaults: BTreeMap<String, Value>,
    want_result: Option<Value>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn binder_for(case: &TestCase) -> Result<Binder> {
    let registry = Arc::new(BinderRegistry::new());
    for (type_name, converter) in &case.converters {
        converter.install(&registry, type_name)?;
    }
    for (type_name, value) in &case.defaults {
        registry.defaults().register(type_name.as_str(), value.clone())?;
    }
    Ok(Binder::with_registry(registry).with_options(case.options.clone().unwrap_or_default()))
}

fn run_case(case: &TestCase) -> Result<()> {
    let mut input = RequestValues::new();
    for (key, value) in &case.form {
        input.push_form(key.as_str(), value.as_str());
    }
    for (key, value) in &case.query {
        input.push_query(key.as_str(), value.as_str());
    }

    let binder = binder_for(case)?;
    let first = binder.bind_value(&input, &case.schema, &case.name);

    match (&case.error, first) {
        (None, Ok(actual)) => {
            // An absent `want_result` (or `want_result: null`) expects Null.
            let expected = match &case.want_result {
                Some(expected) => process_value(expected)?,
                None => Value::Null,
            };
            if actual != expected {
                bail!("{}", display_values(&actual, &expected)?);
            }
            // Binding reads nothing but its input.
            let second = binder.bind_value(&input, &case.schema, &case.name)?;
            if second != actual {
                bail!("second bind differs{}", display_values(&second, &actual)?);
            }
        }
        (Some(expected), Err(actual)) => {
            let actual = actual.to_string();
            if !actual.contains(expected.as_str()) {
                bail!("error `{actual}` does not contain `{expected}`");
            }
        }
        (Some(_), Ok(actual)) => bail!("expected an error, got {actual}"),
        (None, Err(actual)) => bail!("unexpected error {actual}"),
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in &test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }
        if let Err(e) = run_case(case) {
            bail!("case {} failed: {e}", case.note);
        }
        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/binder/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
