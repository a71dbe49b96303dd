use crate::context::Context;
use crate::expr::{evaluate, interpolate};
use crate::value::{Object, Value};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Resolve every string leaf of a node's props against `ctx`.
///
/// Keys and structure are preserved; nested objects and arrays are walked
/// recursively and non-string scalars pass through. Absent props bind to an
/// empty object.
pub fn bind_props(ctx: &Context, props: Option<&BTreeMap<String, Json>>) -> Object {
    let Some(props) = props else {
        return Object::new();
    };
    props
        .iter()
        .map(|(key, value)| (key.clone(), bind_value(ctx, value)))
        .collect()
}

pub fn bind_value(ctx: &Context, value: &Json) -> Value {
    match value {
        Json::String(s) => evaluate(ctx, s),
        Json::Array(items) => Value::Array(items.iter().map(|v| bind_value(ctx, v)).collect()),
        Json::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), bind_value(ctx, v)))
                .collect(),
        ),
        scalar => Value::from(scalar),
    }
}

/// Resolve a text leaf. Only interpolation applies here; `prop::` and
/// `function::` prefixes are plain text in content position.
pub fn bind_leaf(ctx: &Context, leaf: &Json) -> Value {
    match leaf {
        Json::String(s) => Value::String(interpolate(ctx, s)),
        other => Value::from(other),
    }
}
