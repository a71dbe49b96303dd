use crate::value::{Object, Value};

/// Resolve a dotted attribute path against `root`.
///
/// Each segment is looked up as a key in the current object (or as an index
/// into the current array). Any missing key or non-container intermediate
/// ends the walk with `None`. Empty segments are ordinary keys.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for part in path.split('.') {
        current = step(current, part)?;
    }
    Some(current)
}

fn step<'a>(current: &'a Value, part: &str) -> Option<&'a Value> {
    match current {
        Value::Object(obj) => obj.get(part),
        Value::Array(arr) => {
            let idx = part.parse::<usize>().ok()?;
            arr.get(idx)
        }
        _ => None,
    }
}

/// Write `value` at a dotted path, creating intermediate objects.
///
/// Non-object intermediates are replaced by empty objects.
pub(crate) fn insert_path(map: &mut Object, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return;
    };
    let mut cur = map;
    for part in parents {
        let entry = cur
            .entry((*part).to_string())
            .or_insert_with(|| Value::Object(Object::new()));
        if !matches!(entry, Value::Object(_)) {
            *entry = Value::Object(Object::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        cur = next;
    }
    cur.insert((*last).to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        Value::from(json!({
            "a": {"b": {"c": 1}, "flag": 0},
            "items": [{"name": "first"}, {"name": "second"}],
            "": {"blank": true}
        }))
    }

    #[test]
    fn resolves_nested_keys() {
        let root = ctx();
        assert_eq!(resolve(&root, "a.b.c"), Some(&Value::from(1i64)));
    }

    #[test]
    fn missing_leaf_and_missing_branch_are_both_absent() {
        let root = ctx();
        assert!(resolve(&root, "a.b.missing").is_none());
        assert!(resolve(&root, "nope.b.c").is_none());
    }

    #[test]
    fn scalar_intermediate_stops_resolution() {
        let root = ctx();
        assert!(resolve(&root, "a.flag.x").is_none());
        assert!(resolve(&root, "a.b.c.d").is_none());
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let root = ctx();
        assert_eq!(resolve(&root, "items.1.name"), Some(&Value::from("second")));
        assert!(resolve(&root, "items.9.name").is_none());
        assert!(resolve(&root, "items.first").is_none());
    }

    #[test]
    fn empty_segment_is_a_plain_key() {
        let root = ctx();
        assert_eq!(resolve(&root, ".blank"), Some(&Value::from(true)));
        assert!(resolve(&root, "a..c").is_none());
    }

    #[test]
    fn insert_path_creates_parents() {
        let mut map = Object::new();
        insert_path(&mut map, "x.y.z", Value::from("v"));
        insert_path(&mut map, "x.w", Value::from(2i64));
        let root = Value::Object(map);
        assert_eq!(resolve(&root, "x.y.z"), Some(&Value::from("v")));
        assert_eq!(resolve(&root, "x.w"), Some(&Value::from(2i64)));
    }
}
