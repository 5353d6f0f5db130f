//! Dotted-path lookup into arbitrary catalog JSON.
//!
//! Catalog APIs have no fixed schema, so every field the table needs is
//! located by a path such as `"category"`, `"meta.sku"` or `"images.0.src"`.
//! A miss is `None`, never an error: the table builder substitutes a visible
//! default for it.

use serde_json::Value;

/// Resolve `path` against `root`.
///
/// Segments are separated by `.`. A segment made only of ASCII digits
/// indexes into an array; against an object it is an ordinary key. Returns
/// `None` when the path is empty, the root or the final value is `null`, a
/// segment is missing, an index is past the end, or a scalar is reached
/// while segments remain.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) if is_index(segment) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    match current {
        Value::Null => None,
        value => Some(value),
    }
}

/// Render a resolved value as cell text.
///
/// Strings are used verbatim; numbers and booleans use their JSON spelling;
/// containers become compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Resolve and stringify in one step.
pub fn resolve_string(root: &Value, path: &str) -> Option<String> {
    resolve(root, path).map(stringify)
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> Value {
        json!({
            "category": "Surgical",
            "meta": {"sku": "SKU-1", "stock": 12, "tags": ["a", "b"], "0": "zero-key"},
            "images": [{"src": "http://x/y.png"}, "http://x/z.png"],
            "discontinued": false,
            "nothing": null
        })
    }

    #[test]
    fn resolves_nested_keys() {
        let v = item();
        assert_eq!(resolve(&v, "category"), Some(&json!("Surgical")));
        assert_eq!(resolve(&v, "meta.sku"), Some(&json!("SKU-1")));
        assert_eq!(resolve(&v, "meta.stock"), Some(&json!(12)));
    }

    #[test]
    fn digit_segments_index_arrays() {
        let v = item();
        assert_eq!(resolve(&v, "images.0.src"), Some(&json!("http://x/y.png")));
        assert_eq!(resolve(&v, "images.1"), Some(&json!("http://x/z.png")));
        assert_eq!(resolve(&v, "meta.tags.1"), Some(&json!("b")));
    }

    #[test]
    fn digit_segments_are_keys_on_objects() {
        let v = item();
        assert_eq!(resolve(&v, "meta.0"), Some(&json!("zero-key")));
    }

    #[test]
    fn misses_are_none() {
        let v = item();
        assert_eq!(resolve(&v, ""), None);
        assert_eq!(resolve(&Value::Null, "category"), None);
        assert_eq!(resolve(&v, "missing"), None);
        assert_eq!(resolve(&v, "meta.missing.deeper"), None);
        assert_eq!(resolve(&v, "images.5"), None);
        assert_eq!(resolve(&v, "images.src"), None);
        assert_eq!(resolve(&v, "category.name"), None);
        assert_eq!(resolve(&v, "nothing"), None);
        assert_eq!(resolve(&v, "images.99999999999999999999999"), None);
    }

    #[test]
    fn stringify_scalars_and_containers() {
        assert_eq!(stringify(&json!("text")), "text");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(false)), "false");
        assert_eq!(stringify(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn resolve_string_combines_both() {
        let v = item();
        assert_eq!(resolve_string(&v, "discontinued").as_deref(), Some("false"));
        assert_eq!(resolve_string(&v, "nothing"), None);
    }
}
