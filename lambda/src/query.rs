//! Rebuilding a query string from REST v1's parameter maps.
//!
//! HTTP v2 and edge events carry the raw query string, which is passed through as is.

use serde_json::{Map, Value};

use crate::headers::string_list;

/// Joins v1 `queryStringParameters` and `multiValueQueryStringParameters` into one
/// query string.
///
/// The gateway hands these maps over decoded, so every name and value is
/// percent-encoded again before joining. Multi-valued names come first, each emitted
/// once with its values joined by a literal comma; names only present in `single`
/// follow as `name=value`. Repeated parameters therefore collapse into one
/// comma-joined parameter. Consumers depend on this form.
///
/// ```
/// use lambda_adapter::query::from_v1;
/// use serde_json::json;
///
/// let single = json!({"a": "1"});
/// let multi = json!({"b": ["2", "3"]});
/// let qs = from_v1(single.as_object().unwrap(), multi.as_object().unwrap());
/// assert_eq!(qs, "b=2,3&a=1");
/// ```
pub fn from_v1(single: &Map<String, Value>, multi: &Map<String, Value>) -> String {
    let mut params: Vec<String> = Vec::with_capacity(single.len().max(multi.len()));
    for (name, values) in multi {
        params.push(param(name, &string_list(values)));
    }
    for (name, value) in single {
        if multi.contains_key(name) {
            continue;
        }
        params.push(param(name, &string_list(value)));
    }
    params.join("&")
}

fn param(name: &str, values: &[String]) -> String {
    let values: Vec<_> = values.iter().map(|v| urlencoding::encode(v)).collect();
    format!("{}={}", urlencoding::encode(name), values.join(","))
}
