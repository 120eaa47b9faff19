//! Parameter flattening and sign-string construction.
//!
//! Nested parameters are flattened before signing:
//!
//! | Input                         | Flattened                     |
//! |-------------------------------|-------------------------------|
//! | `{"items": ["a", "b"]}`       | `items[0]=a`, `items[1]=b`    |
//! | `{"buyer": {"id": 7}}`        | `buyer.id=7`                  |
//! | `{"paid": true}`              | `paid=true`                   |
//! | `{"memo": null}`              | `memo=`                       |
//!
//! Strings are used raw (no encoding), numbers in their JSON form.

use serde_json::{Map, Value};

/// Flattens `params` into `(key, value)` pairs sorted byte-wise by key
/// (ties by value).
pub fn flatten_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten_into(key.clone(), value, &mut pairs);
    }
    pairs.sort();
    pairs
}

fn flatten_into(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", key, index), item, out);
            }
        }
        Value::Object(fields) => {
            for (sub_key, item) in fields {
                flatten_into(format!("{}.{}", key, sub_key), item, out);
            }
        }
        Value::String(s) => out.push((key, s.clone())),
        Value::Null => out.push((key, String::new())),
        Value::Bool(b) => out.push((key, b.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
    }
}

/// Joins the flattened, sorted parameters as `k=v` pairs with `&`.
pub fn sign_string(params: &Map<String, Value>) -> String {
    flatten_params(params)
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
