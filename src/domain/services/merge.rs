//! Config deep merge
//!
//! Merges a child config onto its parent:
//! - Maps merge key by key, recursively
//! - Sequences keep the parent's items and append child items not already present
//! - A `KEY=VALUE` list meeting a map is normalized to a map first
//! - Anything else: the child wins

use serde_yaml_ng::{Mapping, Value};

pub fn deep_merge(parent: &Value, child: &Value) -> Value {
    match (parent, child) {
        (Value::Mapping(p), Value::Mapping(c)) => Value::Mapping(merge_mappings(p, c)),
        (Value::Sequence(p), Value::Sequence(c)) => {
            let mut merged = p.clone();
            let mut seen: Vec<String> = p.iter().map(item_key).collect();
            for item in c {
                let key = item_key(item);
                if !seen.contains(&key) {
                    seen.push(key);
                    merged.push(item.clone());
                }
            }
            Value::Sequence(merged)
        }
        (Value::Mapping(p), Value::Sequence(c)) => match pairs_to_mapping(c) {
            Some(c) => Value::Mapping(merge_mappings(p, &c)),
            None => child.clone(),
        },
        (Value::Sequence(p), Value::Mapping(c)) => match pairs_to_mapping(p) {
            Some(p) => Value::Mapping(merge_mappings(&p, c)),
            None => child.clone(),
        },
        _ => child.clone(),
    }
}

pub fn merge_mappings(parent: &Mapping, child: &Mapping) -> Mapping {
    let mut merged = parent.clone();
    for (key, child_value) in child {
        let value = match parent.get(key) {
            Some(parent_value) => deep_merge(parent_value, child_value),
            None => child_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// String identity used for sequence union
fn item_key(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml_ng::to_string(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

/// `["A=1", "B=2"]` -> `{A: "1", B: "2"}`; `None` if any item is not a pair
fn pairs_to_mapping(items: &[Value]) -> Option<Mapping> {
    let mut mapping = Mapping::new();
    for item in items {
        let (key, value) = item.as_str()?.split_once('=')?;
        mapping.insert(
            Value::String(key.trim().to_string()),
            Value::String(value.trim().to_string()),
        );
    }
    Some(mapping)
}
