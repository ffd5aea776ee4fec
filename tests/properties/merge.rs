//! Property tests for config inheritance merging.

use proptest::prelude::*;
use serde_yaml_ng::{Mapping, Value};

use dnsbuilder::domain::services::{deep_merge, merge_mappings};

fn key() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-e]{1,2}").unwrap()
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (0i64..100).prop_map(|n| Value::Number(n.into())),
        proptest::string::string_regex("[a-z0-9]{0,6}")
            .unwrap()
            .prop_map(Value::String),
    ]
}

/// String items only: list union compares items by their text form
fn list() -> impl Strategy<Value = Vec<Value>> {
    proptest::collection::vec(
        proptest::string::string_regex("[a-z]{1,3}")
            .unwrap()
            .prop_map(Value::String),
        0..6,
    )
}

fn mapping() -> impl Strategy<Value = Mapping> {
    let leaf = prop_oneof![scalar(), list().prop_map(Value::Sequence)];
    proptest::collection::vec((key(), leaf), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every key of the parent or the child survives the merge.
    #[test]
    fn property_merge_keeps_all_keys(parent in mapping(), child in mapping()) {
        let merged = merge_mappings(&parent, &child);
        for key in parent.keys().chain(child.keys()) {
            prop_assert!(merged.contains_key(key));
        }
        prop_assert!(merged.len() <= parent.len() + child.len());
    }

    /// PROPERTY: Child scalars override parent values.
    #[test]
    fn property_child_scalars_win(parent in mapping(), child in mapping()) {
        let merged = merge_mappings(&parent, &child);
        for (key, value) in &child {
            if !value.is_sequence() && !value.is_mapping() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }

    /// PROPERTY: Merging with an empty mapping on either side changes nothing.
    #[test]
    fn property_empty_merge_is_identity(conf in mapping()) {
        prop_assert_eq!(merge_mappings(&conf, &Mapping::new()), conf.clone());
        prop_assert_eq!(merge_mappings(&Mapping::new(), &conf), conf);
    }

    /// PROPERTY: Merged lists start with the parent's items and hold every child item.
    #[test]
    fn property_lists_keep_parent_prefix(parent in list(), child in list()) {
        let merged = deep_merge(&Value::Sequence(parent.clone()), &Value::Sequence(child.clone()));
        let Value::Sequence(merged) = merged else {
            panic!("sequence merge must stay a sequence");
        };
        prop_assert_eq!(&merged[..parent.len()], &parent[..]);
        for item in &child {
            prop_assert!(merged.contains(item));
        }
        prop_assert!(merged.len() <= parent.len() + child.len());
    }
}
