//! Property tests for label path parsing.

use std::collections::BTreeMap;

use proptest::prelude::*;
use pushproxy::labels::{encode_base64, split_labels, BASE64_SUFFIX};
use pushproxy::{PrefixTrim, SelectError};

fn label_names() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,10}"
}

proptest! {
    /// Any label set survives being encoded into a path with `@base64`
    /// values, whatever characters the values contain.
    #[test]
    fn encoded_paths_decode_to_the_same_labels(
        labels in prop::collection::btree_map(label_names(), ".*", 0..6),
    ) {
        let mut path = String::from("/metrics");
        for (name, value) in &labels {
            path.push('/');
            path.push_str(name);
            path.push_str(BASE64_SUFFIX);
            path.push('/');
            path.push_str(&encode_base64(value));
        }

        let parsed = split_labels(&path, "/metrics", PrefixTrim::Literal).unwrap();
        prop_assert_eq!(parsed.into_inner(), labels);
    }

    /// Parsing arbitrary input never panics, and errors are only the
    /// client-facing kinds.
    #[test]
    fn arbitrary_paths_fail_cleanly(path in "(/[a-z_@0-9=!-]{0,8}){0,6}") {
        for trim in [PrefixTrim::CharacterSet, PrefixTrim::Literal] {
            match split_labels(&path, "/metrics", trim) {
                Ok(_)
                | Err(SelectError::MalformedPath(_))
                | Err(SelectError::InvalidLabelName(_))
                | Err(SelectError::InvalidEncoding { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}

#[test]
fn empty_label_set_is_just_the_prefix() {
    let parsed = split_labels("/metrics", "/metrics", PrefixTrim::Literal).unwrap();
    assert_eq!(parsed.into_inner(), BTreeMap::new());
}
