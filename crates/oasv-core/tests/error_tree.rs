//! Property tests: the error tree must serialize to the same structure every
//! time, and survive a JSON round trip unchanged.

use oasv_core::{ErrorMap, FieldError};
use proptest::prelude::*;

fn error_tree() -> impl Strategy<Value = FieldError> {
    let leaf = "[a-z ]{1,30}".prop_map(FieldError::Message);
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop::collection::btree_map("[a-z0-9_]{1,8}", inner, 1..6)
            .prop_map(|m| FieldError::nested(m.into_iter().collect::<ErrorMap>()))
    })
}

proptest! {
    /// Serializing twice yields identical bytes.
    #[test]
    fn serialization_is_stable(err in error_tree()) {
        let a = serde_json::to_string(&err).unwrap();
        let b = serde_json::to_string(&err).unwrap();
        prop_assert_eq!(a, b);
    }

    /// JSON round trip preserves the tree.
    #[test]
    fn json_round_trip(err in error_tree()) {
        let json = serde_json::to_value(&err).unwrap();
        let back: FieldError = serde_json::from_value(json.clone()).unwrap();
        prop_assert_eq!(&back, &err);
        prop_assert_eq!(err.to_json(), json);
    }
}
