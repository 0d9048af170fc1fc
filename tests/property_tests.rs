/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use rust_logistics_api::core::validation::{required_param, validate_delete_user};
use rust_logistics_api::documents::decode_value;
use rust_logistics_api::models::embedded_lead_count;
use serde_json::json;

// Property: Firestore decoding should never panic
proptest! {
    #[test]
    fn integer_decoding_never_panics(raw in "\\PC*") {
        let _ = decode_value(&json!({"integerValue": raw}));
    }

    #[test]
    fn unknown_envelopes_never_panic(key in "[a-zA-Z]{1,16}", raw in "\\PC*") {
        let _ = decode_value(&json!({key: raw}));
    }

    #[test]
    fn integers_decode_to_numbers(n in any::<i64>()) {
        prop_assert_eq!(decode_value(&json!({"integerValue": n.to_string()})), json!(n));
    }

    #[test]
    fn arrays_preserve_order(values in proptest::collection::vec(any::<i64>(), 0..32)) {
        let wrapped: Vec<_> = values
            .iter()
            .map(|v| json!({"integerValue": v.to_string()}))
            .collect();
        let decoded = decode_value(&json!({"arrayValue": {"values": wrapped}}));
        prop_assert_eq!(decoded, json!(values));
    }
}

// Property: request validation
proptest! {
    #[test]
    fn non_empty_uids_are_accepted(uid in "\\PC{1,64}") {
        let request = validate_delete_user(&json!({"uid": uid.clone()})).unwrap();
        prop_assert_eq!(request.uid, uid);
    }

    #[test]
    fn whitespace_params_are_rejected(blank in "[ \\t]{0,8}") {
        prop_assert!(required_param("query", Some(blank)).is_err());
    }

    #[test]
    fn lead_count_matches_array_length(n in 0usize..50) {
        let leads: Vec<_> = (0..n).map(|i| json!({"id": i})).collect();
        prop_assert_eq!(embedded_lead_count(&json!({"_embedded": {"leads": leads}})), n);
    }
}
