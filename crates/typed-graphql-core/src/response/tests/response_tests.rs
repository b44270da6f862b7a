use crate::response::Response;
use serde_json::json;

#[test]
fn envelope_fields_deserialize() {
    let response = Response::from_str(r#"{
        "data": { "user": { "login": "octo" } },
        "errors": [
            { "message": "repos unavailable", "path": ["user", "repositories"] }
        ],
        "extensions": { "requestId": "abc-123" }
    }"#).expect("parses");

    assert_eq!(
        response.data(),
        Some(&json!({ "user": { "login": "octo" } })),
    );
    assert_eq!(response.errors().all().len(), 1);
    assert_eq!(response.extensions()["requestId"], json!("abc-123"));
}

#[test]
fn missing_envelope_keys_default() {
    let mut response = Response::from_str(r#"{ "data": null }"#)
        .expect("parses");

    // JSON `null` data and absent data are both "no data".
    assert_eq!(response.data(), None);
    assert!(response.errors().all().is_empty());
    assert!(response.extensions().is_empty());
    assert_eq!(response.take_data(), None);
}

#[test]
fn unknown_envelope_keys_are_ignored() {
    let response = Response::from_json(json!({
        "data": {},
        "vendorNonsense": true,
    })).expect("parses");
    assert_eq!(response.data(), Some(&json!({})));
}

#[test]
fn malformed_payloads_are_an_error() {
    assert!(Response::from_str("{ not json").is_err());
    assert!(Response::from_str(r#"{ "errors": "not a list" }"#).is_err());
}
