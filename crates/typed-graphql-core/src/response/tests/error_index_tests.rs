use crate::response::ErrorRecord;
use crate::response::Errors;
use crate::response::PathSegment;
use serde_json::json;

fn record(message: &str, path: &[PathSegment]) -> ErrorRecord {
    ErrorRecord {
        message: message.to_string(),
        path: path.to_vec(),
    }
}

fn sample_errors() -> Errors {
    Errors::from_records(vec![
        record("repos unavailable", &[
            "user".into(),
            "repositories".into(),
        ]),
        record("cat ran away", &[
            "user".into(),
            "pets".into(),
            0u64.into(),
            "name".into(),
        ]),
        record("server on fire", &[]),
    ])
}

#[test]
fn root_scope_buckets_direct_children_only() {
    let errors = sample_errors();
    let details = errors.details();

    // Only `user.repositories` and `user.pets[0].name` have paths; neither
    // sits directly on the root, and the pathless error has no bucket.
    assert!(details.is_empty());

    let user = errors.filter_by_path("user");
    let details = user.details();
    assert_eq!(details.len(), 1);
    assert_eq!(details["repositories"].len(), 1);
    assert_eq!(details["repositories"][0].message, "repos unavailable");
}

#[test]
fn descendant_mode_buckets_by_the_next_segment() {
    let errors = sample_errors();
    let all = errors.filter_by_path("user").all();
    let details = all.details();

    assert_eq!(details.len(), 2);
    assert_eq!(details["repositories"].len(), 1);
    assert_eq!(details["pets"][0].message, "cat ran away");
}

#[test]
fn nested_filters_narrow_the_scope() {
    let errors = sample_errors()
        .filter_by_path("user")
        .filter_by_path("pets")
        .filter_by_path(0u64);

    let details = errors.details();
    assert_eq!(details.len(), 1);
    assert_eq!(details["name"][0].message, "cat ran away");
}

#[test]
fn key_spellings_are_interchangeable() {
    let errors = Errors::from_records(vec![
        record("bad url", &["user".into(), "profileURL".into()]),
    ]);
    let user = errors.filter_by_path("user");

    assert!(user.get("profileURL").is_some());
    assert!(user.get("profile_url").is_some());
    assert!(user.get("profileurl").is_some());
    assert!(user.get("htmlUrl").is_none());
}

#[test]
fn index_segments_match_their_decimal_spelling() {
    let errors = Errors::from_records(vec![
        record("gone", &["pets".into(), 2u64.into(), "name".into()]),
    ]);
    let pets = errors.filter_by_path("pets").all();

    assert_eq!(pets.get("2").expect("index matches").len(), 1);
    assert!(pets.get("3").is_none());
}

#[test]
fn counting_respects_the_scope() {
    let errors = sample_errors();
    assert!(errors.is_empty());
    assert_eq!(errors.len(), 0);

    let all = errors.all();
    assert!(!all.is_empty());
    assert_eq!(all.len(), 2);

    let user = errors.filter_by_path("user");
    assert_eq!(user.len(), 1);
    assert_eq!(user.messages()["repositories"], vec!["repos unavailable"]);
}

#[test]
fn path_segments_deserialize_untagged() {
    let record: ErrorRecord = serde_json::from_value(json!({
        "message": "boom",
        "path": ["user", "pets", 0, "name"],
    })).expect("deserializes");

    assert_eq!(record.path, vec![
        PathSegment::Key("user".to_string()),
        PathSegment::Key("pets".to_string()),
        PathSegment::Index(0),
        PathSegment::Key("name".to_string()),
    ]);
}

#[test]
fn pathless_records_deserialize_with_an_empty_path() {
    let record: ErrorRecord = serde_json::from_value(json!({
        "message": "boom",
    })).expect("deserializes");
    assert!(record.path.is_empty());
}
