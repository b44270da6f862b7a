use crate::client::ClientError;
use crate::operation::FragmentTable;
use crate::result::descriptor::underscore;
use crate::result::DescriptorBuildError;
use crate::result::ResultDescriptor;
use crate::result::ResultType;
use crate::result::tests::test_utils;
use std::sync::Arc;

fn object_descriptor(result_type: &ResultType) -> &Arc<ResultDescriptor> {
    match result_type {
        ResultType::Object(descriptor) => descriptor,
        ResultType::NonNull(inner) => object_descriptor(inner),
        other => panic!("expected an object shape, got {other:?}"),
    }
}

#[test]
fn underscore_translates_camel_case() {
    assert_eq!(underscore("profileURL"), "profile_url");
    assert_eq!(underscore("htmlUrl"), "html_url");
    assert_eq!(underscore("createdAt"), "created_at");
    assert_eq!(underscore("totalCount"), "total_count");
    assert_eq!(underscore("login"), "login");
    assert_eq!(underscore("already_snake"), "already_snake");
}

#[test]
fn entries_resolve_by_result_key_or_accessor_name() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Profile",
        "fragment UserBits on User { login profileURL }",
    );

    let ResultType::Object(descriptor) =
        compiled.result_type().expect("derives")
    else {
        panic!("fragment on an object type derives an object shape");
    };

    let by_key = descriptor.entry("profileURL").expect("result key resolves");
    let by_accessor = descriptor.entry("profile_url").expect("accessor resolves");
    assert_eq!(by_key.result_key(), by_accessor.result_key());
    assert_eq!(by_key.accessor_name(), "profile_url");
    assert!(descriptor.entry("html_url").is_none());
}

#[test]
fn aliases_key_the_descriptor() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Profile",
        "fragment UserBits on User { theUrl: profileURL }",
    );

    let ResultType::Object(descriptor) =
        compiled.result_type().expect("derives")
    else {
        panic!("fragment on an object type derives an object shape");
    };

    assert!(descriptor.entry("the_url").is_some());
    assert!(descriptor.entry("profileURL").is_none());
}

#[test]
fn fragments_on_abstract_types_derive_per_type_descriptors() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Pets",
        r#"fragment PetBits on Pet {
            ... on Cat { disposition }
            ... on Dog { barks }
        }"#,
    );

    let ResultType::Polymorphic(poly) =
        compiled.result_type().expect("derives")
    else {
        panic!("fragment on a union derives a polymorphic shape");
    };

    assert_eq!(poly.abstract_type(), "Pet");
    let type_names: Vec<&str> = poly
        .possible_types()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(type_names, vec!["Cat", "Dog", "Fish"]);

    let cat = &poly.possible_types()["Cat"];
    assert!(cat.entry("disposition").is_some());
    assert!(cat.entry("barks").is_none());
    // The injected discriminant is part of every branch.
    assert!(cat.entry("__typename").is_some());

    let fish = &poly.possible_types()["Fish"];
    assert!(fish.entry("disposition").is_none());
    assert!(fish.entry("__typename").is_some());
}

#[test]
fn conditional_fields_relax_to_nullable() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Profile",
        r#"fragment UserBits on User {
            id
            repositories(first: 1) @include(if: $withRepos) { totalCount }
        }"#,
    );

    let ResultType::Object(descriptor) =
        compiled.result_type().expect("derives")
    else {
        panic!("fragment on an object type derives an object shape");
    };

    // `repositories` is declared non-null, but under `@include` the server
    // may omit it entirely.
    let repositories = descriptor.entry("repositories").expect("selected");
    assert!(matches!(repositories.result_type(), ResultType::Object(_)));

    // Unconditional siblings keep their declared non-nullness.
    let id = descriptor.entry("id").expect("selected");
    assert!(matches!(id.result_type(), ResultType::NonNull(_)));
}

#[test]
fn fields_selected_both_ways_stay_non_null() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Profile",
        r#"fragment UserBits on User {
            login @include(if: $verbose)
            login
        }"#,
    );

    let ResultType::Object(descriptor) =
        compiled.result_type().expect("derives")
    else {
        panic!("fragment on an object type derives an object shape");
    };

    // One unconditional occurrence guarantees presence.
    let login = descriptor.entry("login").expect("selected");
    assert!(matches!(login.result_type(), ResultType::NonNull(_)));
}

#[test]
fn unknown_fields_fail_derivation() {
    let client = test_utils::pets_client();
    let compiled = test_utils::compile_one(
        &client,
        "Views::Profile",
        "fragment UserBits on User { blorp }",
    );

    let err = compiled.result_type().expect_err("blorp is not a field");
    assert!(matches!(
        err,
        ClientError::Descriptor(DescriptorBuildError::UnknownField {
            field_name,
            type_name,
        }) if field_name == "blorp" && type_name == "User",
    ));
}

#[test]
fn merge_unions_fields_and_keeps_left_identity() {
    let client = test_utils::pets_client();
    let left = test_utils::compile_one(
        &client,
        "Views::A",
        "fragment LeftBits on User { login }",
    );
    let right = test_utils::compile_one(
        &client,
        "Views::B",
        "fragment RightBits on User { profileURL }",
    );

    let ResultType::Object(left_desc) = left.result_type().expect("derives")
    else {
        panic!("object shape expected");
    };
    let ResultType::Object(right_desc) = right.result_type().expect("derives")
    else {
        panic!("object shape expected");
    };

    let merged = left_desc.as_ref() | right_desc.as_ref();
    assert!(merged.entry("login").is_some());
    assert!(merged.entry("profile_url").is_some());
    assert_eq!(merged.source_name(), left_desc.source_name());
    assert!(right_desc.node_ids().is_subset(merged.node_ids()));
}

#[test]
fn spreading_a_fragment_makes_its_nodes_a_subset() {
    let client = test_utils::pets_client();
    let fragment = test_utils::compile_one(
        &client,
        "Views::Profile",
        "fragment UserBits on User { login profileURL }",
    );

    let mut table = FragmentTable::new();
    client.extend_fragment_table(&mut table, std::slice::from_ref(&fragment));

    let query = client
        .parse_with_fragments(
            "Views::Profile",
            r#"query GetUser { user(login: "octo") { ...UserBits } }"#,
            &table,
        )
        .expect("query compiles")
        .remove(0);

    let ResultType::Object(fragment_desc) =
        fragment.result_type().expect("derives")
    else {
        panic!("object shape expected");
    };
    let ResultType::Object(root_desc) = query.result_type().expect("derives")
    else {
        panic!("object shape expected");
    };

    let user_desc = object_descriptor(
        root_desc.entry("user").expect("user selected").result_type(),
    );
    assert!(fragment_desc.node_ids().is_subset(user_desc.node_ids()));
    assert!(!user_desc.node_ids().is_subset(fragment_desc.node_ids()));
}
