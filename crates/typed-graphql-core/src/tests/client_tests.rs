use crate::operation::FragmentTable;
use crate::Client;
use crate::ClientError;
use crate::ParseError;
use crate::schema::SchemaBuilder;
use serde_json::json;
use std::sync::Arc;

const SDL: &str = r#"
    type Query {
        pet(name: String): Pet
        user(login: String!): User
    }

    type User {
        id: ID!
        login: String!
        profileURL: String
    }

    union Pet = Cat | Dog

    type Cat {
        id: ID!
        name: String!
    }

    type Dog {
        id: ID!
        name: String!
    }
"#;

fn client() -> Client {
    let schema = SchemaBuilder::from_str(None, SDL)
        .expect("fixture SDL loads")
        .build()
        .expect("fixture SDL builds");
    Client::new(Arc::new(schema))
}

#[test]
fn declared_definitions_compile_under_namespaced_names() {
    let client = client();
    let compiled = client
        .parse(
            "Views::Profile",
            r#"query GetUser { user(login: "octo") { login } }"#,
        )
        .expect("compiles");

    assert_eq!(compiled.len(), 1);
    assert_eq!(
        compiled[0].name().expect("named"),
        "Views__Profile__GetUser",
    );
}

#[test]
fn anonymous_definitions_take_the_declaration_path_name() {
    let client = client();
    let compiled = client
        .parse("Views::Bare", r#"{ user(login: "octo") { login } }"#)
        .expect("compiles");
    assert_eq!(compiled[0].name().expect("named"), "Views__Bare");
}

#[test]
fn pathless_anonymous_definitions_derive_a_name() {
    let client = client();
    let compiled = client
        .parse("", r#"{ user(login: "octo") { login } }"#)
        .expect("compiles");
    assert!(compiled[0].name().expect("named").starts_with("query_"));
}

#[test]
fn documents_print_cross_parse_spreads_once() {
    let client = client();
    let fragment = client
        .parse("Views::Shared", "fragment UserBits on User { login }")
        .expect("fragment compiles");

    let mut table = FragmentTable::new();
    client.extend_fragment_table(&mut table, &fragment);

    let query = client
        .parse_with_fragments(
            "Views::Profile",
            r#"
                query GetUser {
                    one: user(login: "a") { ...UserBits }
                    two: user(login: "b") { ...UserBits }
                }
            "#,
            &table,
        )
        .expect("query compiles")
        .remove(0);

    let document = query.document();
    assert!(document.contains("query Views__Profile__GetUser {"));
    assert!(document.contains("...Views__Shared__UserBits"));
    assert_eq!(
        document
            .matches("fragment Views__Shared__UserBits on User")
            .count(),
        1,
    );
}

#[test]
fn syntax_errors_surface_from_parse() {
    let client = client();
    let err = client
        .parse("Views::Broken", "query {")
        .expect_err("unterminated source");
    assert!(matches!(err, ParseError::Syntax(_)));
}

#[test]
fn unresolved_spreads_surface_as_normalize_errors() {
    let client = client();
    let err = client
        .parse(
            "Views::Broken",
            r#"query GetUser { user(login: "a") { ...Nowhere } }"#,
        )
        .expect_err("nothing defines Nowhere");
    assert!(matches!(
        err,
        ParseError::Normalize { errors } if errors.len() == 1,
    ));
}

#[test]
fn reusing_a_declaration_path_is_a_name_error() {
    let client = client();
    client
        .parse(
            "Views::Profile",
            r#"query GetUser { user(login: "a") { login } }"#,
        )
        .expect("first compiles");
    let err = client
        .parse(
            "Views::Profile",
            r#"query GetUser { user(login: "b") { login } }"#,
        )
        .expect_err("the global name is taken");
    assert!(matches!(err, ParseError::Name(_)));
}

#[test]
fn bare_fragments_synthesize_runnable_operations() {
    let client = client();
    let fragment = client
        .parse(
            "Views::Lookup",
            "fragment UserLookup on Query { user(login: $login) { login } }",
        )
        .expect("compiles")
        .remove(0);

    let variables = fragment.variables().expect("infers");
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].to_graphql_string(), "$login: String!");

    let operation = fragment.synthesize_operation().expect("synthesizes");
    assert!(operation.starts_with(
        "query Views__Lookup__UserLookup__operation($login: String!)",
    ));
    assert!(operation.contains("...Views__Lookup__UserLookup"));
}

#[test]
fn operations_do_not_synthesize() {
    let client = client();
    let query = client
        .parse(
            "Views::Profile",
            r#"query GetUser { user(login: "a") { login } }"#,
        )
        .expect("compiles")
        .remove(0);

    let err = query.synthesize_operation().expect_err("not a fragment");
    assert!(matches!(
        err,
        ClientError::SynthesizeNonFragment { name }
            if name == "Views__Profile__GetUser",
    ));
}

#[test]
fn collocated_access_works_with_enforcement_on() {
    let client = client();
    let query = client
        .parse(
            "Views::Profile",
            r#"query GetUser { user(login: "octo") { login profileURL } }"#,
        )
        .expect("compiles")
        .remove(0);

    let root = query
        .cast_value(&json!({
            "user": { "login": "octo", "profileURL": null },
        }))
        .expect("casts");
    let user = root
        .as_object().expect("root object")
        .field("user").expect("declared and read in the same file");
    let user = user.as_object().expect("user object");

    assert_eq!(user.field("login").expect("selected").as_str(), Some("octo"));
    assert!(user.field("profile_url").expect("selected").is_null());
}
