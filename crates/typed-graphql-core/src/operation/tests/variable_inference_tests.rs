use crate::operation::infer_variable_definitions;
use crate::operation::tests::test_utils;
use crate::operation::DefinitionRegistry;
use crate::operation::FragmentTable;
use crate::operation::VariableInferenceError;

#[test]
fn argument_types_drive_inference() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        "fragment UserLookup on Query { user(login: $login) { login } }",
    ).expect("normalizes");
    let fragment = document.definition_named("UserLookup").expect("fragment");

    let registry = DefinitionRegistry::new();
    let variables = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(fragment),
    ).expect("infers");

    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name(), "login");
    assert_eq!(variables[0].to_graphql_string(), "$login: String!");
}

#[test]
fn non_null_usage_wins_unification() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"fragment Both on Query {
            pet(name: $name) { ... on Cat { name } }
            user(login: $name) { login }
        }"#,
    ).expect("normalizes");
    let fragment = document.definition_named("Both").expect("fragment");

    let registry = DefinitionRegistry::new();
    let variables = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(fragment),
    ).expect("infers");

    // `pet(name:)` takes `String`, `user(login:)` takes `String!`.
    assert_eq!(variables[0].to_graphql_string(), "$name: String!");
}

#[test]
fn conflicting_base_types_fail_unification() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"fragment Mixed on Query {
            user(login: $mixed) {
                repositories(first: $mixed) { totalCount }
            }
        }"#,
    ).expect("normalizes");
    let fragment = document.definition_named("Mixed").expect("fragment");

    let registry = DefinitionRegistry::new();
    let err = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(fragment),
    ).expect_err("String! and Int do not unify");

    assert!(matches!(
        err,
        VariableInferenceError::VariableTypeConflict { variable_name, .. }
            if variable_name == "mixed",
    ));
}

#[test]
fn directive_arguments_infer_boolean() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"fragment Gated on User { login @include(if: $flag) }"#,
    ).expect("normalizes");
    let fragment = document.definition_named("Gated").expect("fragment");

    let registry = DefinitionRegistry::new();
    let variables = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(fragment),
    ).expect("infers");

    assert_eq!(variables[0].name(), "flag");
    assert_eq!(variables[0].to_graphql_string(), "$flag: Boolean!");
}

#[test]
fn variables_list_in_first_seen_order() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"fragment Ordered on Query {
            user(login: $a) {
                repositories(first: $b) { totalCount }
            }
        }"#,
    ).expect("normalizes");
    let fragment = document.definition_named("Ordered").expect("fragment");

    let registry = DefinitionRegistry::new();
    let variables = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(fragment),
    ).expect("infers");

    let names: Vec<&str> = variables
        .iter()
        .map(|var_def| var_def.name())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn spread_fragment_variables_surface_through_the_closure() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment UserBits on User { login @include(if: $flag) }
            fragment Outer on Query { user(login: $login) { ...UserBits } }
        "#,
    ).expect("normalizes");
    let outer = document.definition_named("Outer").expect("fragment");

    let registry = DefinitionRegistry::new();
    let variables = infer_variable_definitions(
        &schema,
        &registry.fragment_closure(outer),
    ).expect("infers");

    let names: Vec<&str> = variables
        .iter()
        .map(|var_def| var_def.name())
        .collect();
    assert_eq!(names, vec!["login", "flag"]);
}
