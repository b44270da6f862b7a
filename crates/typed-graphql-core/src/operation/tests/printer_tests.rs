use crate::operation::infer_variable_definitions;
use crate::operation::print_minimal_document;
use crate::operation::print_synthesized_operation;
use crate::operation::tests::test_utils;
use crate::operation::DefinitionRegistry;
use crate::operation::FragmentTable;

#[test]
fn minimal_document_prints_closure_under_global_names() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat { name }
            query PetQuery {
                first: pet(name: "a") { ...CatName }
                second: pet(name: "b") { ...CatName }
            }
        "#,
    ).expect("normalizes");
    let query = document.definition_named("PetQuery").expect("query");
    let fragment = document.definition_named("CatName").expect("fragment");

    let registry = DefinitionRegistry::new();
    registry.bind_declaration_path(query, "Views::PetQuery").expect("binds");
    registry.bind_declaration_path(fragment, "Views::CatName").expect("binds");

    let printed = print_minimal_document(&registry.fragment_closure(query));

    assert!(printed.contains("query Views__PetQuery {"));
    assert!(printed.contains("...Views__CatName"));

    // Each spread prints as a reference; the fragment body appears once.
    let body_count = printed
        .matches("fragment Views__CatName on Cat")
        .count();
    assert_eq!(body_count, 1);
}

#[test]
fn spread_site_directives_survive_printing() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat { name }
            query PetQuery($withCats: Boolean!) {
                pet(name: "felix") { ...CatName @include(if: $withCats) }
            }
        "#,
    ).expect("normalizes");
    let query = document.definition_named("PetQuery").expect("query");
    let fragment = document.definition_named("CatName").expect("fragment");

    let registry = DefinitionRegistry::new();
    registry.bind_declaration_path(query, "Views::PetQuery").expect("binds");
    registry.bind_declaration_path(fragment, "Views::CatName").expect("binds");

    let printed = print_minimal_document(&registry.fragment_closure(query));
    assert!(printed.contains("...Views__CatName @include(if: $withCats)"));
}

#[test]
fn declared_variables_print_on_the_operation() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        "query UserQuery($login: String!) { user(login: $login) { login } }",
    ).expect("normalizes");
    let query = document.definition_named("UserQuery").expect("query");

    let registry = DefinitionRegistry::new();
    registry.bind_declaration_path(query, "Views::UserQuery").expect("binds");

    let printed = print_minimal_document(&registry.fragment_closure(query));
    assert!(printed.starts_with("query Views__UserQuery($login: String!) {"));
}

#[test]
fn synthesized_operation_wraps_a_bare_fragment() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        "fragment UserLookup on Query { user(login: $login) { login } }",
    ).expect("normalizes");
    let fragment = document.definition_named("UserLookup").expect("fragment");

    let registry = DefinitionRegistry::new();
    registry
        .bind_declaration_path(fragment, "Views::UserLookup")
        .expect("binds");

    let closure = registry.fragment_closure(fragment);
    let variables = infer_variable_definitions(&schema, &closure)
        .expect("infers");
    let printed = print_synthesized_operation(&closure, &variables);

    assert!(printed.starts_with(
        "query Views__UserLookup__operation($login: String!)",
    ));
    assert!(printed.contains("...Views__UserLookup"));
    assert!(printed.contains("fragment Views__UserLookup on Query"));
}
