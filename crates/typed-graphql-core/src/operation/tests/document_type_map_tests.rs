use crate::operation::tests::test_utils;
use crate::operation::FragmentTable;
use crate::operation::Selection;

#[test]
fn nodes_record_their_unwrapped_result_types() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"query UserQuery {
            user(login: "octo") {
                login
                repositories(first: 5) { totalCount }
            }
        }"#,
    ).expect("normalizes");
    let map = document.type_map();

    let query = document.definition_named("UserQuery").expect("query");
    assert_eq!(map.type_of_definition(query.id()), Some(Some("Query")));

    let user = test_utils::field_named(query.selections(), "user");
    assert_eq!(map.type_of_node(user.node_id), Some(Some("User")));

    let login = test_utils::field_named(user.selections(), "login");
    assert_eq!(map.type_of_node(login.node_id), Some(Some("String")));

    let repositories = test_utils::field_named(user.selections(), "repositories");
    assert_eq!(
        map.type_of_node(repositories.node_id),
        Some(Some("RepositoryConnection")),
    );
}

#[test]
fn fragments_root_at_their_type_condition() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat { name }
            query PetQuery { pet(name: "felix") { ...CatName } }
        "#,
    ).expect("normalizes");
    let map = document.type_map();

    let fragment = document.definition_named("CatName").expect("fragment");
    assert_eq!(map.type_of_definition(fragment.id()), Some(Some("Cat")));

    let query = document.definition_named("PetQuery").expect("query");
    let pet = test_utils::field_named(query.selections(), "pet");
    assert_eq!(map.type_of_node(pet.node_id), Some(Some("Pet")));

    // The inlined spread records its type condition.
    let inlined = pet.selections().iter().find_map(|selection| {
        match selection {
            Selection::InlineFragment(inline) => Some(inline),
            _ => None,
        }
    }).expect("spread was inlined");
    assert_eq!(map.type_of_node(inlined.node_id), Some(Some("Cat")));
}

#[test]
fn unresolvable_fields_record_a_sentinel() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        "query Bad { user(login: \"a\") { blorp } }",
    ).expect("normalizes");
    let map = document.type_map();

    let query = document.definition_named("Bad").expect("query");
    let user = test_utils::field_named(query.selections(), "user");
    let blorp = test_utils::field_named(user.selections(), "blorp");
    assert_eq!(map.type_of_node(blorp.node_id), Some(None));
}
