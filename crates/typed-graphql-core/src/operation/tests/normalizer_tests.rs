use crate::operation::tests::test_utils;
use crate::operation::FragmentTable;
use crate::operation::FragmentTableEntry;
use crate::operation::NormalizeError;
use crate::operation::Selection;
use crate::operation::SpreadResolveError;

#[test]
fn typename_injected_into_polymorphic_selection_sets() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"query PetQuery { pet(name: "felix") { ... on Cat { name } } }"#,
    ).expect("normalizes");

    let query = document.definition_named("PetQuery").expect("query exists");
    let pet = test_utils::field_named(query.selections(), "pet");

    // The discriminant leads the set; the written branch follows.
    let Selection::Field(first) = &pet.selections()[0] else {
        panic!("expected an injected field first");
    };
    assert_eq!(first.name(), "__typename");
    assert!(matches!(
        &pet.selections()[1],
        Selection::InlineFragment(_),
    ));
}

#[test]
fn typename_not_injected_into_monomorphic_sets_with_schema() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"query UserQuery { user(login: "octo") { login } }"#,
    ).expect("normalizes");

    let query = document.definition_named("UserQuery").expect("query exists");
    let user = test_utils::field_named(query.selections(), "user");
    assert!(!user.selections().iter().any(|selection| matches!(
        selection,
        Selection::Field(field) if field.name() == "__typename",
    )));
    // The root set selects on `Query`, also monomorphic.
    assert_eq!(query.selections().len(), 1);
}

#[test]
fn typename_injection_is_unconditional_without_schema() {
    let document = test_utils::normalize(
        None,
        &FragmentTable::new(),
        r#"query UserQuery { user(login: "octo") { login } }"#,
    ).expect("normalizes");

    let query = document.definition_named("UserQuery").expect("query exists");
    let Selection::Field(root_first) = &query.selections()[0] else {
        panic!("expected a field");
    };
    assert_eq!(root_first.name(), "__typename");

    let user = test_utils::field_named(query.selections(), "user");
    let Selection::Field(user_first) = &user.selections()[0] else {
        panic!("expected a field");
    };
    assert_eq!(user_first.name(), "__typename");
}

#[test]
fn typename_injection_is_idempotent() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"query PetQuery {
            pet(name: "felix") { __typename ... on Cat { name } }
        }"#,
    ).expect("normalizes");

    let query = document.definition_named("PetQuery").expect("query exists");
    let pet = test_utils::field_named(query.selections(), "pet");
    let typename_count = pet.selections().iter().filter(|selection| matches!(
        selection,
        Selection::Field(field) if field.name() == "__typename",
    )).count();
    assert_eq!(typename_count, 1);
}

#[test]
fn local_spreads_inline_with_provenance_and_shared_nodes() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat { name }
            query PetQuery { pet(name: "felix") { ...CatName } }
        "#,
    ).expect("normalizes");

    let fragment = document.definition_named("CatName").expect("fragment");
    let query = document.definition_named("PetQuery").expect("query");

    let pet = test_utils::field_named(query.selections(), "pet");
    let inlined = pet.selections().iter().find_map(|selection| {
        match selection {
            Selection::InlineFragment(inline) => Some(inline),
            _ => None,
        }
    }).expect("spread was inlined");

    let source = inlined.source_fragment().expect("provenance recorded");
    assert_eq!(source.id(), fragment.id());
    assert_eq!(inlined.type_condition(), Some("Cat"));

    // The inlined node shares the fragment's selection nodes, so the
    // query's node set contains the fragment's.
    assert!(fragment.node_ids().is_subset(&query.node_ids()));
}

#[test]
fn table_fragments_resolve_across_documents() {
    let schema = test_utils::pets_schema();
    let fragment_doc = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        "fragment DogFacts on Dog { barks }",
    ).expect("fragment normalizes");
    let fragment = fragment_doc
        .definition_named("DogFacts")
        .expect("fragment")
        .clone();

    let mut table = FragmentTable::new();
    table.insert_fragment("DogFacts", fragment.clone());

    let document = test_utils::normalize(
        Some(&schema),
        &table,
        r#"query PetQuery { pet(name: "rex") { ...DogFacts } }"#,
    ).expect("query normalizes");

    let query = document.definition_named("PetQuery").expect("query");
    assert!(fragment.node_ids().is_subset(&query.node_ids()));
}

#[test]
fn unresolved_spread_is_an_error() {
    let schema = test_utils::pets_schema();
    let errors = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"query PetQuery { pet(name: "x") { ...Missing } }"#,
    ).expect_err("spread cannot resolve");

    assert!(errors.iter().any(|error| matches!(
        error,
        NormalizeError::SpreadResolution {
            err: SpreadResolveError::Unresolved { spread_name },
            ..
        } if spread_name == "Missing",
    )));
}

#[test]
fn namespace_spread_suggests_nearest_fragment() {
    let schema = test_utils::pets_schema();
    let mut table = FragmentTable::new();
    table.insert("Views", FragmentTableEntry::Namespace {
        contained_fragments: vec!["Views__CatName".to_string()],
    });

    let errors = test_utils::normalize(
        Some(&schema),
        &table,
        r#"query PetQuery { pet(name: "x") { ...Views } }"#,
    ).expect_err("namespace is not spreadable");

    let rendered = errors[0].to_string();
    assert!(rendered.contains("did you mean `...Views__CatName`?"));
}

#[test]
fn non_fragment_spread_names_the_actual_kind() {
    let schema = test_utils::pets_schema();
    let mut table = FragmentTable::new();
    table.insert("Config", FragmentTableEntry::Foreign {
        kind: "constant".to_string(),
    });

    let errors = test_utils::normalize(
        Some(&schema),
        &table,
        r#"query PetQuery { pet(name: "x") { ...Config } }"#,
    ).expect_err("constants are not spreadable");

    assert!(errors.iter().any(|error| matches!(
        error,
        NormalizeError::SpreadResolution {
            err: SpreadResolveError::NotAFragment { actual_kind, .. },
            ..
        } if actual_kind == "constant",
    )));
}

#[test]
fn fragment_cycles_are_detected() {
    let schema = test_utils::pets_schema();
    let errors = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment Left on Cat { name ...Right }
            fragment Right on Cat { disposition ...Left }
        "#,
    ).expect_err("cycle cannot normalize");

    assert!(errors.iter().any(|error| matches!(
        error,
        NormalizeError::FragmentCycle { cycle_path, .. }
            if cycle_path.len() >= 2,
    )));
}

#[test]
fn duplicate_fragment_names_are_an_error() {
    let schema = test_utils::pets_schema();
    let errors = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat { name }
            fragment CatName on Cat { disposition }
        "#,
    ).expect_err("duplicate names cannot normalize");

    assert!(errors.iter().any(|error| matches!(
        error,
        NormalizeError::DuplicateFragmentName { fragment_name, .. }
            if fragment_name == "CatName",
    )));
}

#[test]
fn spread_site_directives_ride_the_inlined_node() {
    let schema = test_utils::pets_schema();
    let document = test_utils::normalize(
        Some(&schema),
        &FragmentTable::new(),
        r#"
            fragment CatName on Cat @skip(if: $hideCats) { name }
            query PetQuery {
                pet(name: "felix") { ...CatName @include(if: $withCats) }
            }
        "#,
    ).expect("normalizes");

    let query = document.definition_named("PetQuery").expect("query");
    let pet = test_utils::field_named(query.selections(), "pet");
    let inlined = pet.selections().iter().find_map(|selection| {
        match selection {
            Selection::InlineFragment(inline) => Some(inline),
            _ => None,
        }
    }).expect("spread was inlined");

    // Only the spread site's directive lands on the inlined node; the
    // fragment's own directive stays on its definition.
    assert_eq!(inlined.directives().len(), 1);
    assert_eq!(inlined.directives()[0].name(), "include");

    let fragment = document.definition_named("CatName").expect("fragment");
    assert_eq!(fragment.directives().len(), 1);
    assert_eq!(fragment.directives()[0].name(), "skip");
}
