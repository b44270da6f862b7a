use crate::operation::OperationKind;
use crate::schema::ScalarCoercion;
use crate::schema::Schema;
use crate::schema::SchemaBuildError;
use crate::schema::SchemaBuilder;
use crate::schema::SchemaType;
use serde_json::json;

type Result<T> = std::result::Result<T, SchemaBuildError>;

const PETS_SDL: &str = r#"
    type Query {
        node(id: ID!): Node
        pet(name: String): Pet
        user(login: String!): User
    }

    interface Node {
        id: ID!
    }

    type User implements Node {
        id: ID!
        login: String!
        profileURL: String
    }

    union Pet = Cat | Dog

    type Cat implements Node {
        id: ID!
        name: String!
    }

    type Dog implements Node {
        id: ID!
        name: String!
    }

    scalar DateTime
"#;

fn pets_schema() -> Result<Schema> {
    SchemaBuilder::from_str(None, PETS_SDL)?.build()
}

#[test]
fn query_root_defaults_to_query_object_type() -> Result<()> {
    let schema = pets_schema()?;
    assert_eq!(
        schema.root_type_name_for(OperationKind::Query),
        Some("Query"),
    );
    assert_eq!(schema.root_type_name_for(OperationKind::Mutation), None);
    Ok(())
}

#[test]
fn missing_query_root_is_an_error() -> Result<()> {
    let result = SchemaBuilder::from_str(
        None,
        "type Widget { id: ID! }",
    )?.build();
    assert!(matches!(
        result,
        Err(SchemaBuildError::NoQueryOperationTypeDefined),
    ));
    Ok(())
}

#[test]
fn duplicate_type_definition_is_an_error() {
    let result = SchemaBuilder::from_str(
        None,
        "type Query { a: Int }
         type Widget { id: ID! }
         type Widget { id: ID! }",
    );
    assert!(matches!(
        result,
        Err(SchemaBuildError::DuplicateTypeDefinition { type_name, .. })
            if type_name == "Widget",
    ));
}

#[test]
fn duplicate_field_definition_is_an_error() {
    let result = SchemaBuilder::from_str(
        None,
        "type Query { a: Int, a: Int }",
    );
    assert!(matches!(
        result,
        Err(SchemaBuildError::DuplicateFieldNameDefinition {
            type_name,
            field_name,
            ..
        }) if type_name == "Query" && field_name == "a",
    ));
}

#[test]
fn field_lookup_resolves_declared_and_meta_fields() -> Result<()> {
    let schema = pets_schema()?;
    let user_type = schema.type_named("User").expect("User is defined");

    let login = schema
        .field_on_type(user_type, "login")
        .expect("login is defined");
    assert_eq!(login.type_annotation().to_graphql_string(), "String!");

    let typename = schema
        .field_on_type(user_type, "__typename")
        .expect("__typename resolves on objects");
    assert_eq!(typename.type_annotation().to_graphql_string(), "String!");

    assert!(schema.field_on_type(user_type, "nonsense").is_none());
    Ok(())
}

#[test]
fn possible_types_for_interface_and_union() -> Result<()> {
    let schema = pets_schema()?;

    let node_types: Vec<&str> = schema
        .possible_types("Node")
        .iter()
        .map(|obj_def| obj_def.name())
        .collect();
    assert_eq!(node_types, vec!["User", "Cat", "Dog"]);

    let pet_types: Vec<&str> = schema
        .possible_types("Pet")
        .iter()
        .map(|obj_def| obj_def.name())
        .collect();
    assert_eq!(pet_types, vec!["Cat", "Dog"]);

    assert!(schema.is_possible_type("Pet", "Cat"));
    assert!(!schema.is_possible_type("Pet", "User"));
    Ok(())
}

#[test]
fn id_coercion_presents_numbers_as_strings() {
    let coerced = ScalarCoercion::Id
        .coerce_output("ID", &json!(42))
        .expect("numbers coerce as IDs");
    assert_eq!(coerced, json!("42"));
}

#[test]
fn int_coercion_rejects_strings() {
    assert!(ScalarCoercion::Int.coerce_output("Int", &json!("42")).is_err());
    assert!(ScalarCoercion::Int.coerce_output("Int", &json!(42)).is_ok());
}

#[test]
fn custom_scalars_pass_values_through() -> Result<()> {
    let schema = pets_schema()?;
    let Some(SchemaType::Scalar(scalar_def)) = schema.type_named("DateTime")
    else {
        panic!("DateTime should be a scalar");
    };
    assert_eq!(scalar_def.coercion(), &ScalarCoercion::Passthrough);

    let raw = json!({ "nested": true });
    let coerced = scalar_def
        .coercion()
        .coerce_output("DateTime", &raw)
        .expect("passthrough accepts anything");
    assert_eq!(coerced, raw);
    Ok(())
}
