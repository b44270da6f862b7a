#[allow(clippy::module_inception)]
mod schema;
mod schema_builder;
mod type_annotation;
mod type_definitions;

pub use schema::Schema;
pub use schema_builder::SchemaBuilder;
pub use schema_builder::SchemaBuildError;
pub use type_annotation::ListTypeAnnotation;
pub use type_annotation::NamedTypeAnnotation;
pub use type_annotation::TypeAnnotation;
pub use type_definitions::DirectiveDef;
pub use type_definitions::EnumDef;
pub use type_definitions::EnumValueDef;
pub use type_definitions::FieldDef;
pub use type_definitions::InputObjectDef;
pub use type_definitions::InputValueDef;
pub use type_definitions::InterfaceDef;
pub use type_definitions::ObjectDef;
pub use type_definitions::ScalarCoercion;
pub use type_definitions::ScalarCoercionError;
pub use type_definitions::ScalarDef;
pub use type_definitions::SchemaType;
pub use type_definitions::TypeKind;
pub use type_definitions::UnionDef;

#[cfg(test)]
mod tests;
