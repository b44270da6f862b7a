use crate::ast;
use crate::loc;
use crate::operation::OperationKind;
use crate::schema::DirectiveDef;
use crate::schema::EnumDef;
use crate::schema::EnumValueDef;
use crate::schema::FieldDef;
use crate::schema::InputObjectDef;
use crate::schema::InputValueDef;
use crate::schema::InterfaceDef;
use crate::schema::ObjectDef;
use crate::schema::ScalarCoercion;
use crate::schema::ScalarDef;
use crate::schema::Schema;
use crate::schema::SchemaType;
use crate::schema::TypeAnnotation;
use crate::schema::UnionDef;
use crate::Value;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

type Result<T> = std::result::Result<T, SchemaBuildError>;

fn builtin_directive_names() -> &'static HashSet<&'static str> {
    static NAMES: OnceLock<HashSet<&'static str>> = OnceLock::new();
    NAMES.get_or_init(|| {
        HashSet::from([
            "skip",
            "include",
            "deprecated",
            "specifiedBy",
        ])
    })
}

const BUILTIN_SCALAR_NAMES: [&str; 5] =
    ["Boolean", "Float", "ID", "Int", "String"];

/// Utility for building a [`Schema`] from SDL text.
#[derive(Debug)]
pub struct SchemaBuilder {
    directives: IndexMap<String, DirectiveDef>,
    mutation_type: Option<NamedTypeDefLocation>,
    query_type: Option<NamedTypeDefLocation>,
    str_load_counter: u16,
    subscription_type: Option<NamedTypeDefLocation>,
    types: IndexMap<String, SchemaType>,
}
impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            directives: IndexMap::new(),
            mutation_type: None,
            query_type: None,
            str_load_counter: 0,
            subscription_type: None,
            types: IndexMap::new(),
        }
    }

    pub fn from_str(
        file_path: Option<PathBuf>,
        content: impl AsRef<str>,
    ) -> Result<Self> {
        Self::new().load_str(file_path, content.as_ref())
    }

    pub fn load_str(
        mut self,
        file_path: Option<PathBuf>,
        content: &str,
    ) -> Result<Self> {
        let file_path =
            if let Some(file_path) = file_path {
                file_path
            } else {
                let ctr = self.str_load_counter;
                self.str_load_counter += 1;
                PathBuf::from(format!("str://{ctr}"))
            };

        let ast_doc = ast::schema::parse(content)
            .map_err(|err| SchemaBuildError::ParseError {
                file: file_path.to_owned(),
                err: err.to_string(),
            })?;

        for def in ast_doc.definitions {
            self.visit_ast_def(file_path.as_path(), def)?;
        }

        Ok(self)
    }

    pub fn build(mut self) -> Result<Schema> {
        self.inject_missing_builtin_directives();
        self.inject_missing_builtin_scalars();

        let query_type =
            if let Some(def) = self.query_type.take() {
                def.type_name
            } else if matches!(self.types.get("Query"), Some(SchemaType::Object(_))) {
                "Query".to_string()
            } else {
                return Err(SchemaBuildError::NoQueryOperationTypeDefined);
            };

        let mutation_type = self.mutation_type
            .take()
            .map(|def| def.type_name)
            .or_else(|| match self.types.get("Mutation") {
                Some(SchemaType::Object(_)) => Some("Mutation".to_string()),
                _ => None,
            });

        let subscription_type = self.subscription_type
            .take()
            .map(|def| def.type_name)
            .or_else(|| match self.types.get("Subscription") {
                Some(SchemaType::Object(_)) => Some("Subscription".to_string()),
                _ => None,
            });

        log::debug!(
            "built schema with {} named types (query root: `{query_type}`)",
            self.types.len(),
        );

        Ok(Schema {
            directives: self.directives,
            mutation_type,
            query_type,
            subscription_type,
            types: self.types,
        })
    }

    fn inject_missing_builtin_directives(&mut self) {
        if !self.directives.contains_key("skip") {
            self.directives.insert("skip".to_string(), DirectiveDef::Skip);
        }

        if !self.directives.contains_key("include") {
            self.directives.insert("include".to_string(), DirectiveDef::Include);
        }

        if !self.directives.contains_key("deprecated") {
            self.directives.insert("deprecated".to_string(), DirectiveDef::Deprecated);
        }

        if !self.directives.contains_key("specifiedBy") {
            self.directives.insert("specifiedBy".to_string(), DirectiveDef::SpecifiedBy);
        }
    }

    fn inject_missing_builtin_scalars(&mut self) {
        for name in BUILTIN_SCALAR_NAMES {
            if !self.types.contains_key(name) {
                self.types.insert(name.to_string(), SchemaType::Scalar(ScalarDef {
                    coercion: ScalarCoercion::for_scalar_name(name),
                    def_location: loc::SourceLocation::unknown(),
                    name: name.to_string(),
                }));
            }
        }
    }

    fn add_type(
        &mut self,
        schema_type: SchemaType,
    ) -> Result<()> {
        let type_name = schema_type.name().to_string();

        if type_name.starts_with("__") {
            return Err(SchemaBuildError::InvalidDunderPrefixedTypeName {
                def_location: schema_type.def_location().clone(),
                type_name,
            });
        }

        if let Some(existing) = self.types.get(type_name.as_str()) {
            return Err(SchemaBuildError::DuplicateTypeDefinition {
                type_name,
                def1: existing.def_location().clone(),
                def2: schema_type.def_location().clone(),
            });
        }

        self.types.insert(type_name, schema_type);
        Ok(())
    }

    fn visit_ast_def(
        &mut self,
        file_path: &Path,
        def: ast::schema::Definition,
    ) -> Result<()> {
        use ast::schema::Definition;
        match def {
            Definition::SchemaDefinition(schema_def) =>
                self.visit_ast_schemablock_def(file_path, schema_def),
            Definition::TypeDefinition(type_def) =>
                self.visit_ast_type_def(file_path, type_def),
            Definition::TypeExtension(type_ext) =>
                Err(SchemaBuildError::UnsupportedTypeExtension {
                    type_name: type_extension_name(&type_ext),
                }),
            Definition::DirectiveDefinition(directive_def) =>
                self.visit_ast_directive_def(file_path, directive_def),
        }
    }

    fn visit_ast_schemablock_def(
        &mut self,
        file_path: &Path,
        schema_def: ast::schema::SchemaDefinition,
    ) -> Result<()> {
        if let Some(type_name) = &schema_def.query {
            let typedef_loc = NamedTypeDefLocation::from_pos(
                type_name.to_string(),
                file_path,
                schema_def.position,
            );
            if let Some(existing) = &self.query_type {
                return Err(SchemaBuildError::DuplicateOperationDefinition {
                    operation: OperationKind::Query,
                    location1: existing.clone(),
                    location2: typedef_loc,
                });
            }
            self.query_type = Some(typedef_loc);
        }

        if let Some(type_name) = &schema_def.mutation {
            let typedef_loc = NamedTypeDefLocation::from_pos(
                type_name.to_string(),
                file_path,
                schema_def.position,
            );
            if let Some(existing) = &self.mutation_type {
                return Err(SchemaBuildError::DuplicateOperationDefinition {
                    operation: OperationKind::Mutation,
                    location1: existing.clone(),
                    location2: typedef_loc,
                });
            }
            self.mutation_type = Some(typedef_loc);
        }

        if let Some(type_name) = &schema_def.subscription {
            let typedef_loc = NamedTypeDefLocation::from_pos(
                type_name.to_string(),
                file_path,
                schema_def.position,
            );
            if let Some(existing) = &self.subscription_type {
                return Err(SchemaBuildError::DuplicateOperationDefinition {
                    operation: OperationKind::Subscription,
                    location1: existing.clone(),
                    location2: typedef_loc,
                });
            }
            self.subscription_type = Some(typedef_loc);
        }

        Ok(())
    }

    fn visit_ast_type_def(
        &mut self,
        file_path: &Path,
        type_def: ast::schema::TypeDefinition,
    ) -> Result<()> {
        use ast::schema::TypeDefinition;
        let schema_type = match type_def {
            TypeDefinition::Scalar(scalar_def) =>
                SchemaType::Scalar(ScalarDef {
                    coercion: ScalarCoercion::for_scalar_name(scalar_def.name.as_str()),
                    def_location: loc::SourceLocation::from_pos(
                        Some(file_path),
                        scalar_def.position,
                    ),
                    name: scalar_def.name,
                }),

            TypeDefinition::Enum(enum_def) => {
                let def_location = loc::SourceLocation::from_pos(
                    Some(file_path),
                    enum_def.position,
                );

                if enum_def.values.is_empty() {
                    return Err(SchemaBuildError::EnumWithNoVariants {
                        type_name: enum_def.name,
                        location: def_location,
                    });
                }

                SchemaType::Enum(EnumDef {
                    def_location,
                    name: enum_def.name,
                    values: enum_def.values.iter().map(|value| EnumValueDef {
                        def_location: loc::SourceLocation::from_pos(
                            Some(file_path),
                            value.position,
                        ),
                        name: value.name.clone(),
                    }).collect(),
                })
            },

            TypeDefinition::Object(obj_def) =>
                SchemaType::Object(ObjectDef {
                    def_location: loc::SourceLocation::from_pos(
                        Some(file_path),
                        obj_def.position,
                    ),
                    fields: self.visit_ast_fields(
                        file_path,
                        obj_def.name.as_str(),
                        &obj_def.fields,
                    )?,
                    interfaces: obj_def.implements_interfaces.clone(),
                    name: obj_def.name,
                }),

            TypeDefinition::Interface(iface_def) =>
                SchemaType::Interface(InterfaceDef {
                    def_location: loc::SourceLocation::from_pos(
                        Some(file_path),
                        iface_def.position,
                    ),
                    fields: self.visit_ast_fields(
                        file_path,
                        iface_def.name.as_str(),
                        &iface_def.fields,
                    )?,
                    name: iface_def.name,
                }),

            TypeDefinition::Union(union_def) =>
                SchemaType::Union(UnionDef {
                    def_location: loc::SourceLocation::from_pos(
                        Some(file_path),
                        union_def.position,
                    ),
                    members: union_def.types.clone(),
                    name: union_def.name,
                }),

            TypeDefinition::InputObject(inputobj_def) =>
                SchemaType::InputObject(InputObjectDef {
                    def_location: loc::SourceLocation::from_pos(
                        Some(file_path),
                        inputobj_def.position,
                    ),
                    input_fields: inputobj_def.fields.iter().map(|input_val| (
                        input_val.name.clone(),
                        Self::visit_ast_input_value(file_path, input_val),
                    )).collect(),
                    name: inputobj_def.name,
                }),
        };

        self.add_type(schema_type)
    }

    fn visit_ast_fields(
        &mut self,
        file_path: &Path,
        type_name: &str,
        ast_fields: &[ast::schema::Field],
    ) -> Result<IndexMap<String, FieldDef>> {
        let mut fields = IndexMap::new();
        for ast_field in ast_fields {
            let def_location = loc::SourceLocation::from_pos(
                Some(file_path),
                ast_field.position,
            );

            if ast_field.name.starts_with("__") {
                return Err(SchemaBuildError::InvalidDunderPrefixedFieldName {
                    def_location,
                    field_name: ast_field.name.clone(),
                    type_name: type_name.to_string(),
                });
            }

            if let Some(existing) = fields.get(ast_field.name.as_str()) {
                let existing: &FieldDef = existing;
                return Err(SchemaBuildError::DuplicateFieldNameDefinition {
                    type_name: type_name.to_string(),
                    field_name: ast_field.name.clone(),
                    field_def1: existing.def_location.clone(),
                    field_def2: def_location,
                });
            }

            fields.insert(ast_field.name.clone(), FieldDef {
                arguments: ast_field.arguments.iter().map(|input_val| (
                    input_val.name.clone(),
                    Self::visit_ast_input_value(file_path, input_val),
                )).collect(),
                def_location,
                name: ast_field.name.clone(),
                type_annotation: TypeAnnotation::from_ast_type(
                    &ast_field.field_type,
                ),
            });
        }
        Ok(fields)
    }

    fn visit_ast_input_value(
        file_path: &Path,
        input_val: &ast::schema::InputValue,
    ) -> InputValueDef {
        InputValueDef {
            def_location: loc::SourceLocation::from_pos(
                Some(file_path),
                input_val.position,
            ),
            default_value: input_val.default_value
                .as_ref()
                .map(Value::from_ast),
            name: input_val.name.clone(),
            type_annotation: TypeAnnotation::from_ast_type(
                &input_val.value_type,
            ),
        }
    }

    fn visit_ast_directive_def(
        &mut self,
        file_path: &Path,
        def: ast::schema::DirectiveDefinition,
    ) -> Result<()> {
        let def_location = loc::SourceLocation::from_pos(
            Some(file_path),
            def.position,
        );

        if builtin_directive_names().contains(def.name.as_str()) {
            return Err(SchemaBuildError::RedefinitionOfBuiltinDirective {
                directive_name: def.name,
                location: def_location,
            });
        }

        if let Some(DirectiveDef::Custom { def_location: existing_loc, .. })
            = self.directives.get(def.name.as_str())
        {
            return Err(SchemaBuildError::DuplicateDirectiveDefinition {
                directive_name: def.name.clone(),
                location1: existing_loc.clone(),
                location2: def_location,
            });
        }

        self.directives.insert(def.name.to_string(), DirectiveDef::Custom {
            args: def.arguments.iter().map(|input_val| (
                input_val.name.clone(),
                Self::visit_ast_input_value(file_path, input_val),
            )).collect(),
            def_location,
            name: def.name.to_string(),
        });

        Ok(())
    }
}
impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn type_extension_name(ext: &ast::schema::TypeExtension) -> String {
    use graphql_parser::schema::TypeExtension;
    match ext {
        TypeExtension::Scalar(ext) => ext.name.clone(),
        TypeExtension::Object(ext) => ext.name.clone(),
        TypeExtension::Interface(ext) => ext.name.clone(),
        TypeExtension::Union(ext) => ext.name.clone(),
        TypeExtension::Enum(ext) => ext.name.clone(),
        TypeExtension::InputObject(ext) => ext.name.clone(),
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaBuildError {
    #[error("Multiple directives were defined with the name `{directive_name}`")]
    DuplicateDirectiveDefinition {
        directive_name: String,
        location1: loc::SourceLocation,
        location2: loc::SourceLocation,
    },

    #[error(
        "Multiple fields named `{field_name}` were defined on the \
        `{type_name}` type"
    )]
    DuplicateFieldNameDefinition {
        type_name: String,
        field_name: String,
        field_def1: loc::SourceLocation,
        field_def2: loc::SourceLocation,
    },

    #[error("Multiple definitions of the {operation} root operation type")]
    DuplicateOperationDefinition {
        operation: OperationKind,
        location1: NamedTypeDefLocation,
        location2: NamedTypeDefLocation,
    },

    #[error("Multiple GraphQL types were defined with the name `{type_name}`")]
    DuplicateTypeDefinition {
        type_name: String,
        def1: loc::SourceLocation,
        def2: loc::SourceLocation,
    },

    #[error("Enum type `{type_name}` must define one or more variants")]
    EnumWithNoVariants {
        type_name: String,
        location: loc::SourceLocation,
    },

    #[error("Field names must not start with `__`: `{type_name}.{field_name}`")]
    InvalidDunderPrefixedFieldName {
        def_location: loc::SourceLocation,
        field_name: String,
        type_name: String,
    },

    #[error("Type names must not start with `__`: `{type_name}`")]
    InvalidDunderPrefixedTypeName {
        def_location: loc::SourceLocation,
        type_name: String,
    },

    #[error("Attempted to build a schema that has no Query operation type defined")]
    NoQueryOperationTypeDefined,

    #[error("Error parsing schema string: {err}")]
    ParseError {
        file: PathBuf,
        err: String,
    },

    #[error("Attempted to redefine the builtin `{directive_name}` directive")]
    RedefinitionOfBuiltinDirective {
        directive_name: String,
        location: loc::SourceLocation,
    },

    #[error("Type extensions are not supported (extension of `{type_name}`)")]
    UnsupportedTypeExtension {
        type_name: String,
    },
}

/// Represents the file location of a given type's definition in the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTypeDefLocation {
    pub def_location: loc::SourceLocation,
    pub type_name: String,
}
impl NamedTypeDefLocation {
    pub(crate) fn from_pos(
        type_name: String,
        file: &Path,
        pos: graphql_parser::Pos,
    ) -> Self {
        Self {
            def_location: loc::SourceLocation::from_pos(Some(file), pos),
            type_name,
        }
    }
}
