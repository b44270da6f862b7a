use crate::loc;
use crate::operation::OperationKind;
use crate::schema::DirectiveDef;
use crate::schema::FieldDef;
use crate::schema::ObjectDef;
use crate::schema::SchemaType;
use crate::schema::TypeAnnotation;
use indexmap::IndexMap;
use std::sync::OnceLock;

/// The meta field available on every selectable type, used as the
/// discriminant for interface/union result casting.
pub(crate) fn typename_meta_field() -> &'static FieldDef {
    static FIELD: OnceLock<FieldDef> = OnceLock::new();
    FIELD.get_or_init(|| FieldDef {
        arguments: IndexMap::new(),
        def_location: loc::SourceLocation::unknown(),
        name: "__typename".to_string(),
        type_annotation: TypeAnnotation::named("String", /* nullable = */ false),
    })
}

/// An immutable, queryable description of a GraphQL schema.
///
/// Built once via [`SchemaBuilder`](crate::schema::SchemaBuilder) and shared
/// by reference (or [`std::sync::Arc`]) everywhere else. All lookups are
/// read-only, so a `Schema` is freely shareable across threads.
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub(crate) directives: IndexMap<String, DirectiveDef>,
    pub(crate) mutation_type: Option<String>,
    pub(crate) query_type: String,
    pub(crate) subscription_type: Option<String>,
    pub(crate) types: IndexMap<String, SchemaType>,
}
impl Schema {
    pub fn type_named(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    pub fn directive_named(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    /// All named types, in declaration order, skipping introspection-reserved
    /// (`__`-prefixed) names.
    pub fn named_types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types
            .values()
            .filter(|schema_type| !schema_type.name().starts_with("__"))
    }

    /// The name of the root type serving the given operation kind, if the
    /// schema defines one.
    pub fn root_type_name_for(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn root_type_for(&self, kind: OperationKind) -> Option<&SchemaType> {
        self.root_type_name_for(kind)
            .and_then(|name| self.type_named(name))
    }

    /// Resolve a field definition from a parent type and a field name.
    ///
    /// The `__typename` meta field resolves on every object, interface, and
    /// union type. Returns `None` for unknown parent types or fields; callers
    /// in the document walk tolerate this with a null sentinel since one
    /// document may mix definitions sharing fragments whose fields don't all
    /// apply to every context.
    pub fn field_on_type<'schema>(
        &'schema self,
        parent_type: &'schema SchemaType,
        field_name: &str,
    ) -> Option<&'schema FieldDef> {
        if field_name == "__typename" {
            return match parent_type {
                SchemaType::Object(_)
                | SchemaType::Interface(_)
                | SchemaType::Union(_) => Some(typename_meta_field()),
                _ => None,
            };
        }

        parent_type.fields().and_then(|fields| fields.get(field_name))
    }

    /// The concrete object types a value of the named type can be at runtime.
    ///
    /// - Object: itself.
    /// - Interface: every object type declaring it implements the interface.
    /// - Union: the union's members.
    /// - Anything else: empty.
    pub fn possible_types(&self, type_name: &str) -> Vec<&ObjectDef> {
        match self.type_named(type_name) {
            Some(SchemaType::Object(obj_def)) => vec![obj_def],

            Some(SchemaType::Interface(iface_def)) => self.types
                .values()
                .filter_map(|schema_type| schema_type.as_object())
                .filter(|obj_def| obj_def.interfaces.iter().any(
                    |iface_name| iface_name == &iface_def.name,
                ))
                .collect(),

            Some(SchemaType::Union(union_def)) => union_def.members
                .iter()
                .filter_map(|member_name| {
                    self.type_named(member_name)
                        .and_then(SchemaType::as_object)
                })
                .collect(),

            _ => vec![],
        }
    }

    /// Whether `concrete_name` is among the possible types of
    /// `abstract_name`. Used when deciding if a fragment branch applies to a
    /// concrete object type.
    pub fn is_possible_type(
        &self,
        abstract_name: &str,
        concrete_name: &str,
    ) -> bool {
        self.possible_types(abstract_name)
            .iter()
            .any(|obj_def| obj_def.name == concrete_name)
    }
}
