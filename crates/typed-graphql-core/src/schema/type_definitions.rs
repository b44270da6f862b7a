use crate::loc;
use crate::schema::TypeAnnotation;
use crate::Value;
use indexmap::IndexMap;
use thiserror::Error;

/// The kind tag a named schema type is enumerable under.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Scalar,
    Enum,
    Object,
    Interface,
    Union,
    InputObject,
}
impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Enum => "ENUM",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::InputObject => "INPUT_OBJECT",
        };
        write!(f, "{str}")
    }
}

/// A named type defined in (or built into) a [`Schema`](crate::schema::Schema).
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaType {
    Scalar(ScalarDef),
    Enum(EnumDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    InputObject(InputObjectDef),
}
impl SchemaType {
    pub fn name(&self) -> &str {
        match self {
            SchemaType::Scalar(def) => def.name.as_str(),
            SchemaType::Enum(def) => def.name.as_str(),
            SchemaType::Object(def) => def.name.as_str(),
            SchemaType::Interface(def) => def.name.as_str(),
            SchemaType::Union(def) => def.name.as_str(),
            SchemaType::InputObject(def) => def.name.as_str(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            SchemaType::Scalar(_) => TypeKind::Scalar,
            SchemaType::Enum(_) => TypeKind::Enum,
            SchemaType::Object(_) => TypeKind::Object,
            SchemaType::Interface(_) => TypeKind::Interface,
            SchemaType::Union(_) => TypeKind::Union,
            SchemaType::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn def_location(&self) -> &loc::SourceLocation {
        match self {
            SchemaType::Scalar(def) => &def.def_location,
            SchemaType::Enum(def) => &def.def_location,
            SchemaType::Object(def) => &def.def_location,
            SchemaType::Interface(def) => &def.def_location,
            SchemaType::Union(def) => &def.def_location,
            SchemaType::InputObject(def) => &def.def_location,
        }
    }

    /// Output-selectable fields, for object and interface types.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        match self {
            SchemaType::Object(def) => Some(&def.fields),
            SchemaType::Interface(def) => Some(&def.fields),
            _ => None,
        }
    }

    /// Whether a selection on this type can only ever produce one concrete
    /// object type. Interfaces, unions, and (defensively) unknown types are
    /// not monomorphic; everything else is.
    pub fn is_monomorphic(&self) -> bool {
        !matches!(self, SchemaType::Interface(_) | SchemaType::Union(_))
    }

    pub fn as_object(&self) -> Option<&ObjectDef> {
        if let SchemaType::Object(def) = self {
            Some(def)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarDef {
    pub(crate) coercion: ScalarCoercion,
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) name: String,
}
impl ScalarDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn coercion(&self) -> &ScalarCoercion {
        &self.coercion
    }
}

/// Output-coercion behavior for a scalar type.
///
/// Built-in scalars check the JSON kind of the raw value; custom scalars pass
/// the raw value through untouched (the server already serialized them).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalarCoercion {
    Boolean,
    Float,
    Id,
    Int,
    Passthrough,
    String,
}
impl ScalarCoercion {
    pub(crate) fn for_scalar_name(name: &str) -> Self {
        match name {
            "Boolean" => ScalarCoercion::Boolean,
            "Float" => ScalarCoercion::Float,
            "ID" => ScalarCoercion::Id,
            "Int" => ScalarCoercion::Int,
            "String" => ScalarCoercion::String,
            _ => ScalarCoercion::Passthrough,
        }
    }

    /// Coerce a raw response value for a scalar-typed field.
    pub fn coerce_output(
        &self,
        scalar_name: &str,
        raw: &serde_json::Value,
    ) -> Result<serde_json::Value, ScalarCoercionError> {
        use serde_json::Value as Json;
        let ok = match self {
            ScalarCoercion::Boolean => raw.is_boolean(),
            ScalarCoercion::Float => raw.is_number(),
            ScalarCoercion::Id => raw.is_string() || raw.is_number(),
            ScalarCoercion::Int => raw.is_i64() || raw.is_u64(),
            ScalarCoercion::Passthrough => true,
            ScalarCoercion::String => raw.is_string(),
        };

        if !ok {
            return Err(ScalarCoercionError::UncoercibleValue {
                scalar_name: scalar_name.to_string(),
                raw: raw.clone(),
            });
        }

        // IDs serialized as numbers are presented as strings.
        if matches!(self, ScalarCoercion::Id) && raw.is_number() {
            return Ok(Json::String(raw.to_string()));
        }

        Ok(raw.clone())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScalarCoercionError {
    #[error("Value `{raw}` cannot be coerced by the `{scalar_name}` scalar")]
    UncoercibleValue {
        scalar_name: String,
        raw: serde_json::Value,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) name: String,
    pub(crate) values: Vec<EnumValueDef>,
}
impl EnumDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn values(&self) -> &Vec<EnumValueDef> {
        &self.values
    }

    /// Exact-match membership check for a raw response value.
    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|value| value.name == name)
    }

    /// Case-insensitive membership check, used by value predicates.
    pub fn has_value_ignore_case(&self, name: &str) -> bool {
        self.values.iter().any(|value| value.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValueDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) name: String,
}
impl EnumValueDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) fields: IndexMap<String, FieldDef>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) name: String,
}
impl ObjectDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDef> {
        &self.fields
    }

    /// Names of the interfaces this object declares it implements.
    pub fn interfaces(&self) -> &Vec<String> {
        &self.interfaces
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) fields: IndexMap<String, FieldDef>,
    pub(crate) name: String,
}
impl InterfaceDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDef> {
        &self.fields
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) members: Vec<String>,
    pub(crate) name: String,
}
impl UnionDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn members(&self) -> &Vec<String> {
        &self.members
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) input_fields: IndexMap<String, InputValueDef>,
    pub(crate) name: String,
}
impl InputObjectDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn input_fields(&self) -> &IndexMap<String, InputValueDef> {
        &self.input_fields
    }
}

/// A field defined on an object or interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub(crate) arguments: IndexMap<String, InputValueDef>,
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) name: String,
    pub(crate) type_annotation: TypeAnnotation,
}
impl FieldDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn arguments(&self) -> &IndexMap<String, InputValueDef> {
        &self.arguments
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }
}

/// An argument on a field or directive, or a field of an input object.
#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDef {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) default_value: Option<Value>,
    pub(crate) name: String,
    pub(crate) type_annotation: TypeAnnotation,
}
impl InputValueDef {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }
}

/// Represents a defined directive.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectiveDef {
    Custom {
        args: IndexMap<String, InputValueDef>,
        def_location: loc::SourceLocation,
        name: String,
    },
    Deprecated,
    Include,
    Skip,
    SpecifiedBy,
}
impl DirectiveDef {
    pub fn name(&self) -> &str {
        match self {
            DirectiveDef::Custom { name, .. } => name.as_str(),
            DirectiveDef::Deprecated => "deprecated",
            DirectiveDef::Include => "include",
            DirectiveDef::Skip => "skip",
            DirectiveDef::SpecifiedBy => "specifiedBy",
        }
    }

    pub fn args(&self) -> Option<&IndexMap<String, InputValueDef>> {
        match self {
            DirectiveDef::Custom { args, .. } => Some(args),
            _ => None,
        }
    }
}
