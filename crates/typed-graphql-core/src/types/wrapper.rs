use crate::schema::ScalarCoercion;
use indexmap::IndexMap;
use std::sync::Arc;

/// Stable identity of one wrapper within a
/// [`WrapperArena`](crate::types::WrapperArena).
///
/// Wrappers reference each other by id rather than by direct reference so the
/// cyclic schema type graph (object ↔ interface ↔ union) can be declared in
/// one pass and resolved in a second.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WrapperId(pub(crate) u32);

/// One node in the generated schema type hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeWrapper {
    Scalar(ScalarWrapper),
    Enum(EnumWrapper),
    List(ListWrapper),
    NonNull(NonNullWrapper),
    Object(ObjectWrapper),
    Interface(InterfaceWrapper),
    Union(UnionWrapper),
    Directive(DirectiveWrapper),
}
impl TypeWrapper {
    /// The schema type name for named wrappers; `None` for the structural
    /// list/non-null/directive wrappers.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeWrapper::Scalar(wrapper) => Some(wrapper.type_name.as_str()),
            TypeWrapper::Enum(wrapper) => Some(wrapper.type_name.as_str()),
            TypeWrapper::Object(wrapper) => Some(wrapper.type_name.as_str()),
            TypeWrapper::Interface(wrapper) => Some(wrapper.type_name.as_str()),
            TypeWrapper::Union(wrapper) => Some(wrapper.type_name.as_str()),
            TypeWrapper::List(_)
            | TypeWrapper::NonNull(_)
            | TypeWrapper::Directive(_) => None,
        }
    }

    /// The derived Rust-facing symbol name for named wrappers.
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            TypeWrapper::Scalar(wrapper) => Some(wrapper.symbol_name.as_str()),
            TypeWrapper::Enum(wrapper) => Some(wrapper.symbol_name.as_str()),
            TypeWrapper::Object(wrapper) => Some(wrapper.symbol_name.as_str()),
            TypeWrapper::Interface(wrapper) => Some(wrapper.symbol_name.as_str()),
            TypeWrapper::Union(wrapper) => Some(wrapper.symbol_name.as_str()),
            TypeWrapper::List(_)
            | TypeWrapper::NonNull(_)
            | TypeWrapper::Directive(_) => None,
        }
    }

    /// The `{__typename → concrete wrapper}` dispatch map, for interface and
    /// union wrappers.
    pub fn possible_type_map(&self) -> Option<&IndexMap<String, WrapperId>> {
        match self {
            TypeWrapper::Interface(wrapper) => Some(&wrapper.possible_types),
            TypeWrapper::Union(wrapper) => Some(&wrapper.possible_types),
            _ => None,
        }
    }
}

/// Delegates value coercion to the schema's own scalar coercion.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarWrapper {
    pub(crate) coercion: ScalarCoercion,
    pub(crate) symbol_name: String,
    pub(crate) type_name: String,
}
impl ScalarWrapper {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn coercion(&self) -> &ScalarCoercion {
        &self.coercion
    }
}

/// Wraps an enum's legal value strings.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumWrapper {
    pub(crate) symbol_name: String,
    pub(crate) type_name: String,
    pub(crate) values: Arc<Vec<String>>,
}
impl EnumWrapper {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Thin wrapper casting a JSON array elementwise. Singleton-cached per
/// wrapped type.
#[derive(Clone, Debug, PartialEq)]
pub struct ListWrapper {
    pub(crate) of: WrapperId,
}
impl ListWrapper {
    pub fn of(&self) -> WrapperId {
        self.of
    }
}

/// Thin wrapper raising an invariant violation when the raw value is null.
/// Singleton-cached per wrapped type.
#[derive(Clone, Debug, PartialEq)]
pub struct NonNullWrapper {
    pub(crate) of: WrapperId,
}
impl NonNullWrapper {
    pub fn of(&self) -> WrapperId {
        self.of
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectWrapper {
    /// Field name → the full wrapped type chain of that field.
    pub(crate) fields: IndexMap<String, WrapperId>,
    /// Interfaces composed by inclusion.
    pub(crate) interfaces: Vec<WrapperId>,
    pub(crate) symbol_name: String,
    pub(crate) type_name: String,
}
impl ObjectWrapper {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn fields(&self) -> &IndexMap<String, WrapperId> {
        &self.fields
    }

    pub fn interfaces(&self) -> &Vec<WrapperId> {
        &self.interfaces
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceWrapper {
    pub(crate) fields: IndexMap<String, WrapperId>,
    pub(crate) possible_types: IndexMap<String, WrapperId>,
    pub(crate) symbol_name: String,
    pub(crate) type_name: String,
}
impl InterfaceWrapper {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn possible_types(&self) -> &IndexMap<String, WrapperId> {
        &self.possible_types
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionWrapper {
    pub(crate) possible_types: IndexMap<String, WrapperId>,
    pub(crate) symbol_name: String,
    pub(crate) type_name: String,
}
impl UnionWrapper {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn possible_types(&self) -> &IndexMap<String, WrapperId> {
        &self.possible_types
    }
}

/// Wrapper for the built-in `skip`/`include` directives. Transparent:
/// directive semantics affect request construction, never response casting,
/// so casting forwards to the wrapped type unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveWrapper {
    pub(crate) directive_name: String,
}
impl DirectiveWrapper {
    pub fn directive_name(&self) -> &str {
        self.directive_name.as_str()
    }
}
