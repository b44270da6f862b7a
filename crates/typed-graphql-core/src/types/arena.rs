use crate::schema::Schema;
use crate::schema::SchemaType;
use crate::schema::TypeAnnotation;
use crate::types::DirectiveWrapper;
use crate::types::EnumWrapper;
use crate::types::InterfaceWrapper;
use crate::types::ListWrapper;
use crate::types::NonNullWrapper;
use crate::types::ObjectWrapper;
use crate::types::ScalarWrapper;
use crate::types::TypeWrapper;
use crate::types::UnionWrapper;
use crate::types::WrapperId;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, TypeGenerateError>;

/// A cached, cycle-safe hierarchy of wrapper types mirroring a schema.
///
/// Construction is two-pass: the first pass declares an id for every named,
/// non-introspection schema type; the second resolves references between
/// them. Ids instead of direct references make the object ↔ interface ↔
/// union cycles a non-issue. Built lazily on first use by the client and
/// memoized for the process, the arena is immutable afterwards and freely
/// shared across threads.
#[derive(Debug)]
pub struct WrapperArena {
    by_directive_name: IndexMap<String, WrapperId>,
    by_type_name: IndexMap<String, WrapperId>,
    list_cache: HashMap<WrapperId, WrapperId>,
    nonnull_cache: HashMap<WrapperId, WrapperId>,
    wrappers: Vec<TypeWrapper>,
}
impl WrapperArena {
    pub fn generate(schema: &Schema) -> Result<Self> {
        let mut arena = WrapperArena {
            by_directive_name: IndexMap::new(),
            by_type_name: IndexMap::new(),
            list_cache: HashMap::new(),
            nonnull_cache: HashMap::new(),
            wrappers: vec![],
        };

        // Pass 1: declare an id (and detect symbol-name collisions) for
        // every named type.
        let mut symbol_names: HashMap<String, String> = HashMap::new();
        for schema_type in schema.named_types() {
            let type_name = schema_type.name().to_string();
            let symbol_name = derive_symbol_name(&type_name);

            if let Some(existing) = symbol_names.get(&symbol_name) {
                return Err(TypeGenerateError::DuplicateDerivedTypeName {
                    symbol_name,
                    type1: existing.clone(),
                    type2: type_name,
                });
            }
            symbol_names.insert(symbol_name, type_name.clone());

            let id = WrapperId(arena.wrappers.len() as u32);
            // Placeholder; replaced during pass 2.
            arena.wrappers.push(TypeWrapper::Directive(DirectiveWrapper {
                directive_name: String::new(),
            }));
            arena.by_type_name.insert(type_name, id);
        }

        // Pass 2: resolve references.
        for schema_type in schema.named_types() {
            let id = arena.by_type_name[schema_type.name()];
            let wrapper = arena.resolve_named_type(schema, schema_type)?;
            arena.wrappers[id.0 as usize] = wrapper;
        }

        for directive_name in ["skip", "include"] {
            let id = WrapperId(arena.wrappers.len() as u32);
            arena.wrappers.push(TypeWrapper::Directive(DirectiveWrapper {
                directive_name: directive_name.to_string(),
            }));
            arena.by_directive_name.insert(directive_name.to_string(), id);
        }

        log::debug!(
            "generated {} type wrappers from schema",
            arena.wrappers.len(),
        );

        Ok(arena)
    }

    pub fn wrapper(&self, id: WrapperId) -> &TypeWrapper {
        &self.wrappers[id.0 as usize]
    }

    pub fn wrapper_id_for_type(&self, type_name: &str) -> Option<WrapperId> {
        self.by_type_name.get(type_name).copied()
    }

    pub fn wrapper_for_type(&self, type_name: &str) -> Option<&TypeWrapper> {
        self.wrapper_id_for_type(type_name)
            .map(|id| self.wrapper(id))
    }

    /// The wrapper for one of the built-in conditional (`skip`/`include`)
    /// directives. A field or spread carrying one of these may be absent
    /// from the response, so casting treats its type as nullable.
    pub fn directive_wrapper(
        &self,
        directive_name: &str,
    ) -> Option<&DirectiveWrapper> {
        let id = self.by_directive_name.get(directive_name)?;
        match self.wrapper(*id) {
            TypeWrapper::Directive(wrapper) => Some(wrapper),
            _ => None,
        }
    }

    fn resolve_named_type(
        &mut self,
        schema: &Schema,
        schema_type: &SchemaType,
    ) -> Result<TypeWrapper> {
        let type_name = schema_type.name().to_string();
        let symbol_name = derive_symbol_name(&type_name);

        Ok(match schema_type {
            SchemaType::Scalar(scalar_def) =>
                TypeWrapper::Scalar(ScalarWrapper {
                    coercion: *scalar_def.coercion(),
                    symbol_name,
                    type_name,
                }),

            SchemaType::Enum(enum_def) =>
                TypeWrapper::Enum(EnumWrapper {
                    symbol_name,
                    type_name,
                    values: Arc::new(
                        enum_def.values()
                            .iter()
                            .map(|value| value.name().to_string())
                            .collect(),
                    ),
                }),

            SchemaType::Object(obj_def) => {
                let fields = self.resolve_field_wrappers(
                    obj_def.fields().iter().map(|(name, field_def)| {
                        (name.as_str(), field_def.type_annotation())
                    }),
                )?;
                let interfaces = obj_def.interfaces()
                    .iter()
                    .map(|iface_name| self.require_type(iface_name))
                    .collect::<Result<Vec<_>>>()?;
                TypeWrapper::Object(ObjectWrapper {
                    fields,
                    interfaces,
                    symbol_name,
                    type_name,
                })
            },

            SchemaType::Interface(iface_def) => {
                let fields = self.resolve_field_wrappers(
                    iface_def.fields().iter().map(|(name, field_def)| {
                        (name.as_str(), field_def.type_annotation())
                    }),
                )?;
                TypeWrapper::Interface(InterfaceWrapper {
                    fields,
                    possible_types: self.possible_type_map(schema, &type_name)?,
                    symbol_name,
                    type_name,
                })
            },

            SchemaType::Union(_) =>
                TypeWrapper::Union(UnionWrapper {
                    possible_types: self.possible_type_map(schema, &type_name)?,
                    symbol_name,
                    type_name,
                }),

            // Input objects take part in requests, not response casting, but
            // they still occupy their declared id so name collisions are
            // caught uniformly.
            SchemaType::InputObject(inputobj_def) =>
                TypeWrapper::Object(ObjectWrapper {
                    fields: IndexMap::new(),
                    interfaces: vec![],
                    symbol_name,
                    type_name: inputobj_def.name().to_string(),
                }),
        })
    }

    fn resolve_field_wrappers<'a>(
        &mut self,
        fields: impl Iterator<Item = (&'a str, &'a TypeAnnotation)>,
    ) -> Result<IndexMap<String, WrapperId>> {
        let mut out = IndexMap::new();
        for (field_name, annotation) in fields {
            let id = self.intern_annotation(annotation)?;
            out.insert(field_name.to_string(), id);
        }
        Ok(out)
    }

    /// Build (or reuse) the wrapper chain for one type annotation:
    /// `[Foo!]!` becomes `NonNull(List(NonNull(Foo)))`.
    fn intern_annotation(
        &mut self,
        annotation: &TypeAnnotation,
    ) -> Result<WrapperId> {
        let inner_id = match annotation {
            TypeAnnotation::Named(named_annot) =>
                self.require_type(named_annot.name())?,
            TypeAnnotation::List(list_annot) => {
                let of = self.intern_annotation(list_annot.inner())?;
                self.intern_list(of)
            },
        };

        Ok(if annotation.nullable() {
            inner_id
        } else {
            self.intern_nonnull(inner_id)
        })
    }

    fn intern_list(&mut self, of: WrapperId) -> WrapperId {
        if let Some(id) = self.list_cache.get(&of) {
            return *id;
        }
        let id = WrapperId(self.wrappers.len() as u32);
        self.wrappers.push(TypeWrapper::List(ListWrapper { of }));
        self.list_cache.insert(of, id);
        id
    }

    fn intern_nonnull(&mut self, of: WrapperId) -> WrapperId {
        if let Some(id) = self.nonnull_cache.get(&of) {
            return *id;
        }
        let id = WrapperId(self.wrappers.len() as u32);
        self.wrappers.push(TypeWrapper::NonNull(NonNullWrapper { of }));
        self.nonnull_cache.insert(of, id);
        id
    }

    fn require_type(&self, type_name: &str) -> Result<WrapperId> {
        self.by_type_name
            .get(type_name)
            .copied()
            .ok_or_else(|| TypeGenerateError::UnknownTypeReference {
                type_name: type_name.to_string(),
            })
    }

    fn possible_type_map(
        &self,
        schema: &Schema,
        abstract_type_name: &str,
    ) -> Result<IndexMap<String, WrapperId>> {
        let mut map = IndexMap::new();
        for obj_def in schema.possible_types(abstract_type_name) {
            map.insert(
                obj_def.name().to_string(),
                self.require_type(obj_def.name())?,
            );
        }
        Ok(map)
    }
}

/// Derive a type's symbol name from its schema name: camel-cased only if not
/// already capitalized.
fn derive_symbol_name(type_name: &str) -> String {
    let already_capitalized = type_name
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_uppercase());
    if already_capitalized && !type_name.contains('_') {
        return type_name.to_string();
    }

    let mut out = String::with_capacity(type_name.len());
    let mut capitalize_next = true;
    for ch in type_name.chars() {
        if ch == '_' {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TypeGenerateError {
    #[error(
        "Schema types `{type1}` and `{type2}` both derive the symbol name \
        `{symbol_name}`"
    )]
    DuplicateDerivedTypeName {
        symbol_name: String,
        type1: String,
        type2: String,
    },

    #[error("Reference to unknown schema type `{type_name}`")]
    UnknownTypeReference {
        type_name: String,
    },
}
