use crate::operation::Definition;
use crate::operation::DefinitionKind;
use crate::operation::DirectiveAnnotation;
use crate::operation::FieldSelection;
use crate::operation::NodeId;
use crate::operation::OperationKind;
use crate::operation::Selection;
use crate::result::ResultType;
use crate::schema::Schema;
use crate::schema::SchemaType;
use crate::types::ObjectWrapper;
use crate::types::TypeWrapper;
use crate::types::WrapperArena;
use crate::types::WrapperId;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, DescriptorBuildError>;

/// Derive the [`ResultType`] describing the `data` payload produced by a
/// normalized definition.
///
/// For operations the shape is rooted at the schema's root type for the
/// operation kind; for fragments, at the fragment's type condition. Fragments
/// on interface or union types produce a
/// [`Polymorphic`](ResultType::Polymorphic) root with one descriptor per
/// possible concrete type. All type structure is read off the generated
/// [`WrapperArena`]; only the root name comes from the schema.
pub fn derive_result_type(
    schema: &Schema,
    arena: &WrapperArena,
    definition: &Definition,
    collocated_file: Option<Arc<PathBuf>>,
) -> Result<ResultType> {
    let root_type_name = match definition.kind() {
        DefinitionKind::Operation(op_kind) => schema
            .root_type_name_for(op_kind)
            .ok_or(DescriptorBuildError::NoRootType { kind: op_kind })?
            .to_string(),
        DefinitionKind::Fragment => definition
            .type_condition()
            .ok_or_else(|| DescriptorBuildError::MissingTypeCondition {
                definition_name: definition_display_name(definition),
            })?
            .to_string(),
    };

    let ctx = BuildContext {
        arena,
        collocated_file,
        schema,
        source_name: definition_display_name(definition),
    };
    named_result_type(
        &ctx,
        &root_type_name,
        &[definition.selections().as_slice()],
    )
}

fn definition_display_name(definition: &Definition) -> String {
    definition
        .assigned_global_name()
        .or_else(|| definition.declared_name())
        .unwrap_or("<anonymous>")
        .to_string()
}

struct BuildContext<'build> {
    arena: &'build WrapperArena,
    collocated_file: Option<Arc<PathBuf>>,
    schema: &'build Schema,
    source_name: String,
}

fn named_result_type(
    ctx: &BuildContext,
    type_name: &str,
    selection_sets: &[&[Selection]],
) -> Result<ResultType> {
    // Input objects occupy an arena slot for uniform collision detection,
    // but have no result shape.
    if let Some(SchemaType::InputObject(_)) = ctx.schema.type_named(type_name) {
        return Err(DescriptorBuildError::NotAnOutputType {
            type_name: type_name.to_string(),
        });
    }

    let wrapper_id = ctx.arena.wrapper_id_for_type(type_name).ok_or_else(|| {
        DescriptorBuildError::UnknownType {
            type_name: type_name.to_string(),
        }
    })?;
    shaped_result_type(ctx, wrapper_id, selection_sets)
}

/// Derive the result type at one wrapper position, descending through the
/// arena's structural wrappers and replacing object positions with
/// selection-derived descriptors.
fn shaped_result_type(
    ctx: &BuildContext,
    wrapper_id: WrapperId,
    selection_sets: &[&[Selection]],
) -> Result<ResultType> {
    Ok(match ctx.arena.wrapper(wrapper_id) {
        TypeWrapper::Scalar(wrapper) => ResultType::Scalar(wrapper.clone()),

        TypeWrapper::Enum(wrapper) => ResultType::Enum(wrapper.clone()),

        TypeWrapper::List(list_wrapper) => ResultType::List(Box::new(
            shaped_result_type(ctx, list_wrapper.of(), selection_sets)?,
        )),

        TypeWrapper::NonNull(nonnull_wrapper) => ResultType::NonNull(Box::new(
            shaped_result_type(ctx, nonnull_wrapper.of(), selection_sets)?,
        )),

        TypeWrapper::Object(obj_wrapper) => ResultType::Object(Arc::new(
            build_object_descriptor(ctx, obj_wrapper, selection_sets)?,
        )),

        TypeWrapper::Interface(iface_wrapper) => polymorphic_result_type(
            ctx,
            iface_wrapper.type_name(),
            iface_wrapper.possible_types(),
            selection_sets,
        )?,

        TypeWrapper::Union(union_wrapper) => polymorphic_result_type(
            ctx,
            union_wrapper.type_name(),
            union_wrapper.possible_types(),
            selection_sets,
        )?,

        // Directive wrappers never occupy a field position.
        TypeWrapper::Directive(wrapper) =>
            return Err(DescriptorBuildError::UnknownType {
                type_name: wrapper.directive_name().to_string(),
            }),
    })
}

fn polymorphic_result_type(
    ctx: &BuildContext,
    abstract_type: &str,
    possible_type_ids: &IndexMap<String, WrapperId>,
    selection_sets: &[&[Selection]],
) -> Result<ResultType> {
    let mut possible_types = IndexMap::new();
    for (concrete_name, concrete_id) in possible_type_ids {
        let TypeWrapper::Object(obj_wrapper) = ctx.arena.wrapper(*concrete_id)
        else {
            return Err(DescriptorBuildError::UnknownType {
                type_name: concrete_name.clone(),
            });
        };
        possible_types.insert(
            concrete_name.clone(),
            Arc::new(build_object_descriptor(
                ctx,
                obj_wrapper,
                selection_sets,
            )?),
        );
    }
    Ok(ResultType::Polymorphic(Arc::new(PolymorphicDescriptor {
        abstract_type: abstract_type.to_string(),
        possible_types,
    })))
}

fn build_object_descriptor(
    ctx: &BuildContext,
    obj_wrapper: &ObjectWrapper,
    selection_sets: &[&[Selection]],
) -> Result<ResultDescriptor> {
    // Sibling selections sharing a result key are gathered together, then
    // their sub-selections are merged into one entry per key.
    let mut gathered: IndexMap<String, Vec<Arc<FieldSelection>>> =
        IndexMap::new();
    let mut always_conditional: HashMap<String, bool> = HashMap::new();
    let mut node_ids = BTreeSet::new();
    for selections in selection_sets {
        gather_selections(
            ctx,
            obj_wrapper,
            selections,
            /* conditional = */ false,
            &mut gathered,
            &mut always_conditional,
            &mut node_ids,
        )?;
    }

    let mut fields = IndexMap::new();
    for (result_key, occurrences) in gathered {
        let field_name = occurrences[0].name().to_string();

        let sub_sets: Vec<&[Selection]> = occurrences
            .iter()
            .map(|field| field.selections().as_slice())
            .collect();
        let result_type = if field_name == "__typename" {
            typename_result_type(ctx)?
        } else {
            let field_id = obj_wrapper
                .fields()
                .get(&field_name)
                .copied()
                .ok_or_else(|| DescriptorBuildError::UnknownField {
                    field_name: field_name.clone(),
                    type_name: obj_wrapper.type_name().to_string(),
                })?;
            shaped_result_type(ctx, field_id, &sub_sets)?
        };

        // A field reachable only under `skip`/`include` may be absent from
        // the response; its entry tolerates a missing value.
        let conditional = always_conditional
            .get(&result_key)
            .copied()
            .unwrap_or(false);
        let result_type = if conditional {
            match result_type {
                ResultType::NonNull(inner) => *inner,
                other => other,
            }
        } else {
            result_type
        };

        fields.insert(result_key.clone(), FieldEntry {
            accessor_name: underscore(&result_key),
            result_key,
            result_type,
        });
    }

    Ok(ResultDescriptor {
        collocated_file: ctx.collocated_file.clone(),
        fields,
        node_ids,
        schema_field_names: obj_wrapper.fields().keys().cloned().collect(),
        source_name: ctx.source_name.clone(),
        type_name: obj_wrapper.type_name().to_string(),
    })
}

/// `__typename` is a meta field on every object type: `String!`.
fn typename_result_type(ctx: &BuildContext) -> Result<ResultType> {
    match ctx.arena.wrapper_for_type("String") {
        Some(TypeWrapper::Scalar(wrapper)) => Ok(ResultType::NonNull(
            Box::new(ResultType::Scalar(wrapper.clone())),
        )),
        _ => Err(DescriptorBuildError::UnknownType {
            type_name: "String".to_string(),
        }),
    }
}

/// Flatten one selection set onto a gathered field map for a concrete type,
/// descending through the inline-fragment branches whose type condition
/// applies to that type. A key's conditional flag stays set only while every
/// occurrence of it sits under a `skip`/`include` directive.
fn gather_selections(
    ctx: &BuildContext,
    obj_wrapper: &ObjectWrapper,
    selections: &[Selection],
    conditional: bool,
    gathered: &mut IndexMap<String, Vec<Arc<FieldSelection>>>,
    always_conditional: &mut HashMap<String, bool>,
    node_ids: &mut BTreeSet<NodeId>,
) -> Result<()> {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                selection.collect_node_ids(node_ids);
                let field_conditional = conditional
                    || has_conditional_directive(ctx, field.directives());
                let flag = always_conditional
                    .entry(field.result_key().to_string())
                    .or_insert(true);
                *flag &= field_conditional;
                gathered
                    .entry(field.result_key().to_string())
                    .or_default()
                    .push(field.clone());
            },

            Selection::InlineFragment(inline) => {
                node_ids.insert(selection.node_id());
                if condition_applies(ctx, obj_wrapper, inline.type_condition()) {
                    gather_selections(
                        ctx,
                        obj_wrapper,
                        inline.selections(),
                        conditional
                            || has_conditional_directive(ctx, inline.directives()),
                        gathered,
                        always_conditional,
                        node_ids,
                    )?;
                }
            },

            Selection::FragmentSpread(spread) =>
                return Err(DescriptorBuildError::UnresolvedSpread {
                    fragment_name: spread.fragment_name().to_string(),
                }),
        }
    }
    Ok(())
}

fn has_conditional_directive(
    ctx: &BuildContext,
    directives: &[DirectiveAnnotation],
) -> bool {
    directives.iter().any(|directive| {
        ctx.arena.directive_wrapper(directive.name()).is_some()
    })
}

/// Whether a branch conditioned on `condition` applies to the concrete
/// object type: the type itself, an interface it composes, or a union it
/// belongs to.
fn condition_applies(
    ctx: &BuildContext,
    obj_wrapper: &ObjectWrapper,
    condition: Option<&str>,
) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    if condition == obj_wrapper.type_name() {
        return true;
    }
    let Some(condition_id) = ctx.arena.wrapper_id_for_type(condition) else {
        return false;
    };
    match ctx.arena.wrapper(condition_id) {
        TypeWrapper::Interface(_) =>
            obj_wrapper.interfaces().contains(&condition_id),
        TypeWrapper::Union(union_wrapper) => union_wrapper
            .possible_types()
            .contains_key(obj_wrapper.type_name()),
        _ => false,
    }
}

/// The derived shape of the values a definition produces for one concrete
/// object type.
///
/// Carries the set of selection node ids it was derived from; because
/// inlined fragment spreads share the source fragment's selection nodes,
/// "this result includes everything fragment F selects" is a plain subset
/// test over these ids.
#[derive(Clone, Debug)]
pub struct ResultDescriptor {
    pub(crate) collocated_file: Option<Arc<PathBuf>>,
    pub(crate) fields: IndexMap<String, FieldEntry>,
    pub(crate) node_ids: BTreeSet<NodeId>,
    pub(crate) schema_field_names: Vec<String>,
    pub(crate) source_name: String,
    pub(crate) type_name: String,
}
impl ResultDescriptor {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    /// The display name of the definition this descriptor was derived for.
    pub fn source_name(&self) -> &str {
        self.source_name.as_str()
    }

    /// Field entries keyed by result key, in selection order.
    pub fn fields(&self) -> &IndexMap<String, FieldEntry> {
        &self.fields
    }

    pub fn node_ids(&self) -> &BTreeSet<NodeId> {
        &self.node_ids
    }

    pub(crate) fn collocated_file(&self) -> Option<&Path> {
        self.collocated_file.as_deref().map(PathBuf::as_path)
    }

    /// Look up a field entry by result key or by derived snake_case accessor
    /// name, so `profileUrl` and `profile_url` resolve to the same entry.
    pub fn entry(&self, key: &str) -> Option<&FieldEntry> {
        if let Some(entry) = self.fields.get(key) {
            return Some(entry);
        }
        self.fields.values().find(|entry| entry.accessor_name == key)
    }
}
impl std::ops::BitOr for &ResultDescriptor {
    type Output = ResultDescriptor;

    /// Merge two descriptors field-by-field. Shared keys merge recursively;
    /// identity (source name, type name, collocation) comes from the
    /// left-hand side.
    fn bitor(self, other: &ResultDescriptor) -> ResultDescriptor {
        let mut fields = self.fields.clone();
        for (key, right_entry) in &other.fields {
            match fields.get_mut(key) {
                None => {
                    fields.insert(key.clone(), right_entry.clone());
                },
                Some(left_entry) => {
                    left_entry.result_type = left_entry
                        .result_type
                        .merge(&right_entry.result_type);
                },
            }
        }

        let mut node_ids = self.node_ids.clone();
        node_ids.extend(other.node_ids.iter().copied());

        ResultDescriptor {
            collocated_file: self.collocated_file.clone(),
            fields,
            node_ids,
            schema_field_names: self.schema_field_names.clone(),
            source_name: self.source_name.clone(),
            type_name: self.type_name.clone(),
        }
    }
}

/// One selected field within a [`ResultDescriptor`].
#[derive(Clone, Debug)]
pub struct FieldEntry {
    pub(crate) accessor_name: String,
    pub(crate) result_key: String,
    pub(crate) result_type: ResultType,
}
impl FieldEntry {
    /// The snake_case name the field is readable under.
    pub fn accessor_name(&self) -> &str {
        self.accessor_name.as_str()
    }

    /// The key the value appears under in response JSON.
    pub fn result_key(&self) -> &str {
        self.result_key.as_str()
    }

    pub fn result_type(&self) -> &ResultType {
        &self.result_type
    }
}

/// Per-concrete-type descriptors for a selection on an interface or union
/// type, dispatched over `__typename` at cast time.
#[derive(Clone, Debug)]
pub struct PolymorphicDescriptor {
    pub(crate) abstract_type: String,
    pub(crate) possible_types: IndexMap<String, Arc<ResultDescriptor>>,
}
impl PolymorphicDescriptor {
    pub fn abstract_type(&self) -> &str {
        self.abstract_type.as_str()
    }

    pub fn possible_types(&self) -> &IndexMap<String, Arc<ResultDescriptor>> {
        &self.possible_types
    }
}

/// Translate a result key to the snake_case accessor spelling:
/// `profileURL` becomes `profile_url`.
pub(crate) fn underscore(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (idx, ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let after_lower = idx > 0
                && (chars[idx - 1].is_ascii_lowercase()
                    || chars[idx - 1].is_ascii_digit());
            let before_lower = chars
                .get(idx + 1)
                .is_some_and(|next| next.is_ascii_lowercase());
            if idx > 0 && (after_lower || before_lower) && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(*ch);
        }
    }
    out
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DescriptorBuildError {
    #[error(
        "Fragment `{definition_name}` has no type condition to derive a \
        result shape from"
    )]
    MissingTypeCondition {
        definition_name: String,
    },

    #[error("Schema defines no root type for {kind} operations")]
    NoRootType {
        kind: OperationKind,
    },

    #[error("`{type_name}` is an input type and cannot appear in results")]
    NotAnOutputType {
        type_name: String,
    },

    #[error("Type `{type_name}` has no field named `{field_name}`")]
    UnknownField {
        field_name: String,
        type_name: String,
    },

    #[error("Reference to unknown schema type `{type_name}`")]
    UnknownType {
        type_name: String,
    },

    #[error(
        "Fragment spread `...{fragment_name}` survived normalization; the \
        document was not fully resolved"
    )]
    UnresolvedSpread {
        fragment_name: String,
    },
}
