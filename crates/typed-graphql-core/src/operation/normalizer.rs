use crate::ast;
use crate::loc;
use crate::operation::Definition;
use crate::operation::DefinitionId;
use crate::operation::DefinitionKind;
use crate::operation::DirectiveAnnotation;
use crate::operation::Document;
use crate::operation::DocumentTypeMap;
use crate::operation::FieldSelection;
use crate::operation::FragmentTable;
use crate::operation::InlineFragment;
use crate::operation::NodeId;
use crate::operation::OperationKind;
use crate::operation::Selection;
use crate::operation::SpreadResolveError;
use crate::operation::VariableDefinition;
use crate::schema::Schema;
use crate::schema::TypeAnnotation;
use crate::Value;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::OnceLock;
use thiserror::Error;

type Result<T> = std::result::Result<T, Vec<NormalizeError>>;

/// Normalize a parsed document into the core's immutable AST.
///
/// Normalization (a) resolves every fragment spread, preferring fragments
/// defined in the same document and falling back to the supplied
/// [`FragmentTable`]; (b) injects the `__typename` discriminant into every
/// non-empty selection set, idempotently, skipping monomorphic positions when
/// a `schema` is supplied; (c) replaces each spread with an inlined fragment
/// node that back-references its source fragment, keeps the spread-site
/// directives, and shares the fragment's selection nodes; and (d) freezes the
/// result behind [`Arc`]s so fragments can be reused across many composed
/// documents and threads.
///
/// In schema-aware mode the per-node type resolution performed along the way
/// is recorded into the produced document's [`DocumentTypeMap`].
pub fn normalize_document(
    schema: Option<&Schema>,
    fragment_table: &FragmentTable,
    ast_doc: &ast::query::Document,
    file_path: Option<&Path>,
) -> Result<Document> {
    let mut local_fragments = IndexMap::new();
    let mut errors = vec![];

    for def in &ast_doc.definitions {
        if let ast::query::Definition::Fragment(frag_def) = def {
            let frag_name = frag_def.name.clone();
            if local_fragments.insert(frag_name.clone(), frag_def).is_some() {
                errors.push(NormalizeError::DuplicateFragmentName {
                    fragment_name: frag_name,
                    location: loc::SourceLocation::from_pos(
                        file_path,
                        frag_def.position,
                    ),
                });
            }
        }
    }

    let mut normalizer = Normalizer {
        errors,
        file_path,
        fragment_table,
        local_fragments,
        resolved: IndexMap::new(),
        resolving: vec![],
        schema,
        type_map: DocumentTypeMap::default(),
    };

    let mut definitions = vec![];
    for def in &ast_doc.definitions {
        match def {
            ast::query::Definition::Fragment(frag_def) => {
                let location = loc::SourceLocation::from_pos(
                    file_path,
                    frag_def.position,
                );
                if let Some(fragment) = normalizer.resolve_local_fragment(
                    frag_def.name.as_str(),
                    &location,
                ) {
                    definitions.push(fragment);
                }
            },

            ast::query::Definition::Operation(op_def) => {
                let operation = normalizer.convert_operation(op_def);
                definitions.push(operation);
            },
        }
    }

    if !normalizer.errors.is_empty() {
        return Err(normalizer.errors);
    }

    log::debug!(
        "normalized document with {} definition(s)",
        definitions.len(),
    );

    Ok(Document {
        definitions,
        type_map: normalizer.type_map,
    })
}

struct Normalizer<'a> {
    errors: Vec<NormalizeError>,
    file_path: Option<&'a Path>,
    fragment_table: &'a FragmentTable,
    local_fragments: IndexMap<String, &'a ast::query::FragmentDefinition>,
    resolved: IndexMap<String, Arc<Definition>>,
    resolving: Vec<String>,
    schema: Option<&'a Schema>,
    type_map: DocumentTypeMap,
}
impl<'a> Normalizer<'a> {
    fn convert_operation(
        &mut self,
        op_def: &ast::query::OperationDefinition,
    ) -> Arc<Definition> {
        use ast::query::OperationDefinition as OpDef;
        let (kind, name, var_defs, directives, set, pos) = match op_def {
            OpDef::SelectionSet(set) => (
                OperationKind::Query,
                None,
                &[] as &[ast::query::VariableDefinition],
                &[] as &[ast::query::Directive],
                set,
                set.span.0,
            ),
            OpDef::Query(query) => (
                OperationKind::Query,
                query.name.as_deref(),
                query.variable_definitions.as_slice(),
                query.directives.as_slice(),
                &query.selection_set,
                query.position,
            ),
            OpDef::Mutation(mutation) => (
                OperationKind::Mutation,
                mutation.name.as_deref(),
                mutation.variable_definitions.as_slice(),
                mutation.directives.as_slice(),
                &mutation.selection_set,
                mutation.position,
            ),
            OpDef::Subscription(subscription) => (
                OperationKind::Subscription,
                subscription.name.as_deref(),
                subscription.variable_definitions.as_slice(),
                subscription.directives.as_slice(),
                &subscription.selection_set,
                subscription.position,
            ),
        };

        let root_type_name = self.schema.and_then(
            |schema| schema.root_type_name_for(kind).map(str::to_string),
        );
        let selections = self.convert_selection_set(
            set,
            root_type_name.as_deref(),
        );

        let definition = Arc::new(Definition {
            declared_name: name.map(str::to_string),
            directives: DirectiveAnnotation::from_ast(self.file_path, directives),
            global_name: OnceLock::new(),
            id: DefinitionId::next(),
            kind: DefinitionKind::Operation(kind),
            selections,
            source_location: loc::SourceLocation::from_pos(self.file_path, pos),
            type_condition: None,
            variable_definitions: var_defs.iter().map(|var_def| {
                VariableDefinition {
                    default_value: var_def.default_value
                        .as_ref()
                        .map(Value::from_ast),
                    name: var_def.name.clone(),
                    type_annotation: TypeAnnotation::from_ast_type(
                        &var_def.var_type,
                    ),
                }
            }).collect(),
        });

        if self.schema.is_some() {
            self.type_map.record_definition(definition.id(), root_type_name);
        }
        definition
    }

    /// Resolve a fragment defined in the same document, converting it on
    /// first use and memoizing the result so spreads share its nodes.
    fn resolve_local_fragment(
        &mut self,
        fragment_name: &str,
        ref_location: &loc::SourceLocation,
    ) -> Option<Arc<Definition>> {
        if let Some(fragment) = self.resolved.get(fragment_name) {
            return Some(fragment.clone());
        }

        if self.resolving.iter().any(|name| name == fragment_name) {
            let mut cycle_path = self.resolving.clone();
            cycle_path.push(fragment_name.to_string());
            self.errors.push(NormalizeError::FragmentCycle {
                cycle_path,
                location: ref_location.clone(),
            });
            return None;
        }

        let frag_def = *self.local_fragments.get(fragment_name)?;

        self.resolving.push(fragment_name.to_string());
        let fragment = self.convert_fragment(frag_def);
        self.resolving.pop();

        self.resolved.insert(fragment_name.to_string(), fragment.clone());
        Some(fragment)
    }

    fn convert_fragment(
        &mut self,
        frag_def: &ast::query::FragmentDefinition,
    ) -> Arc<Definition> {
        let ast::query::TypeCondition::On(condition_type) =
            &frag_def.type_condition;
        let condition_type = condition_type.clone();

        let selections = self.convert_selection_set(
            &frag_def.selection_set,
            Some(condition_type.as_str()),
        );

        let fragment = Arc::new(Definition {
            declared_name: Some(frag_def.name.clone()),
            directives: DirectiveAnnotation::from_ast(
                self.file_path,
                &frag_def.directives,
            ),
            global_name: OnceLock::new(),
            id: DefinitionId::next(),
            kind: DefinitionKind::Fragment,
            selections,
            source_location: loc::SourceLocation::from_pos(
                self.file_path,
                frag_def.position,
            ),
            type_condition: Some(condition_type),
            variable_definitions: vec![],
        });

        if self.schema.is_some() {
            self.type_map.record_definition(
                fragment.id(),
                fragment.type_condition().map(str::to_string),
            );
        }
        fragment
    }

    /// Convert one selection set, resolving spreads and injecting the
    /// `__typename` discriminant as the set is built.
    ///
    /// `context_type_name` is the unwrapped type the set selects on, when
    /// known. It narrows both discriminant injection (monomorphic sets skip
    /// it in schema-aware mode) and the child context of each field.
    fn convert_selection_set(
        &mut self,
        set: &ast::query::SelectionSet,
        context_type_name: Option<&str>,
    ) -> Vec<Selection> {
        let mut selections = vec![];
        for ast_selection in &set.items {
            match ast_selection {
                ast::query::Selection::Field(field) => {
                    let child_type_name = self
                        .resolve_field_type(context_type_name, field.name.as_str());
                    let node_id = NodeId::next();
                    if self.schema.is_some() {
                        self.type_map.record_node(
                            node_id,
                            child_type_name.clone(),
                        );
                    }
                    selections.push(Selection::Field(Arc::new(FieldSelection {
                        alias: field.alias.clone(),
                        arguments: field.arguments.iter().map(|(name, value)| (
                            name.clone(),
                            Value::from_ast(value),
                        )).collect(),
                        directives: DirectiveAnnotation::from_ast(
                            self.file_path,
                            &field.directives,
                        ),
                        name: field.name.clone(),
                        node_id,
                        selections: self.convert_selection_set(
                            &field.selection_set,
                            child_type_name.as_deref(),
                        ),
                        source_location: loc::SourceLocation::from_pos(
                            self.file_path,
                            field.position,
                        ),
                    })));
                },

                ast::query::Selection::InlineFragment(inline) => {
                    let condition_type = inline.type_condition.as_ref().map(
                        |ast::query::TypeCondition::On(name)| name.clone(),
                    );
                    let inner_context = condition_type
                        .as_deref()
                        .or(context_type_name);
                    let node_id = NodeId::next();
                    if self.schema.is_some() {
                        self.type_map.record_node(
                            node_id,
                            inner_context.map(str::to_string),
                        );
                    }
                    selections.push(Selection::InlineFragment(Arc::new(
                        InlineFragment {
                            directives: DirectiveAnnotation::from_ast(
                                self.file_path,
                                &inline.directives,
                            ),
                            node_id,
                            selections: self.convert_selection_set(
                                &inline.selection_set,
                                inner_context,
                            ),
                            source_fragment: None,
                            source_location: loc::SourceLocation::from_pos(
                                self.file_path,
                                inline.position,
                            ),
                            type_condition: condition_type,
                        },
                    )));
                },

                ast::query::Selection::FragmentSpread(spread) => {
                    let location = loc::SourceLocation::from_pos(
                        self.file_path,
                        spread.position,
                    );
                    if let Some(inlined) = self.resolve_spread(spread, &location) {
                        selections.push(inlined);
                    }
                },
            }
        }

        if !selections.is_empty()
            && self.should_inject_typename(context_type_name)
            && !has_typename_field(&selections)
        {
            let node_id = NodeId::next();
            if self.schema.is_some() {
                self.type_map.record_node(node_id, Some("String".to_string()));
            }
            selections.insert(0, Selection::Field(Arc::new(FieldSelection {
                alias: None,
                arguments: IndexMap::new(),
                directives: vec![],
                name: "__typename".to_string(),
                node_id,
                selections: vec![],
                source_location: loc::SourceLocation::unknown(),
            })));
        }

        selections
    }

    /// Replace a named spread with an inlined fragment node carrying the
    /// source fragment's type condition and (shared) selections.
    ///
    /// Only the spread-site directives ride the inlined node; the fragment's
    /// own directives stay on its definition, which is printed alongside any
    /// document that spreads it.
    fn resolve_spread(
        &mut self,
        spread: &ast::query::FragmentSpread,
        location: &loc::SourceLocation,
    ) -> Option<Selection> {
        let spread_name = spread.fragment_name.as_str();

        let fragment =
            if let Some(fragment) = self.resolve_local_fragment(spread_name, location) {
                fragment
            } else if self.local_fragments.contains_key(spread_name) {
                // Local fragment that failed to resolve (cycle); the error
                // was already recorded.
                return None;
            } else {
                match self.fragment_table.resolve(spread_name) {
                    Ok(fragment) => fragment.clone(),
                    Err(err) => {
                        self.errors.push(NormalizeError::SpreadResolution {
                            err,
                            location: location.clone(),
                        });
                        return None;
                    }
                }
            };

        let node_id = NodeId::next();
        if self.schema.is_some() {
            self.type_map.record_node(
                node_id,
                fragment.type_condition().map(str::to_string),
            );
        }

        Some(Selection::InlineFragment(Arc::new(InlineFragment {
            directives: DirectiveAnnotation::from_ast(
                self.file_path,
                &spread.directives,
            ),
            node_id,
            selections: fragment.selections().clone(),
            source_fragment: Some(fragment.clone()),
            source_location: location.clone(),
            type_condition: fragment.type_condition().map(str::to_string),
        })))
    }

    /// Unconditional injection without a schema; with one, skip selection
    /// sets whose resolved type can only be a single concrete type.
    fn should_inject_typename(&self, context_type_name: Option<&str>) -> bool {
        let Some(schema) = self.schema else {
            return true;
        };

        match context_type_name.and_then(|name| schema.type_named(name)) {
            Some(schema_type) => !schema_type.is_monomorphic(),
            None => true,
        }
    }

    fn resolve_field_type(
        &self,
        context_type_name: Option<&str>,
        field_name: &str,
    ) -> Option<String> {
        let schema = self.schema?;
        let parent_type = schema.type_named(context_type_name?)?;
        schema.field_on_type(parent_type, field_name)
            .map(|field_def| {
                field_def
                    .type_annotation()
                    .innermost_named_type()
                    .to_string()
            })
    }
}

fn has_typename_field(selections: &[Selection]) -> bool {
    selections.iter().any(|selection| matches!(
        selection,
        Selection::Field(field) if field.name() == "__typename"
    ))
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Fragment `{fragment_name}` is defined more than once")]
    DuplicateFragmentName {
        fragment_name: String,
        location: loc::SourceLocation,
    },

    #[error("Fragment cycle detected: {}", cycle_path.join(" -> "))]
    FragmentCycle {
        cycle_path: Vec<String>,
        location: loc::SourceLocation,
    },

    #[error("{err}")]
    SpreadResolution {
        err: SpreadResolveError,
        location: loc::SourceLocation,
    },
}
