use crate::operation::Definition;
use crate::operation::DefinitionKind;
use crate::operation::DirectiveAnnotation;
use crate::operation::Selection;
use crate::operation::VariableDefinition;
use crate::schema::DirectiveDef;
use crate::schema::Schema;
use crate::schema::SchemaType;
use crate::schema::TypeAnnotation;
use crate::Value;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, VariableInferenceError>;

/// Infer an ordered variable-definition list for a definition and its
/// fragment closure.
///
/// Every variable reference is recorded with the narrowest enclosing
/// argument type. Two usages of the same variable unify: their base
/// (nullability-stripped) types must agree, and if any usage is non-null the
/// unified type is non-null. The produced list is what a runnable operation
/// synthesized around a bare fragment declares.
pub fn infer_variable_definitions(
    schema: &Schema,
    closure: &[Arc<Definition>],
) -> Result<Vec<VariableDefinition>> {
    let mut inference = VariableInference {
        schema,
        variables: IndexMap::new(),
    };

    for definition in closure {
        let root_type_name = match definition.kind() {
            DefinitionKind::Operation(kind) =>
                schema.root_type_name_for(kind),
            DefinitionKind::Fragment =>
                definition.type_condition(),
        };

        inference.visit_directives(definition.directives())?;
        for selection in definition.selections() {
            inference.visit_selection(selection, root_type_name)?;
        }
    }

    Ok(inference.variables
        .into_iter()
        .map(|(name, type_annotation)| VariableDefinition {
            default_value: None,
            name,
            type_annotation,
        })
        .collect())
}

struct VariableInference<'schema> {
    schema: &'schema Schema,
    variables: IndexMap<String, TypeAnnotation>,
}
impl<'schema> VariableInference<'schema> {
    fn visit_selection(
        &mut self,
        selection: &Selection,
        context_type_name: Option<&str>,
    ) -> Result<()> {
        match selection {
            Selection::Field(field) => {
                let field_def = context_type_name
                    .and_then(|name| self.schema.type_named(name))
                    .and_then(|parent_type| {
                        self.schema.field_on_type(parent_type, field.name())
                    });

                for (arg_name, arg_value) in field.arguments() {
                    let arg_type = field_def.and_then(|field_def| {
                        field_def.arguments()
                            .get(arg_name)
                            .map(|input_val| input_val.type_annotation())
                    });
                    self.record_value(arg_value, arg_type)?;
                }

                self.visit_directives(field.directives())?;

                let child_type_name = field_def.map(|field_def| {
                    field_def.type_annotation().innermost_named_type()
                });
                for sub_selection in field.selections() {
                    self.visit_selection(sub_selection, child_type_name)?;
                }
            },

            Selection::InlineFragment(inline) => {
                self.visit_directives(inline.directives())?;

                // Inlined spreads share the source fragment's nodes; the
                // fragment itself is also walked as part of the closure, so
                // revisiting here just re-records identical usages.
                let inner_context = inline.type_condition()
                    .or(context_type_name);
                for sub_selection in inline.selections() {
                    self.visit_selection(sub_selection, inner_context)?;
                }
            },

            Selection::FragmentSpread(spread) => {
                self.visit_directives(spread.directives())?;
            },
        }

        Ok(())
    }

    fn visit_directives(
        &mut self,
        directives: &[DirectiveAnnotation],
    ) -> Result<()> {
        for directive in directives {
            for (arg_name, arg_value) in directive.args() {
                let arg_type = self.directive_arg_type(
                    directive.name(),
                    arg_name,
                );
                self.record_value(arg_value, arg_type.as_ref())?;
            }
        }
        Ok(())
    }

    fn directive_arg_type(
        &self,
        directive_name: &str,
        arg_name: &str,
    ) -> Option<TypeAnnotation> {
        match self.schema.directive_named(directive_name)? {
            DirectiveDef::Skip | DirectiveDef::Include if arg_name == "if" =>
                Some(TypeAnnotation::named("Boolean", /* nullable = */ false)),

            DirectiveDef::Custom { args, .. } => args
                .get(arg_name)
                .map(|input_val| input_val.type_annotation().clone()),

            _ => None,
        }
    }

    /// Record every variable reference inside `value` against the narrowest
    /// enclosing argument type.
    fn record_value(
        &mut self,
        value: &Value,
        expected_type: Option<&TypeAnnotation>,
    ) -> Result<()> {
        match value {
            Value::VarRef(variable_name) => {
                if let Some(expected) = expected_type {
                    self.unify(variable_name, expected)?;
                }
            },

            Value::List(items) => {
                let inner_type = expected_type.and_then(|annot| match annot {
                    TypeAnnotation::List(list_annot) => Some(list_annot.inner()),
                    TypeAnnotation::Named(_) => None,
                });
                for item in items {
                    self.record_value(item, inner_type)?;
                }
            },

            Value::Object(entries) => {
                let input_object = expected_type
                    .map(TypeAnnotation::innermost_named_type)
                    .and_then(|name| self.schema.type_named(name))
                    .and_then(|schema_type| match schema_type {
                        SchemaType::InputObject(def) => Some(def),
                        _ => None,
                    });
                for (key, entry_value) in entries {
                    let entry_type = input_object.and_then(|def| {
                        def.input_fields()
                            .get(key)
                            .map(|input_val| input_val.type_annotation())
                    });
                    self.record_value(entry_value, entry_type)?;
                }
            },

            _ => {},
        }

        Ok(())
    }

    fn unify(
        &mut self,
        variable_name: &str,
        usage_type: &TypeAnnotation,
    ) -> Result<()> {
        let Some(existing) = self.variables.get(variable_name) else {
            self.variables.insert(
                variable_name.to_string(),
                usage_type.clone(),
            );
            return Ok(());
        };

        if !existing.same_base_type(usage_type) {
            return Err(VariableInferenceError::VariableTypeConflict {
                variable_name: variable_name.to_string(),
                type1: existing.to_graphql_string(),
                type2: usage_type.to_graphql_string(),
            });
        }

        // Non-null wins; a nullable usage never downgrades an inferred
        // non-null type.
        if existing.nullable() && !usage_type.nullable() {
            let unified = existing.with_nullability(false);
            self.variables.insert(variable_name.to_string(), unified);
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum VariableInferenceError {
    #[error(
        "Variable `${variable_name}` is used as both `{type1}` and \
        `{type2}`, which do not unify"
    )]
    VariableTypeConflict {
        variable_name: String,
        type1: String,
        type2: String,
    },
}
