use crate::operation::Definition;
use crate::operation::DefinitionKind;
use crate::operation::DirectiveAnnotation;
use crate::operation::Selection;
use crate::operation::VariableDefinition;
use std::sync::Arc;

/// Render a minimal executable document: the target definition followed by
/// its fragment closure, with every definition printed under its global
/// name.
pub(crate) fn print_minimal_document(
    closure: &[Arc<Definition>],
) -> String {
    let mut out = String::new();
    for (idx, definition) in closure.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        print_definition(&mut out, definition);
    }
    out
}

/// Render a runnable operation synthesized around a bare fragment: a query
/// declaring the fragment's inferred variables, spreading the fragment, with
/// the fragment closure appended.
pub(crate) fn print_synthesized_operation(
    closure: &[Arc<Definition>],
    variables: &[VariableDefinition],
) -> String {
    let target = &closure[0];
    let target_name = definition_print_name(target);

    let mut out = String::new();
    out.push_str("query ");
    out.push_str(&target_name);
    out.push_str("__operation");
    print_variable_definitions(&mut out, variables);
    out.push_str(" {\n  ...");
    out.push_str(&target_name);
    out.push_str("\n}\n");

    for definition in closure {
        out.push('\n');
        print_definition(&mut out, definition);
    }

    out
}

fn definition_print_name(definition: &Definition) -> String {
    definition.assigned_global_name()
        .or(definition.declared_name())
        .unwrap_or_default()
        .to_string()
}

fn print_definition(out: &mut String, definition: &Definition) {
    let name = definition_print_name(definition);

    match definition.kind() {
        DefinitionKind::Operation(kind) => {
            out.push_str(kind.keyword());
            if !name.is_empty() {
                out.push(' ');
                out.push_str(&name);
            }
            print_variable_definitions(out, definition.variable_definitions());
        },

        DefinitionKind::Fragment => {
            out.push_str("fragment ");
            out.push_str(&name);
            out.push_str(" on ");
            out.push_str(definition.type_condition().unwrap_or_default());
        },
    }

    print_directives(out, definition.directives());
    out.push(' ');
    print_selection_set(out, definition.selections(), /* depth = */ 0);
    out.push('\n');
}

fn print_variable_definitions(
    out: &mut String,
    variables: &[VariableDefinition],
) {
    if variables.is_empty() {
        return;
    }
    out.push('(');
    for (idx, var_def) in variables.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(&var_def.to_graphql_string());
    }
    out.push(')');
}

fn print_directives(out: &mut String, directives: &[DirectiveAnnotation]) {
    for directive in directives {
        out.push_str(" @");
        out.push_str(directive.name());
        if !directive.args().is_empty() {
            out.push('(');
            for (idx, (arg_name, arg_value)) in directive.args().iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                out.push_str(arg_name);
                out.push_str(": ");
                out.push_str(&arg_value.to_graphql_string());
            }
            out.push(')');
        }
    }
}

fn print_selection_set(
    out: &mut String,
    selections: &[Selection],
    depth: usize,
) {
    out.push_str("{\n");
    for selection in selections {
        print_selection(out, selection, depth + 1);
    }
    push_indent(out, depth);
    out.push('}');
}

fn print_selection(out: &mut String, selection: &Selection, depth: usize) {
    push_indent(out, depth);

    match selection {
        Selection::Field(field) => {
            if let Some(alias) = field.alias() {
                out.push_str(alias);
                out.push_str(": ");
            }
            out.push_str(field.name());
            if !field.arguments().is_empty() {
                out.push('(');
                for (idx, (arg_name, arg_value)) in field.arguments().iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(arg_name);
                    out.push_str(": ");
                    out.push_str(&arg_value.to_graphql_string());
                }
                out.push(')');
            }
            print_directives(out, field.directives());
            if !field.selections().is_empty() {
                out.push(' ');
                print_selection_set(out, field.selections(), depth);
            }
        },

        Selection::InlineFragment(inline) => {
            // Inlined named spreads print as a spread of the source
            // fragment's global name; the fragment body is emitted once as
            // part of the closure, keeping the document minimal. Directives
            // on the inlined node are the spread site's and stay with it.
            if let Some(fragment) = inline.source_fragment() {
                out.push_str("...");
                out.push_str(&definition_print_name(fragment));
                print_directives(out, inline.directives());
            } else {
                out.push_str("...");
                if let Some(condition) = inline.type_condition() {
                    out.push_str(" on ");
                    out.push_str(condition);
                }
                print_directives(out, inline.directives());
                out.push(' ');
                print_selection_set(out, inline.selections(), depth);
            }
        },

        Selection::FragmentSpread(spread) => {
            out.push_str("...");
            out.push_str(spread.fragment_name());
            print_directives(out, spread.directives());
        },
    }

    out.push('\n');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
