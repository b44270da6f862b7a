mod definition_registry;
mod directive_annotation;
mod document;
mod document_type_map;
mod fragment_table;
mod normalizer;
mod operation_kind;
mod printer;
mod selection;
mod variable_inference;

pub use definition_registry::DefinitionRegistry;
pub use definition_registry::NameError;
pub use directive_annotation::DirectiveAnnotation;
pub use document::Definition;
pub use document::DefinitionId;
pub use document::DefinitionKind;
pub use document::Document;
pub use document::VariableDefinition;
pub use document_type_map::DocumentTypeMap;
pub use fragment_table::FragmentTable;
pub use fragment_table::FragmentTableEntry;
pub use fragment_table::SpreadResolveError;
pub use normalizer::normalize_document;
pub use normalizer::NormalizeError;
pub use operation_kind::OperationKind;
pub(crate) use printer::print_minimal_document;
pub(crate) use printer::print_synthesized_operation;
pub use selection::FieldSelection;
pub use selection::FragmentSpread;
pub use selection::InlineFragment;
pub use selection::NodeId;
pub use selection::Selection;
pub use variable_inference::infer_variable_definitions;
pub use variable_inference::VariableInferenceError;

#[cfg(test)]
mod tests;
