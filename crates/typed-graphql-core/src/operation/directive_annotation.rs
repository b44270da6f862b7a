use crate::ast;
use crate::loc;
use crate::Value;
use indexmap::IndexMap;
use std::path::Path;

/// A directive applied at a use site (field, fragment, operation, spread).
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveAnnotation {
    pub(crate) args: IndexMap<String, Value>,
    pub(crate) name: String,
    pub(crate) ref_location: loc::SourceLocation,
}
impl DirectiveAnnotation {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn args(&self) -> &IndexMap<String, Value> {
        &self.args
    }

    pub fn ref_location(&self) -> &loc::SourceLocation {
        &self.ref_location
    }

    pub(crate) fn from_ast(
        file_path: Option<&Path>,
        ast_annots: &[ast::query::Directive],
    ) -> Vec<Self> {
        ast_annots.iter().map(|directive| DirectiveAnnotation {
            args: directive.arguments.iter().map(|(name, value)| (
                name.clone(),
                Value::from_ast(value),
            )).collect(),
            name: directive.name.clone(),
            ref_location: loc::SourceLocation::from_pos(
                file_path,
                directive.position,
            ),
        }).collect()
    }
}
