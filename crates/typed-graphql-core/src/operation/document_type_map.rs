use crate::operation::DefinitionId;
use crate::operation::NodeId;
use std::collections::HashMap;

/// Records, for every field/operation/fragment node in a document, the
/// unwrapped (innermost named) result type it produces.
///
/// Populated by the normalizer as it converts a document in schema-aware
/// mode: the same per-node type resolution that decides `__typename`
/// injection is written here, so the map and the normalized tree can never
/// disagree. A field that cannot be resolved against the schema records a
/// `None` sentinel rather than failing, since one document may mix
/// definitions sharing fragments whose fields don't all apply to every
/// context.
#[derive(Clone, Debug, Default)]
pub struct DocumentTypeMap {
    definition_types: HashMap<DefinitionId, Option<String>>,
    node_types: HashMap<NodeId, Option<String>>,
}
impl DocumentTypeMap {
    /// The unwrapped result type recorded for a selection node. The outer
    /// `Option` is presence in the map; the inner one is the unresolved-field
    /// sentinel.
    pub fn type_of_node(&self, node_id: NodeId) -> Option<Option<&str>> {
        self.node_types
            .get(&node_id)
            .map(|type_name| type_name.as_deref())
    }

    pub fn type_of_definition(
        &self,
        definition_id: DefinitionId,
    ) -> Option<Option<&str>> {
        self.definition_types
            .get(&definition_id)
            .map(|type_name| type_name.as_deref())
    }

    pub(crate) fn record_node(
        &mut self,
        node_id: NodeId,
        type_name: Option<String>,
    ) {
        self.node_types.insert(node_id, type_name);
    }

    pub(crate) fn record_definition(
        &mut self,
        definition_id: DefinitionId,
        type_name: Option<String>,
    ) {
        self.definition_types.insert(definition_id, type_name);
    }
}
