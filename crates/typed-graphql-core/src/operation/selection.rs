use crate::loc;
use crate::operation::Definition;
use crate::operation::DirectiveAnnotation;
use crate::Value;
use indexmap::IndexMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Process-unique identity for one selection node.
///
/// Inlined fragment spreads share the source fragment's selection [`Arc`]s
/// (and therefore their `NodeId`s), which is what makes subset-compatibility
/// checks between result shapes a plain node-set containment test.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(u64);
impl NodeId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// One entry in a selection set.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(Arc<FieldSelection>),
    FragmentSpread(Arc<FragmentSpread>),
    InlineFragment(Arc<InlineFragment>),
}
impl Selection {
    pub fn node_id(&self) -> NodeId {
        match self {
            Selection::Field(field) => field.node_id,
            Selection::FragmentSpread(spread) => spread.node_id,
            Selection::InlineFragment(inline) => inline.node_id,
        }
    }

    pub fn source_location(&self) -> &loc::SourceLocation {
        match self {
            Selection::Field(field) => &field.source_location,
            Selection::FragmentSpread(spread) => &spread.source_location,
            Selection::InlineFragment(inline) => &inline.source_location,
        }
    }

    /// Collect this node's id plus the ids of every node beneath it.
    pub(crate) fn collect_node_ids(
        &self,
        out: &mut std::collections::BTreeSet<NodeId>,
    ) {
        out.insert(self.node_id());
        let sub_selections = match self {
            Selection::Field(field) => &field.selections,
            Selection::InlineFragment(inline) => &inline.selections,
            Selection::FragmentSpread(_) => return,
        };
        for selection in sub_selections {
            selection.collect_node_ids(out);
        }
    }
}

/// A field selected within a selection set.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSelection {
    pub(crate) alias: Option<String>,
    pub(crate) arguments: IndexMap<String, Value>,
    pub(crate) directives: Vec<DirectiveAnnotation>,
    pub(crate) name: String,
    pub(crate) node_id: NodeId,
    pub(crate) selections: Vec<Selection>,
    pub(crate) source_location: loc::SourceLocation,
}
impl FieldSelection {
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn arguments(&self) -> &IndexMap<String, Value> {
        &self.arguments
    }

    pub fn directives(&self) -> &Vec<DirectiveAnnotation> {
        &self.directives
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn selections(&self) -> &Vec<Selection> {
        &self.selections
    }

    /// If an alias was specified for this selection, return the alias.
    /// Otherwise return the name of the field. This is the key the value
    /// appears under in response JSON.
    pub fn result_key(&self) -> &str {
        self.alias().unwrap_or_else(|| self.name())
    }
}

/// A named fragment spread that could not be inlined during normalization.
/// After a successful normalization pass no `FragmentSpread` nodes remain;
/// they are all replaced by [`InlineFragment`]s carrying provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    pub(crate) directives: Vec<DirectiveAnnotation>,
    pub(crate) fragment_name: String,
    pub(crate) node_id: NodeId,
    pub(crate) source_location: loc::SourceLocation,
}
impl FragmentSpread {
    pub fn fragment_name(&self) -> &str {
        self.fragment_name.as_str()
    }

    pub fn directives(&self) -> &Vec<DirectiveAnnotation> {
        &self.directives
    }
}

/// An inline fragment, either written literally (`... on T { }`) or produced
/// by inlining a named fragment spread during normalization. In the latter
/// case [`source_fragment`](InlineFragment::source_fragment) back-references
/// the originating fragment [`Definition`] for provenance, and `selections`
/// shares that fragment's selection nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    pub(crate) directives: Vec<DirectiveAnnotation>,
    pub(crate) node_id: NodeId,
    pub(crate) selections: Vec<Selection>,
    pub(crate) source_fragment: Option<Arc<Definition>>,
    pub(crate) source_location: loc::SourceLocation,
    pub(crate) type_condition: Option<String>,
}
impl InlineFragment {
    pub fn directives(&self) -> &Vec<DirectiveAnnotation> {
        &self.directives
    }

    pub fn selections(&self) -> &Vec<Selection> {
        &self.selections
    }

    pub fn source_fragment(&self) -> Option<&Arc<Definition>> {
        self.source_fragment.as_ref()
    }

    pub fn type_condition(&self) -> Option<&str> {
        self.type_condition.as_deref()
    }
}
