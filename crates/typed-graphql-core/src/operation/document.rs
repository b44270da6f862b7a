use crate::loc;
use crate::operation::DirectiveAnnotation;
use crate::operation::DocumentTypeMap;
use crate::operation::OperationKind;
use crate::operation::Selection;
use crate::schema::TypeAnnotation;
use crate::Value;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;

/// Process-unique identity for one [`Definition`]. Stable for the process
/// lifetime, used for closure deduplication and anonymous-name derivation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DefinitionId(u64);
impl DefinitionId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        DefinitionId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DefinitionKind {
    Operation(OperationKind),
    Fragment,
}
impl DefinitionKind {
    /// Lowercase tag used when deriving names for anonymous definitions.
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            DefinitionKind::Operation(kind) => kind.keyword(),
            DefinitionKind::Fragment => "fragment",
        }
    }
}

/// An ordered sequence of normalized [`Definition`]s, in source order.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) definitions: Vec<Arc<Definition>>,
    pub(crate) type_map: DocumentTypeMap,
}
impl Document {
    pub fn definitions(&self) -> &Vec<Arc<Definition>> {
        &self.definitions
    }

    /// Per-node result types resolved while the document was normalized.
    /// Empty unless the document was normalized against a schema.
    pub fn type_map(&self) -> &DocumentTypeMap {
        &self.type_map
    }

    pub fn definition_named(&self, declared_name: &str) -> Option<&Arc<Definition>> {
        self.definitions
            .iter()
            .find(|def| def.declared_name() == Some(declared_name))
    }
}

/// A single normalized operation or fragment.
///
/// Immutable once built: every accessor is read-only and the global name can
/// be assigned at most once. `Definition`s are created at declaration time
/// and live for the process lifetime behind [`Arc`]s, so one fragment can be
/// safely shared by many composed documents across threads.
#[derive(Debug)]
pub struct Definition {
    pub(crate) declared_name: Option<String>,
    pub(crate) directives: Vec<DirectiveAnnotation>,
    pub(crate) global_name: OnceLock<String>,
    pub(crate) id: DefinitionId,
    pub(crate) kind: DefinitionKind,
    pub(crate) selections: Vec<Selection>,
    pub(crate) source_location: loc::SourceLocation,
    pub(crate) type_condition: Option<String>,
    pub(crate) variable_definitions: Vec<VariableDefinition>,
}
impl Definition {
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn directives(&self) -> &Vec<DirectiveAnnotation> {
        &self.directives
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn selections(&self) -> &Vec<Selection> {
        &self.selections
    }

    pub fn source_location(&self) -> &loc::SourceLocation {
        &self.source_location
    }

    /// The fragment's type condition, or `None` for operations.
    pub fn type_condition(&self) -> Option<&str> {
        self.type_condition.as_deref()
    }

    /// Variable definitions declared in source text. Fragments never declare
    /// variables; their list is synthesized by
    /// [`infer_variable_definitions`](crate::operation::infer_variable_definitions).
    pub fn variable_definitions(&self) -> &Vec<VariableDefinition> {
        &self.variable_definitions
    }

    /// The process-globally-unique name assigned by a
    /// [`DefinitionRegistry`](crate::operation::DefinitionRegistry). Unset
    /// until the definition is registered; see
    /// [`Definition::global_name`] callers for the failure mode.
    pub(crate) fn assigned_global_name(&self) -> Option<&str> {
        self.global_name.get().map(String::as_str)
    }

    /// The set of every selection node id reachable in this definition.
    pub(crate) fn node_ids(&self) -> std::collections::BTreeSet<crate::operation::NodeId> {
        let mut ids = std::collections::BTreeSet::new();
        for selection in &self.selections {
            selection.collect_node_ids(&mut ids);
        }
        ids
    }
}
impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A `$variable: Type = default` definition, declared on an operation or
/// inferred for a bare fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    pub(crate) default_value: Option<Value>,
    pub(crate) name: String,
    pub(crate) type_annotation: TypeAnnotation,
}
impl VariableDefinition {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }

    pub fn to_graphql_string(&self) -> String {
        let mut out = format!("${}: {}", self.name, self.type_annotation);
        if let Some(default) = &self.default_value {
            out.push_str(" = ");
            out.push_str(&default.to_graphql_string());
        }
        out
    }
}
