use crate::operation::Definition;
use crate::operation::Selection;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use thiserror::Error;

type Result<T> = std::result::Result<T, NameError>;

/// Assigns globally unique names to definitions and computes minimal
/// per-definition fragment closures.
///
/// A definition's global name is derived from its declaration path (a
/// `::`-separated module/namespace chain) with the separators replaced by a
/// double underscore: `A::B::C` becomes `A__B__C`. Definitions registered
/// without a declaration path derive `<kind>_<stable-identity>` instead.
/// Either way the name is assigned exactly once and is unique within the
/// registry.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    assigned_names: Mutex<HashSet<String>>,
}
impl DefinitionRegistry {
    pub fn new() -> Self {
        Self {
            assigned_names: Mutex::new(HashSet::new()),
        }
    }

    /// Bind a definition to its declaration path, assigning its global name.
    pub fn bind_declaration_path(
        &self,
        definition: &Arc<Definition>,
        declaration_path: &str,
    ) -> Result<String> {
        let global_name = declaration_path.replace("::", "__");
        self.assign(definition, global_name)
    }

    /// Register a definition that was never bound to a declaration path. Its
    /// name is derived from its kind and stable identity.
    pub fn register_anonymous(
        &self,
        definition: &Arc<Definition>,
    ) -> Result<String> {
        let global_name = format!(
            "{}_{}",
            definition.kind().tag(),
            definition.id().value(),
        );
        self.assign(definition, global_name)
    }

    /// The global name previously assigned to this definition. Requesting
    /// the name of a definition that was never registered fails.
    pub fn global_name<'def>(
        &self,
        definition: &'def Arc<Definition>,
    ) -> Result<&'def str> {
        definition.assigned_global_name().ok_or_else(|| {
            NameError::UnboundDefinition {
                definition_id: definition.id().value(),
                declared_name: definition.declared_name().map(str::to_string),
            }
        })
    }

    fn assign(
        &self,
        definition: &Arc<Definition>,
        global_name: String,
    ) -> Result<String> {
        if let Some(existing) = definition.assigned_global_name() {
            if existing == global_name {
                return Ok(global_name);
            }
            return Err(NameError::AlreadyBound {
                existing_name: existing.to_string(),
                requested_name: global_name,
            });
        }

        {
            let mut assigned = self.assigned_names
                .lock()
                .expect("definition registry poisoned");
            if !assigned.insert(global_name.clone()) {
                return Err(NameError::DuplicateGlobalName {
                    global_name,
                });
            }
        }

        // A concurrent assign for the same definition may have won the race;
        // both computed names reserve distinct registry slots, so the set()
        // loser just reports the winner's name.
        let _ = definition.global_name.set(global_name);
        Ok(definition.assigned_global_name()
            .expect("global name was just assigned")
            .to_string())
    }

    /// The target definition plus its transitive fragment closure.
    ///
    /// Reachability search over the spread-reference graph: inlined spreads
    /// carry a provenance back-reference to their source fragment, and those
    /// references (not textual inclusion order) define the graph's edges.
    /// Output is deduplicated by definition identity, target first, then
    /// each fragment in the order it is first reached. The frontier is a
    /// queue, so every definition's direct spreads list before any of their
    /// own dependencies, preserving the spreads' relative order.
    pub fn fragment_closure(
        &self,
        target: &Arc<Definition>,
    ) -> Vec<Arc<Definition>> {
        let mut seen = HashSet::from([target.id()]);
        let mut closure = vec![target.clone()];
        let mut frontier = VecDeque::from([target.clone()]);

        while let Some(definition) = frontier.pop_front() {
            let mut found = vec![];
            for selection in definition.selections() {
                collect_spread_refs(selection, &mut found);
            }
            for fragment in found {
                if seen.insert(fragment.id()) {
                    closure.push(fragment.clone());
                    frontier.push_back(fragment);
                }
            }
        }

        closure
    }
}

fn collect_spread_refs(
    selection: &Selection,
    out: &mut Vec<Arc<Definition>>,
) {
    match selection {
        Selection::Field(field) => {
            for sub_selection in field.selections() {
                collect_spread_refs(sub_selection, out);
            }
        },

        Selection::InlineFragment(inline) => {
            if let Some(fragment) = inline.source_fragment() {
                out.push(fragment.clone());
                // The fragment's own spreads are collected when the closure
                // walk visits the fragment itself.
                return;
            }
            for sub_selection in inline.selections() {
                collect_spread_refs(sub_selection, out);
            }
        },

        Selection::FragmentSpread(_) => {},
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum NameError {
    #[error(
        "Definition already has the global name `{existing_name}`; it cannot \
        be rebound to `{requested_name}`"
    )]
    AlreadyBound {
        existing_name: String,
        requested_name: String,
    },

    #[error("The global name `{global_name}` is already assigned to another definition")]
    DuplicateGlobalName {
        global_name: String,
    },

    #[error(
        "Definition {}has no global name; bind it to a declaration path (or \
        register it anonymously) before requesting its name",
        match declared_name {
            Some(name) => format!("`{name}` "),
            None => String::new(),
        },
    )]
    UnboundDefinition {
        definition_id: u64,
        declared_name: Option<String>,
    },
}
