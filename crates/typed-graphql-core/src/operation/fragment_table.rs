use crate::operation::Definition;
use crate::operation::DefinitionKind;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// A table of previously-compiled identifiers reachable from interpolated
/// fragment references in a document's text.
///
/// Spread names in the parsed text are looked up here when they don't match a
/// fragment defined in the same document. An identifier may resolve to a
/// fragment (the good case), to a namespace that merely *contains* fragments,
/// or to something else entirely; the latter two produce distinguishing
/// errors.
#[derive(Debug, Default)]
pub struct FragmentTable {
    entries: IndexMap<String, FragmentTableEntry>,
}
impl FragmentTable {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        name: impl AsRef<str>,
        entry: FragmentTableEntry,
    ) {
        self.entries.insert(name.as_ref().to_string(), entry);
    }

    pub fn insert_fragment(
        &mut self,
        name: impl AsRef<str>,
        fragment: Arc<Definition>,
    ) {
        self.insert(name, FragmentTableEntry::Fragment(fragment));
    }

    pub fn get(&self, name: &str) -> Option<&FragmentTableEntry> {
        self.entries.get(name)
    }

    /// Resolve a spread identifier to its originating fragment.
    pub(crate) fn resolve(
        &self,
        spread_name: &str,
    ) -> Result<&Arc<Definition>, SpreadResolveError> {
        match self.entries.get(spread_name) {
            None => Err(SpreadResolveError::Unresolved {
                spread_name: spread_name.to_string(),
            }),

            Some(FragmentTableEntry::Fragment(fragment)) => {
                if fragment.kind() != DefinitionKind::Fragment {
                    return Err(SpreadResolveError::NotAFragment {
                        spread_name: spread_name.to_string(),
                        actual_kind: fragment.kind().tag().to_string(),
                    });
                }
                Ok(fragment)
            },

            Some(FragmentTableEntry::Namespace { contained_fragments }) =>
                Err(SpreadResolveError::AmbiguousNamespace {
                    spread_name: spread_name.to_string(),
                    nearest: contained_fragments.first().cloned(),
                }),

            Some(FragmentTableEntry::Foreign { kind }) =>
                Err(SpreadResolveError::NotAFragment {
                    spread_name: spread_name.to_string(),
                    actual_kind: kind.clone(),
                }),
        }
    }
}

/// What a spread identifier resolved to when it was declared.
#[derive(Clone, Debug)]
pub enum FragmentTableEntry {
    /// A compiled fragment definition.
    Fragment(Arc<Definition>),

    /// A namespace (module/constant scope) rather than a definition. The
    /// contained fragment names let the resolution error point at the
    /// nearest valid alternative.
    Namespace {
        contained_fragments: Vec<String>,
    },

    /// Any other kind of value (an operation, a scalar constant, ...).
    Foreign {
        kind: String,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SpreadResolveError {
    #[error("`...{spread_name}` does not resolve to any known fragment")]
    Unresolved {
        spread_name: String,
    },

    #[error(
        "`...{spread_name}` resolves to a {actual_kind}, not a fragment"
    )]
    NotAFragment {
        spread_name: String,
        actual_kind: String,
    },

    #[error(
        "`...{spread_name}` resolves to a namespace, not a fragment{}",
        match nearest {
            Some(name) => format!("; did you mean `...{name}`?"),
            None => String::new(),
        },
    )]
    AmbiguousNamespace {
        spread_name: String,
        nearest: Option<String>,
    },
}
