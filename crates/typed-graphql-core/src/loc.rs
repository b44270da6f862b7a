use std::path::Path;
use std::path::PathBuf;

/// Very similar to graphql_parser's [Pos](graphql_parser::Pos), except it
/// includes an optional path to the file the node came from.
///
/// Declaration-site locations drive both error reporting and the collocation
/// discipline (a generated accessor may only be called from the file that
/// declared its query or fragment).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceLocation {
    pub col: usize,
    pub file: Option<PathBuf>,
    pub line: usize,
}
impl SourceLocation {
    pub(crate) fn from_pos<P: AsRef<Path>>(
        file: Option<P>,
        pos: graphql_parser::Pos,
    ) -> Self {
        Self {
            col: pos.column,
            file: file.map(|f| f.as_ref().to_path_buf()),
            line: pos.line,
        }
    }

    /// A location for definitions that were never associated with a file
    /// (e.g. built programmatically).
    pub fn unknown() -> Self {
        Self {
            col: 0,
            file: None,
            line: 0,
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.col),
            None => write!(f, "<unknown>:{}:{}", self.line, self.col),
        }
    }
}
