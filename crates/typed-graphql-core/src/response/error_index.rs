use indexmap::IndexMap;
use std::sync::Arc;

/// One partial-execution error reported by the server.
///
/// Partial errors are data, not exceptions: they are bucketed by response
/// path and exposed for caller branching instead of being raised.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

/// One segment of a response path: an object key or a list index.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(u64),
    Key(String),
}
impl PathSegment {
    fn bucket_key(&self) -> String {
        match self {
            PathSegment::Index(idx) => idx.to_string(),
            PathSegment::Key(key) => key.clone(),
        }
    }

    /// Keys compare case-insensitively with underscores ignored, so string,
    /// camelCase, and snake_case spellings are interchangeable. Indexes
    /// match their decimal spelling.
    fn matches_key(&self, requested: &str) -> bool {
        match self {
            PathSegment::Index(idx) => requested
                .parse::<u64>()
                .is_ok_and(|parsed| parsed == *idx),
            PathSegment::Key(key) => normalize_key(key) == normalize_key(requested),
        }
    }
}
impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}
impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}
impl From<u64> for PathSegment {
    fn from(idx: u64) -> Self {
        PathSegment::Index(idx)
    }
}
impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx as u64)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[derive(Debug)]
struct NormalizedRecord {
    /// `["data", ...path]`, precomputed once per response.
    normalized_path: Vec<PathSegment>,
    record: ErrorRecord,
}

/// A path-scoped view over one response's shared, immutable error list.
///
/// The view carries `(ast_path, include_descendants)`. In exact mode,
/// [`details`](Errors::details) buckets every error sitting directly on a
/// field of the current object: errors whose normalized path's all-but-last
/// segment equals `ast_path`, bucketed by the final segment. In
/// descendant-inclusive mode ([`all`](Errors::all)), any error whose full
/// normalized path is prefixed by `ast_path` matches, bucketed by the
/// segment immediately following the prefix.
#[derive(Clone, Debug)]
pub struct Errors {
    ast_path: Vec<PathSegment>,
    include_descendants: bool,
    records: Arc<Vec<NormalizedRecord>>,
}
impl Errors {
    /// A root-scoped view (`ast_path = ["data"]`) over a response's errors.
    pub fn from_records(records: Vec<ErrorRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| {
                let mut normalized_path =
                    Vec::with_capacity(record.path.len() + 1);
                normalized_path.push(PathSegment::Key("data".to_string()));
                normalized_path.extend(record.path.iter().cloned());
                NormalizedRecord {
                    normalized_path,
                    record,
                }
            })
            .collect();

        Self {
            ast_path: vec![PathSegment::Key("data".to_string())],
            include_descendants: false,
            records: Arc::new(records),
        }
    }

    pub fn empty() -> Self {
        Self::from_records(vec![])
    }

    /// The same scope with descendant-inclusive matching. Only the inclusion
    /// mode changes; the path does not.
    pub fn all(&self) -> Self {
        Self {
            ast_path: self.ast_path.clone(),
            include_descendants: true,
            records: self.records.clone(),
        }
    }

    /// Narrow the scope by appending one segment to `ast_path`.
    pub fn filter_by_path(&self, segment: impl Into<PathSegment>) -> Self {
        let mut ast_path = self.ast_path.clone();
        ast_path.push(segment.into());
        Self {
            ast_path,
            include_descendants: self.include_descendants,
            records: self.records.clone(),
        }
    }

    /// Bucketed errors for this scope, in first-seen order.
    pub fn details(&self) -> IndexMap<String, Vec<&ErrorRecord>> {
        let mut buckets: IndexMap<String, Vec<&ErrorRecord>> = IndexMap::new();
        for normalized in self.records.iter() {
            let Some(bucket_segment) = self.match_record(normalized) else {
                continue;
            };
            buckets
                .entry(bucket_segment.bucket_key())
                .or_default()
                .push(&normalized.record);
        }
        buckets
    }

    /// Like [`details`](Errors::details), but only the messages.
    pub fn messages(&self) -> IndexMap<String, Vec<String>> {
        self.details()
            .into_iter()
            .map(|(key, records)| (
                key,
                records.iter().map(|record| record.message.clone()).collect(),
            ))
            .collect()
    }

    /// The errors bucketed under `key`, which may be spelled in camelCase or
    /// snake_case (or as a decimal index) interchangeably.
    pub fn get(&self, key: &str) -> Option<Vec<&ErrorRecord>> {
        let mut found = vec![];
        for normalized in self.records.iter() {
            if let Some(bucket_segment) = self.match_record(normalized) {
                if bucket_segment.matches_key(key) {
                    found.push(&normalized.record);
                }
            }
        }
        if found.is_empty() {
            None
        } else {
            Some(found)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records
            .iter()
            .all(|normalized| self.match_record(normalized).is_none())
    }

    pub fn len(&self) -> usize {
        self.records
            .iter()
            .filter(|normalized| self.match_record(normalized).is_some())
            .count()
    }

    /// If the record falls inside this scope, the segment it buckets under.
    fn match_record<'rec>(
        &self,
        normalized: &'rec NormalizedRecord,
    ) -> Option<&'rec PathSegment> {
        let path = &normalized.normalized_path;

        if self.include_descendants {
            if path.len() > self.ast_path.len()
                && path.starts_with(&self.ast_path)
            {
                return Some(&path[self.ast_path.len()]);
            }
            return None;
        }

        if path.len() == self.ast_path.len() + 1
            && path[..path.len() - 1] == self.ast_path[..]
        {
            return Some(&path[path.len() - 1]);
        }
        None
    }
}
