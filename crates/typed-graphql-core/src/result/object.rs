use crate::collocation;
use crate::collocation::CollocationError;
use crate::response::Errors;
use crate::result::CastError;
use crate::result::ResultDescriptor;
use crate::types::EnumValue;
use serde_json::Map;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;
use std::sync::Mutex;
use thiserror::Error;

type Result<T> = std::result::Result<T, FieldAccessError>;

/// One cast response object.
///
/// Field values are cast lazily on first access and memoized, so repeated
/// reads of the same field are cheap and observe the same value. The
/// object's [`Errors`] view is pre-scoped to its own response path.
#[derive(Debug)]
pub struct ResultObject {
    cache: Mutex<HashMap<String, CastValue>>,
    descriptor: Arc<ResultDescriptor>,
    errors: Errors,
    raw: Map<String, Json>,
}
impl ResultObject {
    pub(crate) fn new(
        descriptor: Arc<ResultDescriptor>,
        raw: Map<String, Json>,
        errors: Errors,
    ) -> Arc<Self> {
        Arc::new(ResultObject {
            cache: Mutex::new(HashMap::new()),
            descriptor,
            errors,
            raw,
        })
    }

    pub fn descriptor(&self) -> &Arc<ResultDescriptor> {
        &self.descriptor
    }

    /// Errors scoped to this object's position in the response.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// The raw `__typename` value, when the server provided one.
    pub fn typename(&self) -> Option<&str> {
        self.raw.get("__typename").and_then(Json::as_str)
    }

    pub(crate) fn raw(&self) -> &Map<String, Json> {
        &self.raw
    }

    /// Read one selected field, by result key or snake_case accessor name.
    ///
    /// Reading a field the definition never selected fails rather than
    /// returning null, and the failure distinguishes a field that another
    /// part of the document happened to fetch from one that nothing fetched
    /// at all. Enforced against the declaring file when the definition was
    /// parsed with collocation on.
    #[track_caller]
    pub fn field(&self, key: &str) -> Result<CastValue> {
        let caller = Location::caller();
        if let Some(declaring_file) = self.descriptor.collocated_file() {
            collocation::verify(declaring_file, caller)?;
        }
        self.field_internal(key)
    }

    /// Iterate the `node` sub-field of each entry under this object's
    /// `edges` field. The sequence is finite, casts lazily per step, and can
    /// be restarted.
    #[track_caller]
    pub fn nodes(&self) -> Result<Nodes> {
        let caller = Location::caller();
        if let Some(declaring_file) = self.descriptor.collocated_file() {
            collocation::verify(declaring_file, caller)?;
        }

        let edges = match self.field_internal("edges")? {
            CastValue::List(edges) => edges,
            CastValue::Null => vec![],
            other =>
                return Err(FieldAccessError::Cast(CastError::ShapeMismatch {
                    actual: other.kind_name().to_string(),
                    expected: "list of edges".to_string(),
                })),
        };
        Ok(Nodes { edges, index: 0 })
    }

    fn field_internal(&self, key: &str) -> Result<CastValue> {
        let Some(entry) = self.descriptor.entry(key) else {
            return Err(self.unselected_field_error(key));
        };

        {
            let cache = self.lock_cache();
            if let Some(value) = cache.get(entry.result_key()) {
                return Ok(value.clone());
            }
        }

        // Cast outside the lock; a concurrent duplicate cast is harmless.
        let null = Json::Null;
        let raw = self.raw.get(entry.result_key()).unwrap_or(&null);
        let scoped = self.errors.filter_by_path(entry.result_key().to_string());
        let value = entry.result_type().cast(raw, &scoped)?;

        let mut cache = self.lock_cache();
        cache.insert(entry.result_key().to_string(), value.clone());
        Ok(value)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, CastValue>> {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn unselected_field_error(&self, key: &str) -> FieldAccessError {
        let schema_match = self.descriptor.schema_field_names
            .iter()
            .find(|name| normalize(name) == normalize(key));

        match schema_match {
            None => FieldAccessError::UnknownField {
                field_name: key.to_string(),
                type_name: self.descriptor.type_name().to_string(),
            },
            Some(name) if self.raw.contains_key(name.as_str()) =>
                FieldAccessError::ImplicitlyFetched {
                    field_name: name.clone(),
                    type_name: self.descriptor.type_name().to_string(),
                },
            Some(name) => FieldAccessError::Unfetched {
                field_name: name.clone(),
                type_name: self.descriptor.type_name().to_string(),
            },
        }
    }
}

impl ResultDescriptor {
    /// Re-cast an object produced by a broader definition under this
    /// descriptor. Legal only when this descriptor's selections are a subset
    /// of the ones the source object was cast with, which holds exactly when
    /// the source definition spreads this one.
    pub fn cast_from(
        self: &Arc<Self>,
        source: &Arc<ResultObject>,
    ) -> std::result::Result<Arc<ResultObject>, CastError> {
        if !self.node_ids().is_subset(source.descriptor().node_ids()) {
            return Err(CastError::IncompatibleCast {
                source_name: source.descriptor().source_name().to_string(),
                target_name: self.source_name().to_string(),
            });
        }
        Ok(ResultObject::new(
            Arc::clone(self),
            source.raw().clone(),
            source.errors().clone(),
        ))
    }
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// A successfully cast value.
#[derive(Clone, Debug)]
pub enum CastValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(EnumValue),
    /// A custom scalar, passed through uncoerced.
    Scalar(Json),
    List(Vec<CastValue>),
    Object(Arc<ResultObject>),
}
impl CastValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CastValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let CastValue::Boolean(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let CastValue::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CastValue::Float(value) => Some(*value),
            CastValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CastValue::String(value) => Some(value.as_str()),
            CastValue::Enum(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        if let CastValue::Enum(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&[CastValue]> {
        if let CastValue::List(values) = self {
            Some(values.as_slice())
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ResultObject>> {
        if let CastValue::Object(object) = self {
            Some(object)
        } else {
            None
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            CastValue::Null => "null",
            CastValue::Boolean(_) => "boolean",
            CastValue::Int(_) => "int",
            CastValue::Float(_) => "float",
            CastValue::String(_) => "string",
            CastValue::Enum(_) => "enum value",
            CastValue::Scalar(_) => "scalar",
            CastValue::List(_) => "list",
            CastValue::Object(_) => "object",
        }
    }
}

/// Lazily yields each edge's `node` under a connection-shaped field. Null
/// edges are skipped. Restartable via [`Nodes::restart`] or [`Clone`].
#[derive(Clone, Debug)]
pub struct Nodes {
    edges: Vec<CastValue>,
    index: usize,
}
impl Nodes {
    pub fn restart(&mut self) {
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
impl Iterator for Nodes {
    type Item = Result<CastValue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let edge = self.edges.get(self.index)?;
            self.index += 1;
            match edge {
                CastValue::Null => continue,
                CastValue::Object(edge_object) =>
                    return Some(edge_object.field_internal("node")),
                other => return Some(Err(FieldAccessError::Cast(
                    CastError::ShapeMismatch {
                        actual: other.kind_name().to_string(),
                        expected: "edge object".to_string(),
                    },
                ))),
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldAccessError {
    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Collocation(#[from] CollocationError),

    #[error(
        "Field `{field_name}` on `{type_name}` was fetched by another part \
        of the document but is not selected here; add it to this \
        definition's selections to read it"
    )]
    ImplicitlyFetched {
        field_name: String,
        type_name: String,
    },

    #[error("Field `{field_name}` on `{type_name}` was not selected")]
    Unfetched {
        field_name: String,
        type_name: String,
    },

    #[error("`{type_name}` has no field named `{field_name}`")]
    UnknownField {
        field_name: String,
        type_name: String,
    },
}
