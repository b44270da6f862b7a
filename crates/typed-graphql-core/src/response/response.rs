use crate::response::ErrorRecord;
use crate::response::Errors;
use serde_json::Map;
use serde_json::Value as Json;
use thiserror::Error;

type Result<T> = std::result::Result<T, ResponseParseError>;

#[derive(serde::Deserialize)]
struct RawResponse {
    #[serde(default)]
    data: Option<Json>,
    #[serde(default)]
    errors: Vec<ErrorRecord>,
    #[serde(default)]
    extensions: Map<String, Json>,
}

/// A deserialized GraphQL execution result envelope.
///
/// Holds the raw `data` payload plus a root-scoped [`Errors`] index built
/// once from the `errors` list. Unknown envelope keys are ignored;
/// `extensions` is carried through untyped.
#[derive(Debug)]
pub struct Response {
    data: Option<Json>,
    errors: Errors,
    extensions: Map<String, Json>,
}
impl Response {
    pub fn from_str(payload: &str) -> Result<Self> {
        let raw: RawResponse = serde_json::from_str(payload)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_json(payload: Json) -> Result<Self> {
        let raw: RawResponse = serde_json::from_value(payload)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawResponse) -> Self {
        Self {
            data: raw.data,
            errors: Errors::from_records(raw.errors),
            extensions: raw.extensions,
        }
    }

    pub fn data(&self) -> Option<&Json> {
        self.data.as_ref()
    }

    pub fn take_data(&mut self) -> Option<Json> {
        self.data.take()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn extensions(&self) -> &Map<String, Json> {
        &self.extensions
    }
}

#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("Malformed response payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
