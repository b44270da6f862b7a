use crate::response::Errors;
use crate::result::CastValue;
use crate::result::PolymorphicDescriptor;
use crate::result::ResultDescriptor;
use crate::result::ResultObject;
use crate::schema::ScalarCoercionError;
use crate::types::EnumValue;
use crate::types::EnumWrapper;
use crate::types::ScalarWrapper;
use serde_json::Value as Json;
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, CastError>;

/// The derived type of one position in a definition's result, mirroring the
/// schema's annotation structure with object positions replaced by
/// selection-derived [`ResultDescriptor`]s.
#[derive(Clone, Debug)]
pub enum ResultType {
    Scalar(ScalarWrapper),
    Enum(EnumWrapper),
    List(Box<ResultType>),
    NonNull(Box<ResultType>),
    Object(Arc<ResultDescriptor>),
    Polymorphic(Arc<PolymorphicDescriptor>),
}
impl ResultType {
    /// Cast a raw response value sitting at this position. `errors` must
    /// already be scoped to the value's response path; list casting narrows
    /// it per element.
    pub fn cast(&self, raw: &Json, errors: &Errors) -> Result<CastValue> {
        if raw.is_null() {
            return match self {
                ResultType::NonNull(inner) =>
                    Err(CastError::NonNullViolation {
                        expected: inner.describe(),
                    }),
                _ => Ok(CastValue::Null),
            };
        }

        match self {
            ResultType::NonNull(inner) => inner.cast(raw, errors),

            ResultType::Scalar(wrapper) => {
                let coerced = wrapper
                    .coercion()
                    .coerce_output(wrapper.type_name(), raw)?;
                Ok(match coerced {
                    Json::Bool(value) => CastValue::Boolean(value),
                    Json::Number(num) => {
                        if let Some(int) = num.as_i64() {
                            CastValue::Int(int)
                        } else if let Some(float) = num.as_f64() {
                            CastValue::Float(float)
                        } else {
                            CastValue::Scalar(Json::Number(num))
                        }
                    },
                    Json::String(value) => CastValue::String(value),
                    other => CastValue::Scalar(other),
                })
            },

            ResultType::Enum(wrapper) => {
                let Some(value) = raw.as_str() else {
                    return Err(CastError::ShapeMismatch {
                        actual: json_kind(raw).to_string(),
                        expected: wrapper.type_name().to_string(),
                    });
                };
                if !wrapper.values().iter().any(|legal| legal == value) {
                    return Err(CastError::UnexpectedEnumValue {
                        enum_name: wrapper.type_name().to_string(),
                        legal_values: wrapper.values().to_vec(),
                        value: value.to_string(),
                    });
                }
                Ok(CastValue::Enum(EnumValue {
                    enum_name: wrapper.type_name().to_string(),
                    legal_values: wrapper.values.clone(),
                    value: value.to_string(),
                }))
            },

            ResultType::List(inner) => {
                let Some(elements) = raw.as_array() else {
                    return Err(CastError::ShapeMismatch {
                        actual: json_kind(raw).to_string(),
                        expected: self.describe(),
                    });
                };
                let cast = elements
                    .iter()
                    .enumerate()
                    .map(|(index, element)| {
                        inner
                            .cast(element, &errors.filter_by_path(index))
                            .map_err(|source| CastError::ListElement {
                                index,
                                source: Box::new(source),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CastValue::List(cast))
            },

            ResultType::Object(descriptor) => {
                let Some(map) = raw.as_object() else {
                    return Err(CastError::ShapeMismatch {
                        actual: json_kind(raw).to_string(),
                        expected: self.describe(),
                    });
                };
                Ok(CastValue::Object(ResultObject::new(
                    Arc::clone(descriptor),
                    map.clone(),
                    errors.clone(),
                )))
            },

            ResultType::Polymorphic(poly) => {
                let Some(map) = raw.as_object() else {
                    return Err(CastError::ShapeMismatch {
                        actual: json_kind(raw).to_string(),
                        expected: self.describe(),
                    });
                };
                let typename = map.get("__typename").and_then(Json::as_str);
                let Some(typename) = typename else {
                    return Err(CastError::MissingTypename {
                        abstract_type: poly.abstract_type.clone(),
                        allowed: poly.possible_types.keys().cloned().collect(),
                    });
                };
                let Some(descriptor) = poly.possible_types.get(typename) else {
                    return Err(CastError::UnresolvedTypename {
                        abstract_type: poly.abstract_type.clone(),
                        allowed: poly.possible_types.keys().cloned().collect(),
                        typename: typename.to_string(),
                    });
                };
                Ok(CastValue::Object(ResultObject::new(
                    Arc::clone(descriptor),
                    map.clone(),
                    errors.clone(),
                )))
            },
        }
    }

    /// Re-cast an already-cast object under this type; see
    /// [`ResultDescriptor::cast_from`].
    pub fn cast_result_object(
        &self,
        source: &Arc<ResultObject>,
    ) -> Result<Arc<ResultObject>> {
        match self {
            ResultType::NonNull(inner) => inner.cast_result_object(source),

            ResultType::Object(descriptor) => descriptor.cast_from(source),

            ResultType::Polymorphic(poly) => {
                let Some(typename) = source.typename() else {
                    return Err(CastError::MissingTypename {
                        abstract_type: poly.abstract_type.clone(),
                        allowed: poly.possible_types.keys().cloned().collect(),
                    });
                };
                let Some(descriptor) = poly.possible_types.get(typename) else {
                    return Err(CastError::UnresolvedTypename {
                        abstract_type: poly.abstract_type.clone(),
                        allowed: poly.possible_types.keys().cloned().collect(),
                        typename: typename.to_string(),
                    });
                };
                descriptor.cast_from(source)
            },

            _ => Err(CastError::ShapeMismatch {
                actual: "object".to_string(),
                expected: self.describe(),
            }),
        }
    }

    /// Render the type in GraphQL annotation syntax for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ResultType::Scalar(wrapper) => wrapper.type_name().to_string(),
            ResultType::Enum(wrapper) => wrapper.type_name().to_string(),
            ResultType::List(inner) => format!("[{}]", inner.describe()),
            ResultType::NonNull(inner) => format!("{}!", inner.describe()),
            ResultType::Object(descriptor) =>
                descriptor.type_name().to_string(),
            ResultType::Polymorphic(poly) => poly.abstract_type.clone(),
        }
    }

    /// Structural merge of two derived types; object positions merge their
    /// descriptors, everything else keeps the left-hand side.
    pub(crate) fn merge(&self, other: &ResultType) -> ResultType {
        match (self, other) {
            (ResultType::Object(left), ResultType::Object(right)) =>
                ResultType::Object(Arc::new(left.as_ref() | right.as_ref())),

            (ResultType::Polymorphic(left), ResultType::Polymorphic(right)) => {
                let mut possible_types = left.possible_types.clone();
                for (type_name, right_desc) in &right.possible_types {
                    match possible_types.get_mut(type_name) {
                        None => {
                            possible_types.insert(
                                type_name.clone(),
                                Arc::clone(right_desc),
                            );
                        },
                        Some(left_desc) => {
                            *left_desc = Arc::new(
                                left_desc.as_ref() | right_desc.as_ref(),
                            );
                        },
                    }
                }
                ResultType::Polymorphic(Arc::new(PolymorphicDescriptor {
                    abstract_type: left.abstract_type.clone(),
                    possible_types,
                }))
            },

            (ResultType::List(left), ResultType::List(right)) =>
                ResultType::List(Box::new(left.merge(right))),

            (ResultType::NonNull(left), ResultType::NonNull(right)) =>
                ResultType::NonNull(Box::new(left.merge(right))),

            _ => self.clone(),
        }
    }
}

pub(crate) fn json_kind(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CastError {
    #[error(
        "Value cannot be cast to `{target_name}`: the source query does not \
        spread `...{target_name}`; add the fragment to the query that \
        produced this result (source: `{source_name}`)"
    )]
    IncompatibleCast {
        source_name: String,
        target_name: String,
    },

    #[error("At index {index}: {source}")]
    ListElement {
        index: usize,
        source: Box<CastError>,
    },

    #[error(
        "Value of abstract type `{abstract_type}` is missing `__typename` \
        (possible types: {})",
        allowed.join(", "),
    )]
    MissingTypename {
        abstract_type: String,
        allowed: Vec<String>,
    },

    #[error("Unexpected null for non-null type `{expected}`")]
    NonNullViolation {
        expected: String,
    },

    #[error(transparent)]
    Scalar(#[from] ScalarCoercionError),

    #[error("Expected a value of type `{expected}`, found {actual}")]
    ShapeMismatch {
        actual: String,
        expected: String,
    },

    #[error(
        "Unexpected value `{value}` for enum `{enum_name}` \
        (legal values: {})",
        legal_values.join(", "),
    )]
    UnexpectedEnumValue {
        enum_name: String,
        legal_values: Vec<String>,
        value: String,
    },

    #[error(
        "`__typename` value `{typename}` is not a possible type of \
        `{abstract_type}` (possible types: {})",
        allowed.join(", "),
    )]
    UnresolvedTypename {
        abstract_type: String,
        allowed: Vec<String>,
        typename: String,
    },
}
