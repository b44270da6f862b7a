use std::sync::Arc;
use thiserror::Error;

/// A successfully cast enum value.
///
/// Equal to its raw string form, and carrying the enum's full legal value
/// set so `is`-style predicate checks can reject names that aren't legal
/// values of the same enum.
#[derive(Clone, Debug)]
pub struct EnumValue {
    pub(crate) enum_name: String,
    pub(crate) legal_values: Arc<Vec<String>>,
    pub(crate) value: String,
}
impl EnumValue {
    pub fn enum_name(&self) -> &str {
        self.enum_name.as_str()
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    /// Case-insensitive "is this value" predicate.
    ///
    /// `name` must itself be a legal value of the enum (any casing);
    /// otherwise the check fails rather than quietly returning `false`, so a
    /// typo'd predicate can't hide as a permanent `false`.
    pub fn is(&self, name: &str) -> Result<bool, EnumPredicateError> {
        let legal = self.legal_values
            .iter()
            .any(|value| value.eq_ignore_ascii_case(name));
        if !legal {
            return Err(EnumPredicateError::NotALegalValue {
                enum_name: self.enum_name.clone(),
                requested: name.to_string(),
                legal_values: self.legal_values.as_ref().clone(),
            });
        }
        Ok(self.value.eq_ignore_ascii_case(name))
    }
}
impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.enum_name == other.enum_name && self.value == other.value
    }
}
impl PartialEq<str> for EnumValue {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}
impl PartialEq<&str> for EnumValue {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}
impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EnumPredicateError {
    #[error(
        "`{requested}` is not a legal value of enum `{enum_name}` \
        (legal values: {})",
        legal_values.join(", "),
    )]
    NotALegalValue {
        enum_name: String,
        requested: String,
        legal_values: Vec<String>,
    },
}
