use crate::ast;
use indexmap::IndexMap;

/// A request-side GraphQL value: field arguments, directive arguments, and
/// variable default values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    VarRef(String),
    Int(ast::Number),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    EnumValue(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}
impl Value {
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(str) = self {
            Some(str.as_str())
        } else {
            None
        }
    }

    /// The name of the referenced variable, if this value is a variable
    /// reference.
    pub fn as_variable(&self) -> Option<&str> {
        if let Self::VarRef(name) = self {
            Some(name.as_str())
        } else {
            None
        }
    }

    pub(crate) fn from_ast(ast_value: &ast::query::Value) -> Self {
        match ast_value {
            ast::query::Value::Variable(var_name) =>
                Value::VarRef(var_name.clone()),

            ast::query::Value::Int(value) =>
                Value::Int(value.clone()),

            ast::query::Value::Float(value) =>
                Value::Float(*value),

            ast::query::Value::String(value) =>
                Value::String(value.clone()),

            ast::query::Value::Boolean(value) =>
                Value::Bool(*value),

            ast::query::Value::Null =>
                Value::Null,

            ast::query::Value::Enum(value) =>
                Value::EnumValue(value.clone()),

            ast::query::Value::List(values) =>
                Value::List(
                    values.iter().map(Value::from_ast).collect(),
                ),

            ast::query::Value::Object(entries) =>
                Value::Object(entries.iter().map(|(key, ast_value)|
                    (key.clone(), Value::from_ast(ast_value))
                ).collect()),
        }
    }

    /// Render this value back into GraphQL request syntax.
    pub fn to_graphql_string(&self) -> String {
        match self {
            Value::VarRef(name) => format!("${name}"),
            Value::Int(num) => format!("{}", num.as_i64().unwrap_or(0)),
            Value::Float(num) => format!("{num}"),
            Value::String(str) => format!("{str:?}"),
            Value::Bool(value) => format!("{value}"),
            Value::Null => "null".to_string(),
            Value::EnumValue(name) => name.clone(),
            Value::List(values) => format!(
                "[{}]",
                values.iter()
                    .map(Value::to_graphql_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Object(entries) => format!(
                "{{{}}}",
                entries.iter()
                    .map(|(key, value)| format!(
                        "{key}: {}",
                        value.to_graphql_string(),
                    ))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}
