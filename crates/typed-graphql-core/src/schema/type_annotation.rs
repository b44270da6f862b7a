use crate::ast;

/// Represents the annotated type for a field, argument, or variable.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum TypeAnnotation {
    List(ListTypeAnnotation),
    Named(NamedTypeAnnotation),
}
impl TypeAnnotation {
    pub fn named(name: impl AsRef<str>, nullable: bool) -> Self {
        Self::Named(NamedTypeAnnotation {
            name: name.as_ref().to_string(),
            nullable,
        })
    }

    pub fn list(inner: TypeAnnotation, nullable: bool) -> Self {
        Self::List(ListTypeAnnotation {
            inner: Box::new(inner),
            nullable,
        })
    }

    pub(crate) fn from_ast_type(ast_type: &ast::schema::Type) -> Self {
        Self::from_ast_type_impl(ast_type, /* nullable = */ true)
    }

    fn from_ast_type_impl(
        ast_type: &ast::schema::Type,
        nullable: bool,
    ) -> Self {
        match ast_type {
            ast::schema::Type::ListType(inner) =>
                Self::List(ListTypeAnnotation {
                    inner: Box::new(Self::from_ast_type_impl(inner, true)),
                    nullable,
                }),

            ast::schema::Type::NamedType(name) =>
                Self::Named(NamedTypeAnnotation {
                    name: name.clone(),
                    nullable,
                }),

            ast::schema::Type::NonNullType(inner) =>
                Self::from_ast_type_impl(inner, false),
        }
    }

    /// Recursively unwrap this [`TypeAnnotation`] and return the inner-most
    /// named type's name.
    pub fn innermost_named_type(&self) -> &str {
        match self {
            Self::List(ListTypeAnnotation { inner, .. })
                => inner.innermost_named_type(),
            Self::Named(NamedTypeAnnotation { name, .. })
                => name.as_str(),
        }
    }

    /// Indicates if this [`TypeAnnotation`] is [nullable or
    /// non-nullable](https://spec.graphql.org/October2021/#sec-Non-Null).
    pub fn nullable(&self) -> bool {
        match self {
            Self::List(ListTypeAnnotation { nullable, .. }) => *nullable,
            Self::Named(NamedTypeAnnotation { nullable, .. }) => *nullable,
        }
    }

    /// Structural equality that ignores nullability at every level.
    ///
    /// Two usages of the same variable must agree on this "base" type before
    /// they can be unified.
    pub fn same_base_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(self_list), Self::List(other_list))
                => self_list.inner.same_base_type(&other_list.inner),
            (Self::Named(self_named), Self::Named(other_named))
                => self_named.name == other_named.name,
            _ => false,
        }
    }

    /// A copy of this annotation with the top-level nullability replaced.
    pub(crate) fn with_nullability(&self, nullable: bool) -> Self {
        match self {
            Self::List(list_annot) => Self::List(ListTypeAnnotation {
                inner: list_annot.inner.clone(),
                nullable,
            }),
            Self::Named(named_annot) => Self::Named(NamedTypeAnnotation {
                name: named_annot.name.clone(),
                nullable,
            }),
        }
    }

    pub fn to_graphql_string(&self) -> String {
        format!("{self}")
    }
}
impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(list_annot) => write!(
                f,
                "[{}]{}",
                list_annot.inner,
                if list_annot.nullable { "" } else { "!" },
            ),

            Self::Named(named_annot) => write!(
                f,
                "{}{}",
                named_annot.name,
                if named_annot.nullable { "" } else { "!" },
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ListTypeAnnotation {
    pub(crate) inner: Box<TypeAnnotation>,
    pub(crate) nullable: bool,
}
impl ListTypeAnnotation {
    pub fn inner(&self) -> &TypeAnnotation {
        &self.inner
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NamedTypeAnnotation {
    pub(crate) name: String,
    pub(crate) nullable: bool,
}
impl NamedTypeAnnotation {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}
