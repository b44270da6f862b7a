pub use typed_graphql_core::*;
