//! Core implementation of a schema-driven GraphQL client: declared
//! operations and fragments are parsed and normalized once, named globally,
//! printed as minimal executable documents, and executed responses are cast
//! into lazily-memoized typed result objects.

pub mod ast;
mod client;
pub mod collocation;
pub mod loc;
pub mod operation;
pub mod response;
pub mod result;
pub mod schema;
pub mod types;
mod value;

pub use client::Client;
pub use client::ClientError;
pub use client::CompiledDefinition;
pub use client::ParseError;
pub use collocation::allow_noncollocated_callers;
pub use collocation::CollocationError;
pub use value::Value;

#[cfg(test)]
mod tests;
