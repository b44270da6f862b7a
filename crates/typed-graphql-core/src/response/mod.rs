mod error_index;
#[allow(clippy::module_inception)]
mod response;

pub use error_index::ErrorRecord;
pub use error_index::Errors;
pub use error_index::PathSegment;
pub use response::Response;
pub use response::ResponseParseError;

#[cfg(test)]
mod tests;
