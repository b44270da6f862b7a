mod descriptor;
mod object;
mod result_type;

pub use descriptor::derive_result_type;
pub use descriptor::DescriptorBuildError;
pub use descriptor::FieldEntry;
pub use descriptor::PolymorphicDescriptor;
pub use descriptor::ResultDescriptor;
pub use object::CastValue;
pub use object::FieldAccessError;
pub use object::Nodes;
pub use object::ResultObject;
pub use result_type::CastError;
pub use result_type::ResultType;

#[cfg(test)]
mod tests;
