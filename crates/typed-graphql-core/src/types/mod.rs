mod arena;
mod enum_value;
mod wrapper;

pub use arena::TypeGenerateError;
pub use arena::WrapperArena;
pub use enum_value::EnumPredicateError;
pub use enum_value::EnumValue;
pub use wrapper::DirectiveWrapper;
pub use wrapper::EnumWrapper;
pub use wrapper::InterfaceWrapper;
pub use wrapper::ListWrapper;
pub use wrapper::NonNullWrapper;
pub use wrapper::ObjectWrapper;
pub use wrapper::ScalarWrapper;
pub use wrapper::TypeWrapper;
pub use wrapper::UnionWrapper;
pub use wrapper::WrapperId;
