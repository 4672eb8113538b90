pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use error::IdleError;
pub use registry::{
    names, Access, BuiltinVariable, DerivedVariable, RangePolicy, UpperBound, VariableRegistry,
    VariableSlot,
};
pub use types::*;
pub use value::*;
