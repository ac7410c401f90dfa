pub mod class;
pub mod cmp;
pub mod ctx;
pub mod handle;
pub mod value;

use indexmap::IndexMap;

pub use class::{Class, Instance, Method};
pub use cmp::{equal, greater, greater_or_equal, less, less_or_equal, not_equal};
pub use ctx::{Context, Output};
pub use handle::ObjectHolder;
pub use value::Value;

use crate::error::RuntimeError;

/// A scope: a mapping from names to holders. Used for the global scope
/// and for each active method frame.
pub type Closure = IndexMap<String, ObjectHolder>;

/// Non-local exit from a statement: either a `return` travelling up to
/// the nearest method body, or a runtime error travelling all the way
/// out of the program.
#[derive(Debug)]
pub enum Unwind {
  Return(ObjectHolder),
  Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
  fn from(value: RuntimeError) -> Self {
    Unwind::Error(value)
  }
}

/// What executing a statement produces.
pub type Exec = Result<ObjectHolder, Unwind>;

#[cfg(test)]
mod tests;
