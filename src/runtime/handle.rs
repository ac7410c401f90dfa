use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::class::{self, Class};
use super::ctx::Context;
use super::value::Value;
use crate::error::RuntimeError;

/// A handle to a runtime value encoding its ownership: empty, owning
/// (reference-counted storage the holder allocated), or borrowing (a
/// weak reference into storage kept alive by an outer scope).
///
/// The borrowing shape exists to pass `self` into method frames without
/// creating a reference cycle through the instance's own fields. It is
/// only ever constructed from a cell that outlives it, so `get` on a
/// live borrow does not come back empty.
#[derive(Clone, Debug, Default)]
pub struct ObjectHolder(Repr);

#[derive(Clone, Debug, Default)]
enum Repr {
  #[default]
  Empty,
  Owned(Rc<RefCell<Value>>),
  Borrowed(Weak<RefCell<Value>>),
}

impl ObjectHolder {
  /// Allocates shared storage for `value` and returns an owning holder.
  pub fn own(value: Value) -> ObjectHolder {
    ObjectHolder(Repr::Owned(Rc::new(RefCell::new(value))))
  }

  /// A non-owning holder over externally-owned storage.
  pub fn share(cell: &Rc<RefCell<Value>>) -> ObjectHolder {
    ObjectHolder(Repr::Borrowed(Rc::downgrade(cell)))
  }

  /// The empty holder.
  pub fn none() -> ObjectHolder {
    ObjectHolder(Repr::Empty)
  }

  /// The underlying cell, unless the holder is empty.
  pub fn get(&self) -> Option<Rc<RefCell<Value>>> {
    match &self.0 {
      Repr::Empty => None,
      Repr::Owned(cell) => Some(cell.clone()),
      Repr::Borrowed(weak) => weak.upgrade(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.get().is_none()
  }

  pub fn is_true(&self) -> bool {
    match self.get() {
      Some(cell) => cell.borrow().truthy(),
      None => false,
    }
  }

  pub fn as_number(&self) -> Option<i64> {
    let cell = self.get()?;
    let result = match &*cell.borrow() {
      Value::Number(value) => Some(*value),
      _ => None,
    };
    result
  }

  pub fn as_bool(&self) -> Option<bool> {
    let cell = self.get()?;
    let result = match &*cell.borrow() {
      Value::Bool(value) => Some(*value),
      _ => None,
    };
    result
  }

  pub fn as_string(&self) -> Option<String> {
    let cell = self.get()?;
    let result = match &*cell.borrow() {
      Value::String(value) => Some(value.clone()),
      _ => None,
    };
    result
  }

  pub fn as_class(&self) -> Option<Rc<Class>> {
    let cell = self.get()?;
    let result = match &*cell.borrow() {
      Value::Class(class) => Some(class.clone()),
      _ => None,
    };
    result
  }

  pub fn is_instance(&self) -> bool {
    match self.get() {
      Some(cell) => matches!(&*cell.borrow(), Value::Instance(_)),
      None => false,
    }
  }

  /// True iff the holder is an instance whose class (or an ancestor)
  /// defines `name` taking exactly `argc` arguments.
  pub fn has_method(&self, name: &str, argc: usize) -> bool {
    let Some(cell) = self.get() else {
      return false;
    };
    let result = match &*cell.borrow() {
      Value::Instance(instance) => instance.has_method(name, argc),
      _ => false,
    };
    result
  }

  /// Calls `name` on the held instance. The frame binds the formal
  /// parameters in order, then `self` as a borrowed holder over the
  /// instance's own cell.
  pub fn call_method(
    &self,
    name: &str,
    args: Vec<ObjectHolder>,
    ctx: &mut Context,
  ) -> Result<ObjectHolder, RuntimeError> {
    let Some(cell) = self.get() else {
      return Err(RuntimeError::new(format!(
        "cannot call method `{name}` on None"
      )));
    };
    let class = {
      match &*cell.borrow() {
        Value::Instance(instance) => instance.class().clone(),
        other => {
          return Err(RuntimeError::new(format!(
            "cannot call method `{name}` on a {}",
            other.type_name()
          )))
        }
      }
    };
    class::call(&class, &cell, name, args, ctx)
  }

  /// The text this value shows as in program output: `None` for the
  /// empty holder, `True`/`False` for bools, the `__str__` result for
  /// instances that have one.
  pub fn render(&self, ctx: &mut Context) -> Result<String, RuntimeError> {
    let Some(cell) = self.get() else {
      return Ok("None".to_owned());
    };
    // `__str__` re-enters the evaluator; release the borrow first.
    let text = {
      match &*cell.borrow() {
        Value::Number(value) => Some(value.to_string()),
        Value::String(value) => Some(value.clone()),
        Value::Bool(value) => Some(if *value { "True" } else { "False" }.to_owned()),
        Value::Class(class) => Some(format!("Class {}", class.name())),
        Value::Instance(instance) => {
          if instance.has_method(class::STR_METHOD, 0) {
            None
          } else {
            Some(format!(
              "<class `{}` instance at {:p}>",
              instance.class().name(),
              Rc::as_ptr(&cell)
            ))
          }
        }
      }
    };
    match text {
      Some(text) => Ok(text),
      None => self
        .call_method(class::STR_METHOD, Vec::new(), ctx)?
        .render(ctx),
    }
  }
}
