//! The comparison algebra. `equal` and `less` are primitive; the other
//! four predicates derive from them, so exactly one of `<`, `=`, `>`
//! holds for comparable operands.

use super::class::{EQ_METHOD, LT_METHOD};
use super::ctx::Context;
use super::handle::ObjectHolder;
use super::value::Value;
use crate::error::RuntimeError;

/// Defined for two empty holders, same-kind primitives, and instances
/// whose class has `__eq__`.
pub fn equal(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  let (lcell, rcell) = match (lhs.get(), rhs.get()) {
    (None, None) => return Ok(true),
    (Some(lcell), Some(rcell)) => (lcell, rcell),
    _ => return Err(RuntimeError::new("cannot compare values for equality")),
  };

  let dispatch = {
    match (&*lcell.borrow(), &*rcell.borrow()) {
      (Value::Number(a), Value::Number(b)) => return Ok(a == b),
      (Value::String(a), Value::String(b)) => return Ok(a == b),
      (Value::Bool(a), Value::Bool(b)) => return Ok(a == b),
      (Value::Instance(instance), _) => instance.has_method(EQ_METHOD, 1),
      _ => false,
    }
  };
  if dispatch {
    return Ok(lhs.call_method(EQ_METHOD, vec![rhs.clone()], ctx)?.is_true());
  }
  Err(RuntimeError::new("cannot compare values for equality"))
}

/// Defined for same-kind primitives (strings compare lexicographically
/// by bytes) and instances whose class has `__lt__`.
pub fn less(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  let (lcell, rcell) = match (lhs.get(), rhs.get()) {
    (Some(lcell), Some(rcell)) => (lcell, rcell),
    _ => return Err(RuntimeError::new("cannot order values")),
  };

  let dispatch = {
    match (&*lcell.borrow(), &*rcell.borrow()) {
      (Value::Number(a), Value::Number(b)) => return Ok(a < b),
      (Value::String(a), Value::String(b)) => return Ok(a < b),
      (Value::Bool(a), Value::Bool(b)) => return Ok(a < b),
      (Value::Instance(instance), _) => instance.has_method(LT_METHOD, 1),
      _ => false,
    }
  };
  if dispatch {
    return Ok(lhs.call_method(LT_METHOD, vec![rhs.clone()], ctx)?.is_true());
  }
  Err(RuntimeError::new("cannot order values"))
}

pub fn not_equal(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  Ok(!equal(lhs, rhs, ctx)?)
}

pub fn greater(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  Ok(!less(lhs, rhs, ctx)? && !equal(lhs, rhs, ctx)?)
}

pub fn less_or_equal(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  Ok(!greater(lhs, rhs, ctx)?)
}

pub fn greater_or_equal(
  lhs: &ObjectHolder,
  rhs: &ObjectHolder,
  ctx: &mut Context,
) -> Result<bool, RuntimeError> {
  Ok(!less(lhs, rhs, ctx)?)
}
