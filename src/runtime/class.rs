use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use super::ctx::Context;
use super::handle::ObjectHolder;
use super::value::Value;
use super::{Closure, Unwind};
use crate::ast::Stmt;
use crate::error::RuntimeError;

pub const INIT_METHOD: &str = "__init__";
pub const STR_METHOD: &str = "__str__";
pub const EQ_METHOD: &str = "__eq__";
pub const LT_METHOD: &str = "__lt__";
pub const ADD_METHOD: &str = "__add__";

/// A named method. `formal_params` never contains `self`; the runtime
/// binds it at call time.
#[derive(Debug)]
pub struct Method {
  pub name: String,
  pub formal_params: Vec<String>,
  pub body: Stmt,
}

impl Method {
  pub fn new(name: impl Into<String>, formal_params: Vec<String>, body: Stmt) -> Method {
    Method {
      name: name.into(),
      formal_params,
      body,
    }
  }
}

/// A class: a name, a method table, and at most one parent. The method
/// table is immutable after construction; classes are shared via `Rc`
/// and the parent chain is acyclic by construction.
#[derive(Debug)]
pub struct Class {
  name: String,
  methods: Vec<Method>,
  parent: Option<Rc<Class>>,
}

impl Class {
  pub fn new(name: impl Into<String>, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Class {
    Class {
      name: name.into(),
      methods,
      parent,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parent(&self) -> Option<&Rc<Class>> {
    self.parent.as_ref()
  }

  /// The first method with this name among the class's own methods,
  /// else the nearest match up the parent chain.
  pub fn get_method(&self, name: &str) -> Option<&Method> {
    self
      .methods
      .iter()
      .find(|method| method.name == name)
      .or_else(|| self.parent.as_ref().and_then(|parent| parent.get_method(name)))
  }
}

impl Display for Class {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Class {}", self.name)
  }
}

/// An instance: its class and its fields. Fields are created purely by
/// field assignment, typically from `__init__`.
#[derive(Debug)]
pub struct Instance {
  class: Rc<Class>,
  fields: Closure,
}

impl Instance {
  pub fn new(class: Rc<Class>) -> Instance {
    Instance {
      class,
      fields: Closure::new(),
    }
  }

  pub fn class(&self) -> &Rc<Class> {
    &self.class
  }

  pub fn fields(&self) -> &Closure {
    &self.fields
  }

  pub fn fields_mut(&mut self) -> &mut Closure {
    &mut self.fields
  }

  /// True iff a method with this name exists and takes exactly `argc`
  /// arguments (`self` not counted).
  pub fn has_method(&self, name: &str, argc: usize) -> bool {
    self
      .class
      .get_method(name)
      .map_or(false, |method| method.formal_params.len() == argc)
  }
}

// Frame construction and dispatch for a method call on `cell`, which
// must hold the instance `class` was taken from.
pub(super) fn call(
  class: &Rc<Class>,
  cell: &Rc<RefCell<Value>>,
  name: &str,
  args: Vec<ObjectHolder>,
  ctx: &mut Context,
) -> Result<ObjectHolder, RuntimeError> {
  let Some(method) = class.get_method(name) else {
    return Err(RuntimeError::new(format!(
      "method `{name}` not found on class `{}`",
      class.name
    )));
  };
  if method.formal_params.len() != args.len() {
    return Err(RuntimeError::new(format!(
      "method `{name}` expects {} arguments, got {}",
      method.formal_params.len(),
      args.len()
    )));
  }

  let mut frame = Closure::new();
  for (param, arg) in method.formal_params.iter().zip(args) {
    frame.insert(param.clone(), arg);
  }
  frame.insert("self".to_owned(), ObjectHolder::share(cell));

  match method.body.execute(&mut frame, ctx) {
    Ok(value) => Ok(value),
    Err(Unwind::Return(_)) => Err(RuntimeError::new("return escaped a method body")),
    Err(Unwind::Error(error)) => Err(error),
  }
}
