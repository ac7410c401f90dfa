//! The executable statement tree. The parser produces this via the
//! constructor helpers; everything is a statement, expressions
//! included, and executing one yields an [`ObjectHolder`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::runtime::class::{ADD_METHOD, INIT_METHOD};
use crate::runtime::{cmp, Class, Closure, Context, Exec, Instance, ObjectHolder, Unwind, Value};

#[derive(Debug)]
pub enum Stmt {
  /// A literal; executes to a holder borrowing the embedded value.
  Const(Rc<RefCell<Value>>),
  /// The `None` literal; executes to the empty holder.
  None,
  /// A dotted path: `a`, `a.b`, `a.b.c`, …
  Variable(Vec<String>),
  Assign {
    name: String,
    value: Box<Stmt>,
  },
  AssignField {
    object: Box<Stmt>,
    field: String,
    value: Box<Stmt>,
  },
  Print(Vec<Stmt>),
  CallMethod {
    object: Box<Stmt>,
    method: String,
    args: Vec<Stmt>,
  },
  New {
    class: Rc<Class>,
    args: Vec<Stmt>,
  },
  /// `str(x)`.
  Stringify(Box<Stmt>),
  Binary {
    op: BinaryOp,
    lhs: Box<Stmt>,
    rhs: Box<Stmt>,
  },
  Not(Box<Stmt>),
  Compound(Vec<Stmt>),
  IfElse {
    condition: Box<Stmt>,
    then: Box<Stmt>,
    otherwise: Option<Box<Stmt>>,
  },
  Return(Box<Stmt>),
  /// Method-body boundary: catches a `return` thrown anywhere inside.
  MethodBody(Box<Stmt>),
  DefineClass(Rc<Class>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  And,
  Or,
  Eq,
  Neq,
  Less,
  LessEq,
  More,
  MoreEq,
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::And => "and",
      BinaryOp::Or => "or",
      BinaryOp::Eq => "==",
      BinaryOp::Neq => "!=",
      BinaryOp::Less => "<",
      BinaryOp::LessEq => "<=",
      BinaryOp::More => ">",
      BinaryOp::MoreEq => ">=",
    })
  }
}

impl Stmt {
  pub fn number(value: i64) -> Stmt {
    Stmt::Const(Rc::new(RefCell::new(Value::Number(value))))
  }

  pub fn string(value: impl Into<String>) -> Stmt {
    Stmt::Const(Rc::new(RefCell::new(Value::String(value.into()))))
  }

  pub fn boolean(value: bool) -> Stmt {
    Stmt::Const(Rc::new(RefCell::new(Value::Bool(value))))
  }

  pub fn variable(names: impl IntoIterator<Item = impl Into<String>>) -> Stmt {
    Stmt::Variable(names.into_iter().map(Into::into).collect())
  }

  pub fn binary(op: BinaryOp, lhs: Stmt, rhs: Stmt) -> Stmt {
    Stmt::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  pub fn execute(&self, closure: &mut Closure, ctx: &mut Context) -> Exec {
    match self {
      Stmt::Const(cell) => Ok(ObjectHolder::share(cell)),
      Stmt::None => Ok(ObjectHolder::none()),
      Stmt::Variable(names) => lookup(names, closure),
      Stmt::Assign { name, value } => {
        let value = value.execute(closure, ctx)?;
        closure.insert(name.clone(), value.clone());
        Ok(value)
      }
      Stmt::AssignField {
        object,
        field,
        value,
      } => {
        let object = object.execute(closure, ctx)?;
        let Some(cell) = object.get() else {
          return Err(
            RuntimeError::new(format!("cannot assign field `{field}` on None")).into(),
          );
        };
        let value = value.execute(closure, ctx)?;
        let result = match &mut *cell.borrow_mut() {
          Value::Instance(instance) => {
            instance.fields_mut().insert(field.clone(), value.clone());
            Ok(value)
          }
          other => Err(
            RuntimeError::new(format!(
              "cannot assign field `{field}` on a {}",
              other.type_name()
            ))
            .into(),
          ),
        };
        result
      }
      Stmt::Print(args) => {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
          let value = arg.execute(closure, ctx)?;
          parts.push(value.render(ctx)?);
        }
        ctx
          .print(format_args!("{}\n", parts.join(" ")))
          .map_err(|e| RuntimeError::new(format!("failed to write output: {e}")))?;
        Ok(ObjectHolder::none())
      }
      Stmt::CallMethod {
        object,
        method,
        args,
      } => {
        let object = object.execute(closure, ctx)?;
        let mut actual = Vec::with_capacity(args.len());
        for arg in args {
          actual.push(arg.execute(closure, ctx)?);
        }
        Ok(object.call_method(method, actual, ctx)?)
      }
      Stmt::New { class, args } => {
        let instance = ObjectHolder::own(Value::Instance(Instance::new(class.clone())));
        if instance.has_method(INIT_METHOD, args.len()) {
          let mut actual = Vec::with_capacity(args.len());
          for arg in args {
            actual.push(arg.execute(closure, ctx)?);
          }
          instance.call_method(INIT_METHOD, actual, ctx)?;
        }
        Ok(instance)
      }
      Stmt::Stringify(arg) => {
        let value = arg.execute(closure, ctx)?;
        Ok(ObjectHolder::own(Value::String(value.render(ctx)?)))
      }
      Stmt::Binary { op, lhs, rhs } => {
        let lhs = lhs.execute(closure, ctx)?;
        let rhs = rhs.execute(closure, ctx)?;
        binary(*op, &lhs, &rhs, ctx)
      }
      Stmt::Not(arg) => {
        let value = arg.execute(closure, ctx)?;
        Ok(ObjectHolder::own(Value::Bool(!value.is_true())))
      }
      Stmt::Compound(stmts) => {
        for stmt in stmts {
          stmt.execute(closure, ctx)?;
        }
        Ok(ObjectHolder::none())
      }
      Stmt::IfElse {
        condition,
        then,
        otherwise,
      } => {
        if condition.execute(closure, ctx)?.is_true() {
          then.execute(closure, ctx)
        } else if let Some(otherwise) = otherwise {
          otherwise.execute(closure, ctx)
        } else {
          Ok(ObjectHolder::none())
        }
      }
      Stmt::Return(value) => {
        let value = value.execute(closure, ctx)?;
        Err(Unwind::Return(value))
      }
      Stmt::MethodBody(body) => match body.execute(closure, ctx) {
        Ok(_) => Ok(ObjectHolder::none()),
        Err(Unwind::Return(value)) => Ok(value),
        Err(error) => Err(error),
      },
      Stmt::DefineClass(class) => {
        let holder = ObjectHolder::own(Value::Class(class.clone()));
        closure.insert(class.name().to_owned(), holder.clone());
        Ok(holder)
      }
    }
  }
}

/// Runs a statement as a whole program. A `return` with no enclosing
/// method body is a runtime error here.
pub fn execute_program(
  program: &Stmt,
  closure: &mut Closure,
  ctx: &mut Context,
) -> crate::Result<ObjectHolder> {
  match program.execute(closure, ctx) {
    Ok(value) => Ok(value),
    Err(Unwind::Return(_)) => Err(RuntimeError::new("return outside of a method body").into()),
    Err(Unwind::Error(error)) => Err(error.into()),
  }
}

// Resolves a dotted path: the head in the closure, every further name
// in the fields of the instance reached so far.
fn lookup(names: &[String], closure: &Closure) -> Exec {
  let Some((first, rest)) = names.split_first() else {
    return Err(RuntimeError::new("empty variable path").into());
  };
  let mut holder = match closure.get(first) {
    Some(holder) => holder.clone(),
    None => return Err(RuntimeError::new(format!("undefined variable `{first}`")).into()),
  };
  for name in rest {
    let Some(cell) = holder.get() else {
      return Err(RuntimeError::new(format!("cannot read field `{name}` of None")).into());
    };
    let next = {
      match &*cell.borrow() {
        Value::Instance(instance) => instance.fields().get(name.as_str()).cloned(),
        other => {
          return Err(
            RuntimeError::new(format!(
              "cannot read field `{name}` of a {}",
              other.type_name()
            ))
            .into(),
          )
        }
      }
    };
    holder = match next {
      Some(holder) => holder,
      None => return Err(RuntimeError::new(format!("undefined field `{name}`")).into()),
    };
  }
  Ok(holder)
}

fn binary(op: BinaryOp, lhs: &ObjectHolder, rhs: &ObjectHolder, ctx: &mut Context) -> Exec {
  match op {
    BinaryOp::Add => add(lhs, rhs, ctx),
    BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => arithmetic(op, lhs, rhs),
    // `and` and `or` evaluate both operands; see `Stmt::Binary`. The
    // result is always a fresh bool.
    BinaryOp::And => {
      let value = if lhs.is_true() { rhs.is_true() } else { false };
      Ok(ObjectHolder::own(Value::Bool(value)))
    }
    BinaryOp::Or => {
      let value = if lhs.is_true() { true } else { rhs.is_true() };
      Ok(ObjectHolder::own(Value::Bool(value)))
    }
    BinaryOp::Eq
    | BinaryOp::Neq
    | BinaryOp::Less
    | BinaryOp::LessEq
    | BinaryOp::More
    | BinaryOp::MoreEq => {
      let value = match op {
        BinaryOp::Eq => cmp::equal(lhs, rhs, ctx)?,
        BinaryOp::Neq => cmp::not_equal(lhs, rhs, ctx)?,
        BinaryOp::Less => cmp::less(lhs, rhs, ctx)?,
        BinaryOp::LessEq => cmp::less_or_equal(lhs, rhs, ctx)?,
        BinaryOp::More => cmp::greater(lhs, rhs, ctx)?,
        BinaryOp::MoreEq => cmp::greater_or_equal(lhs, rhs, ctx)?,
        _ => unreachable!(),
      };
      Ok(ObjectHolder::own(Value::Bool(value)))
    }
  }
}

fn add(lhs: &ObjectHolder, rhs: &ObjectHolder, ctx: &mut Context) -> Exec {
  if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
    let Some(value) = a.checked_add(b) else {
      return Err(RuntimeError::new("integer overflow").into());
    };
    return Ok(ObjectHolder::own(Value::Number(value)));
  }
  if let (Some(a), Some(b)) = (lhs.as_string(), rhs.as_string()) {
    return Ok(ObjectHolder::own(Value::String(a + &b)));
  }
  if lhs.has_method(ADD_METHOD, 1) {
    return Ok(lhs.call_method(ADD_METHOD, vec![rhs.clone()], ctx)?);
  }
  Err(RuntimeError::new("unsupported operand types for `+`").into())
}

fn arithmetic(op: BinaryOp, lhs: &ObjectHolder, rhs: &ObjectHolder) -> Exec {
  let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
    return Err(RuntimeError::new(format!("unsupported operand types for `{op}`")).into());
  };
  let value = match op {
    BinaryOp::Sub => a.checked_sub(b),
    BinaryOp::Mul => a.checked_mul(b),
    BinaryOp::Div => {
      if b == 0 {
        return Err(RuntimeError::new("division by zero").into());
      }
      a.checked_div(b)
    }
    _ => unreachable!(),
  };
  match value {
    Some(value) => Ok(ObjectHolder::own(Value::Number(value))),
    None => Err(RuntimeError::new("integer overflow").into()),
  }
}
