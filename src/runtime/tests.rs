use std::rc::Rc;

use super::*;
use crate::ast::{BinaryOp, Stmt};

fn number(value: i64) -> ObjectHolder {
  ObjectHolder::own(Value::Number(value))
}

fn string(value: &str) -> ObjectHolder {
  ObjectHolder::own(Value::String(value.to_owned()))
}

fn boolean(value: bool) -> ObjectHolder {
  ObjectHolder::own(Value::Bool(value))
}

fn method(name: &str, params: &[&str], body: Stmt) -> Method {
  Method::new(
    name,
    params.iter().map(|p| (*p).to_owned()).collect(),
    Stmt::MethodBody(Box::new(body)),
  )
}

fn instance_of(class: &Rc<Class>) -> ObjectHolder {
  ObjectHolder::own(Value::Instance(Instance::new(class.clone())))
}

fn set_field(holder: &ObjectHolder, name: &str, value: ObjectHolder) {
  let cell = holder.get().unwrap();
  match &mut *cell.borrow_mut() {
    Value::Instance(instance) => {
      instance.fields_mut().insert(name.to_owned(), value);
    }
    other => panic!("not an instance: {}", other.type_name()),
  };
}

// A class whose `__eq__`/`__lt__` compare the `n` field against the
// other operand's `n` field.
fn ordered_class() -> Rc<Class> {
  let eq = method(
    "__eq__",
    &["other"],
    Stmt::Return(Box::new(Stmt::binary(
      BinaryOp::Eq,
      Stmt::variable(["self", "n"]),
      Stmt::variable(["other", "n"]),
    ))),
  );
  let lt = method(
    "__lt__",
    &["other"],
    Stmt::Return(Box::new(Stmt::binary(
      BinaryOp::Less,
      Stmt::variable(["self", "n"]),
      Stmt::variable(["other", "n"]),
    ))),
  );
  Rc::new(Class::new("Ordered", vec![eq, lt], None))
}

#[test]
fn render_primitives() {
  let mut ctx = Context::capture();
  assert_eq!(number(127).render(&mut ctx).unwrap(), "127");
  assert_eq!(string("hello!").render(&mut ctx).unwrap(), "hello!");
  assert_eq!(boolean(true).render(&mut ctx).unwrap(), "True");
  assert_eq!(boolean(false).render(&mut ctx).unwrap(), "False");
  assert_eq!(ObjectHolder::none().render(&mut ctx).unwrap(), "None");
}

#[test]
fn render_class_and_instance() {
  let mut ctx = Context::capture();
  let class = Rc::new(Class::new("Point", vec![], None));
  let holder = ObjectHolder::own(Value::Class(class.clone()));
  assert_eq!(holder.render(&mut ctx).unwrap(), "Class Point");

  // No `__str__`: an implementation-defined placeholder.
  let instance = instance_of(&class);
  let rendered = instance.render(&mut ctx).unwrap();
  assert!(rendered.starts_with("<class `Point` instance"), "{rendered}");
}

#[test]
fn render_instance_with_str_method() {
  let mut ctx = Context::capture();
  let class = Rc::new(Class::new(
    "Greeter",
    vec![method("__str__", &[], Stmt::Return(Box::new(Stmt::string("hi"))))],
    None,
  ));
  assert_eq!(instance_of(&class).render(&mut ctx).unwrap(), "hi");
}

#[test]
fn truthiness() {
  assert!(!ObjectHolder::none().is_true());
  assert!(!string("").is_true());
  assert!(string("x").is_true());
  assert!(!number(0).is_true());
  assert!(number(-1).is_true());
  assert!(boolean(true).is_true());
  assert!(!boolean(false).is_true());

  let class = Rc::new(Class::new("T", vec![], None));
  assert!(!ObjectHolder::own(Value::Class(class.clone())).is_true());
  assert!(!instance_of(&class).is_true());
}

#[test]
fn owned_and_borrowed_holders_share_one_cell() {
  let owned = number(1);
  let cell = owned.get().unwrap();
  let shared = ObjectHolder::share(&cell);

  assert_eq!(shared.as_number(), Some(1));
  *cell.borrow_mut() = Value::Number(2);
  assert_eq!(owned.as_number(), Some(2));
  assert_eq!(shared.as_number(), Some(2));

  // The borrowed holder does not keep the value alive.
  drop(cell);
  drop(owned);
  assert!(shared.is_empty());
  assert_eq!(shared.as_number(), None);
}

#[test]
fn typed_accessors() {
  assert_eq!(number(42).as_number(), Some(42));
  assert_eq!(number(42).as_bool(), None);
  assert_eq!(string("s").as_string(), Some("s".to_owned()));
  assert_eq!(boolean(true).as_bool(), Some(true));
  assert_eq!(ObjectHolder::none().as_number(), None);

  let class = Rc::new(Class::new("T", vec![], None));
  let holder = ObjectHolder::own(Value::Class(class.clone()));
  assert!(Rc::ptr_eq(&holder.as_class().unwrap(), &class));
  assert!(instance_of(&class).is_instance());
  assert!(!number(1).is_instance());
}

#[test]
fn get_method_walks_the_parent_chain() {
  let base = Rc::new(Class::new(
    "Base",
    vec![
      method("shared", &[], Stmt::Return(Box::new(Stmt::number(1)))),
      method("base_only", &[], Stmt::Return(Box::new(Stmt::number(2)))),
    ],
    None,
  ));
  let child = Rc::new(Class::new(
    "Child",
    vec![method("shared", &[], Stmt::Return(Box::new(Stmt::number(3))))],
    Some(base.clone()),
  ));

  // Own methods shadow the parent's.
  let mut ctx = Context::capture();
  let instance = instance_of(&child);
  let shared = instance.call_method("shared", vec![], &mut ctx).unwrap();
  assert_eq!(shared.as_number(), Some(3));
  let inherited = instance.call_method("base_only", vec![], &mut ctx).unwrap();
  assert_eq!(inherited.as_number(), Some(2));

  assert!(base.get_method("base_only").is_some());
  assert!(base.get_method("missing").is_none());
  assert!(child.get_method("base_only").is_some());
}

#[test]
fn call_binds_params_in_order_and_self() {
  let class = Rc::new(Class::new(
    "T",
    vec![
      method(
        "sub",
        &["a", "b"],
        Stmt::Return(Box::new(Stmt::binary(
          BinaryOp::Sub,
          Stmt::variable(["a"]),
          Stmt::variable(["b"]),
        ))),
      ),
      method("me", &[], Stmt::Return(Box::new(Stmt::variable(["self"])))),
    ],
    None,
  ));
  let mut ctx = Context::capture();
  let instance = instance_of(&class);

  let result = instance
    .call_method("sub", vec![number(10), number(4)], &mut ctx)
    .unwrap();
  assert_eq!(result.as_number(), Some(6));

  // `self` is the caller's instance, not a copy.
  let me = instance.call_method("me", vec![], &mut ctx).unwrap();
  assert!(Rc::ptr_eq(&me.get().unwrap(), &instance.get().unwrap()));
}

#[test]
fn method_frames_are_isolated_from_the_global_scope() {
  let class = Rc::new(Class::new(
    "T",
    vec![method(
      "leak",
      &[],
      Stmt::Return(Box::new(Stmt::variable(["outer"]))),
    )],
    None,
  ));
  let mut ctx = Context::capture();
  let instance = instance_of(&class);

  // The frame holds exactly `self` and the formal parameters; nothing
  // from any outer scope leaks in.
  let error = instance.call_method("leak", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "undefined variable `outer`");
}

#[test]
fn inherited_method_sees_the_child_instance() {
  let base = Rc::new(Class::new(
    "Base",
    vec![method("whoami", &[], Stmt::Return(Box::new(Stmt::variable(["self"]))))],
    None,
  ));
  let child = Rc::new(Class::new("Child", vec![], Some(base)));
  let mut ctx = Context::capture();
  let instance = instance_of(&child);

  let me = instance.call_method("whoami", vec![], &mut ctx).unwrap();
  assert!(Rc::ptr_eq(&me.get().unwrap(), &instance.get().unwrap()));
}

#[test]
fn call_errors() {
  let class = Rc::new(Class::new(
    "T",
    vec![method("f", &["a"], Stmt::Return(Box::new(Stmt::variable(["a"]))))],
    None,
  ));
  let mut ctx = Context::capture();
  let instance = instance_of(&class);

  let error = instance.call_method("missing", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "method `missing` not found on class `T`");

  let error = instance.call_method("f", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "method `f` expects 1 arguments, got 0");

  let error = number(1).call_method("f", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "cannot call method `f` on a number");

  let error = ObjectHolder::none().call_method("f", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "cannot call method `f` on None");
}

#[test]
fn return_escaping_a_method_body_is_an_error() {
  let class = Rc::new(Class::new(
    "T",
    // Bare body without the MethodBody boundary.
    vec![Method::new(
      "f",
      vec![],
      Stmt::Return(Box::new(Stmt::number(1))),
    )],
    None,
  ));
  let mut ctx = Context::capture();
  let error = instance_of(&class).call_method("f", vec![], &mut ctx).unwrap_err();
  assert_eq!(error.message, "return escaped a method body");
}

#[test]
fn has_method_checks_arity() {
  let class = Rc::new(Class::new(
    "T",
    vec![method("f", &["a", "b"], Stmt::None)],
    None,
  ));
  let instance = instance_of(&class);
  assert!(instance.has_method("f", 2));
  assert!(!instance.has_method("f", 1));
  assert!(!instance.has_method("g", 0));
  assert!(!number(1).has_method("f", 2));
}

#[test]
fn equality_on_primitives() {
  let mut ctx = Context::capture();
  assert!(equal(&number(2), &number(2), &mut ctx).unwrap());
  assert!(!equal(&number(2), &number(3), &mut ctx).unwrap());
  assert!(equal(&string("ab"), &string("ab"), &mut ctx).unwrap());
  assert!(!equal(&string("ab"), &string("ba"), &mut ctx).unwrap());
  assert!(equal(&boolean(true), &boolean(true), &mut ctx).unwrap());
  assert!(equal(&ObjectHolder::none(), &ObjectHolder::none(), &mut ctx).unwrap());

  assert!(equal(&number(1), &string("1"), &mut ctx).is_err());
  assert!(equal(&number(0), &ObjectHolder::none(), &mut ctx).is_err());
  assert!(equal(&boolean(true), &number(1), &mut ctx).is_err());
}

#[test]
fn ordering_on_primitives() {
  let mut ctx = Context::capture();
  assert!(less(&number(1), &number(2), &mut ctx).unwrap());
  assert!(!less(&number(2), &number(2), &mut ctx).unwrap());
  assert!(less(&string("abc"), &string("abd"), &mut ctx).unwrap());
  assert!(less(&string("ab"), &string("b"), &mut ctx).unwrap());
  assert!(less(&boolean(false), &boolean(true), &mut ctx).unwrap());

  assert!(less(&number(1), &string("2"), &mut ctx).is_err());
  assert!(less(&ObjectHolder::none(), &ObjectHolder::none(), &mut ctx).is_err());
}

#[test]
fn derived_predicates_are_consistent() {
  let mut ctx = Context::capture();
  let pairs = [(1, 2), (2, 2), (3, 2)];
  for (a, b) in pairs {
    let (a, b) = (number(a), number(b));
    let lt = less(&a, &b, &mut ctx).unwrap();
    let eq = equal(&a, &b, &mut ctx).unwrap();
    let gt = greater(&a, &b, &mut ctx).unwrap();
    // Exactly one of `<`, `=`, `>`.
    assert_eq!(usize::from(lt) + usize::from(eq) + usize::from(gt), 1);
    assert_eq!(not_equal(&a, &b, &mut ctx).unwrap(), !eq);
    assert_eq!(less_or_equal(&a, &b, &mut ctx).unwrap(), !gt);
    assert_eq!(greater_or_equal(&a, &b, &mut ctx).unwrap(), !lt);
  }
}

#[test]
fn instance_comparison_dispatches_to_dunders() {
  let class = ordered_class();
  let mut ctx = Context::capture();

  let a = instance_of(&class);
  set_field(&a, "n", number(1));
  let b = instance_of(&class);
  set_field(&b, "n", number(2));
  let c = instance_of(&class);
  set_field(&c, "n", number(1));

  assert!(equal(&a, &c, &mut ctx).unwrap());
  assert!(!equal(&a, &b, &mut ctx).unwrap());
  assert!(less(&a, &b, &mut ctx).unwrap());
  assert!(!less(&b, &a, &mut ctx).unwrap());
  assert!(greater(&b, &a, &mut ctx).unwrap());
}

#[test]
fn instance_without_dunders_cannot_compare() {
  let class = Rc::new(Class::new("T", vec![], None));
  let mut ctx = Context::capture();
  let a = instance_of(&class);
  let b = instance_of(&class);
  assert!(equal(&a, &b, &mut ctx).is_err());
  assert!(less(&a, &b, &mut ctx).is_err());
}

#[test]
fn context_captures_output() {
  let mut ctx = Context::capture();
  ctx.print(format_args!("{} {}\n", 1, "two")).unwrap();
  let out = ctx.io::<Vec<u8>>().unwrap();
  assert_eq!(std::str::from_utf8(out).unwrap(), "1 two\n");
}
