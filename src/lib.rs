//! The core of a small indentation-sensitive, dynamically-typed,
//! object-oriented scripting language: a lexer that models block
//! structure with synthesized `Indent`/`Dedent`/`Newline` tokens, and a
//! tree-walking runtime with reference-counted values,
//! single-inheritance classes, and dunder-method dispatch (`__init__`,
//! `__str__`, `__eq__`, `__lt__`, `__add__`).
//!
//! The parser and the CLI driver are external: this crate defines the
//! token stream the parser consumes ([`syntax::Lexer`]) and the
//! executable statement tree it produces ([`ast::Stmt`]).

pub mod ast;
mod error;
pub mod runtime;
pub mod span;
pub mod syntax;

pub use ast::{execute_program, BinaryOp, Stmt};
pub use error::{Error, LexError, Result, RuntimeError};
pub use runtime::{Class, Closure, Context, Instance, Method, ObjectHolder, Value};
pub use span::Span;
pub use syntax::{Lexer, Token, TokenKind};
