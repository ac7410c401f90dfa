use std::error::Error as StdError;
use std::fmt::Display;

use crate::span::Span;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
  Lex(LexError),
  Runtime(RuntimeError),
}

impl From<LexError> for Error {
  fn from(value: LexError) -> Self {
    Error::Lex(value)
  }
}

impl From<RuntimeError> for Error {
  fn from(value: RuntimeError) -> Self {
    Error::Runtime(value)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Lex(e) => write!(f, "{e}"),
      Error::Runtime(e) => write!(f, "{e}"),
    }
  }
}

impl StdError for Error {}

/// An error produced while turning source text into tokens, or by a
/// failed `expect` on the token cursor.
#[derive(Debug)]
pub struct LexError {
  pub message: String,
  pub span: Span,
}

impl LexError {
  pub fn new(message: impl Into<String>, span: Span) -> LexError {
    LexError {
      message: message.into(),
      span,
    }
  }
}

impl Display for LexError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "lex error at {}: {}", self.span, self.message)
  }
}

impl StdError for LexError {}

/// An error raised during evaluation. Aborts the current program; the
/// language has no user-level catch mechanism.
#[derive(Debug)]
pub struct RuntimeError {
  pub message: String,
}

impl RuntimeError {
  pub fn new(message: impl Into<String>) -> RuntimeError {
    RuntimeError {
      message: message.into(),
    }
  }
}

impl Display for RuntimeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "runtime error: {}", self.message)
  }
}

impl StdError for RuntimeError {}
