use std::any::Any;
use std::fmt;
use std::io;

/// Where program output goes. Anything `Write` works; `Any` lets tests
/// downcast the sink back out to inspect what was written.
pub trait Output: io::Write + Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: io::Write + Any> Output for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// The evaluation context: owns the program's output sink. All
/// observable side effects of a program are bytes written here; the
/// evaluator never reads back.
pub struct Context {
  out: Box<dyn Output>,
}

impl Context {
  pub fn with_output(out: impl Output + 'static) -> Context {
    Context { out: Box::new(out) }
  }

  pub fn stdout() -> Context {
    Context::with_output(io::stdout())
  }

  /// A context that collects output in memory; read it back with
  /// [`Context::io`].
  pub fn capture() -> Context {
    Context::with_output(Vec::<u8>::new())
  }

  pub fn print(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
    self.out.write_fmt(args)
  }

  pub fn io<T: 'static>(&self) -> Option<&T> {
    self.out.as_any().downcast_ref()
  }
}

impl Default for Context {
  fn default() -> Context {
    Context::stdout()
  }
}
