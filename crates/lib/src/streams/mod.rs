//! Stream redirection.
//!
//! Hosts hand the shim two capabilities: a [`Sink`] that accepts text and a
//! [`LineSource`] that produces one line per request. [`Streams`] holds the
//! adapters wrapping them in three slots (output, error, input) and is shared
//! with every Lua callback that reads or writes a standard stream.
//!
//! Slots are resolved at call time, so a rebind only affects reads and writes
//! issued after it returns. A call already in progress keeps the adapter it
//! started with.

mod input;
mod output;

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use tracing::{info, warn};

pub use input::InputAdapter;
pub use output::{LastResort, OutputAdapter};

use crate::error::{SinkError, SourceError};

/// Host capability accepting chunks of text.
///
/// Chunks arrive at any granularity: a line, a character, or a buffered block.
pub trait Sink {
  fn write(&self, text: &str) -> Result<(), SinkError>;
}

impl<F> Sink for F
where
  F: Fn(&str) -> Result<(), SinkError>,
{
  fn write(&self, text: &str) -> Result<(), SinkError> {
    self(text)
  }
}

/// Host capability producing one line per request.
///
/// `Ok(None)` marks end of input for that call only.
pub trait LineSource {
  fn read_line(&self) -> Result<Option<String>, SourceError>;
}

impl<F> LineSource for F
where
  F: Fn() -> Result<Option<String>, SourceError>,
{
  fn read_line(&self) -> Result<Option<String>, SourceError> {
    self()
  }
}

/// The process's own stdout.
pub struct StdoutSink;

impl Sink for StdoutSink {
  fn write(&self, text: &str) -> Result<(), SinkError> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
  }
}

/// The process's own stderr.
pub struct StderrSink;

impl Sink for StderrSink {
  fn write(&self, text: &str) -> Result<(), SinkError> {
    let mut err = std::io::stderr().lock();
    err.write_all(text.as_bytes())?;
    err.flush()?;
    Ok(())
  }
}

/// The process's own stdin, one line per request. End of file yields `None`.
pub struct StdinSource;

impl LineSource for StdinSource {
  fn read_line(&self) -> Result<Option<String>, SourceError> {
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
      return Ok(None);
    }
    if line.ends_with('\n') {
      line.pop();
      if line.ends_with('\r') {
        line.pop();
      }
    }
    Ok(Some(line))
  }
}

/// The three standard-stream slots shared by the session and the interpreter.
pub struct Streams {
  output: RefCell<Option<Rc<OutputAdapter>>>,
  error: RefCell<Option<Rc<OutputAdapter>>>,
  input: RefCell<Option<Rc<InputAdapter>>>,
  process_out: Rc<OutputAdapter>,
  process_err: Rc<OutputAdapter>,
  last_resort: LastResort,
}

impl Streams {
  pub fn new(last_resort: LastResort) -> Self {
    Self {
      output: RefCell::new(None),
      error: RefCell::new(None),
      input: RefCell::new(None),
      process_out: Rc::new(OutputAdapter::new(Rc::new(StdoutSink), last_resort.clone())),
      process_err: Rc::new(OutputAdapter::new(Rc::new(StderrSink), last_resort.clone())),
      last_resort,
    }
  }

  /// Point output and error at one adapter over `sink` and, when given, input at
  /// an adapter over `line_source`.
  ///
  /// Without a line source the previous input binding is left in place.
  /// Returns whether an input adapter was installed.
  pub fn bind(&self, sink: Rc<dyn Sink>, line_source: Option<Rc<dyn LineSource>>) -> bool {
    let out = Rc::new(OutputAdapter::new(sink, self.last_resort.clone()));
    *self.output.borrow_mut() = Some(out.clone());
    *self.error.borrow_mut() = Some(out);

    let has_input = match line_source {
      Some(source) => {
        *self.input.borrow_mut() = Some(Rc::new(InputAdapter::new(source)));
        true
      }
      None => false,
    };

    info!(input = has_input, "standard streams bound");
    has_input
  }

  /// Current output adapter, or the process stdout when nothing is bound.
  pub fn output(&self) -> Rc<OutputAdapter> {
    self.output.borrow().clone().unwrap_or_else(|| self.process_out.clone())
  }

  /// Current error adapter, or the process stderr when nothing is bound.
  pub fn error(&self) -> Rc<OutputAdapter> {
    self.error.borrow().clone().unwrap_or_else(|| self.process_err.clone())
  }

  pub fn input(&self) -> Option<Rc<InputAdapter>> {
    self.input.borrow().clone()
  }

  pub fn is_bound(&self) -> bool {
    self.output.borrow().is_some()
  }

  /// Read one newline-terminated line from the current input.
  ///
  /// A bound input never runs dry. Unbound, this reads the process stdin and
  /// returns `None` at end of file.
  pub fn read_line(&self) -> Option<String> {
    if let Some(input) = self.input() {
      return Some(input.read_line());
    }

    match StdinSource.read_line() {
      Ok(Some(mut line)) => {
        line.push('\n');
        Some(line)
      }
      Ok(None) => None,
      Err(e) => {
        warn!(error = %e, "process stdin failed, substituting an empty line");
        Some("\n".to_string())
      }
    }
  }

  /// Prompted read: emit `prompt` on the output stream, then read one line and
  /// strip exactly one trailing newline.
  pub fn prompt(&self, prompt: Option<&str>) -> Option<String> {
    if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
      let out = self.output();
      out.write(Some(prompt));
      out.flush();
    }

    let mut line = self.read_line()?;
    if line.ends_with('\n') {
      line.pop();
    }
    Some(line)
  }
}

#[cfg(test)]
pub(crate) mod testutil {
  //! Recording capabilities shared by the tests of this crate.

  use std::cell::RefCell;
  use std::collections::VecDeque;
  use std::io::Write;
  use std::rc::Rc;

  use super::{LineSource, Sink};
  use crate::error::{SinkError, SourceError};

  /// Sink that keeps every chunk it accepts.
  #[derive(Default)]
  pub struct RecordingSink {
    chunks: RefCell<Vec<String>>,
  }

  impl RecordingSink {
    pub fn chunks(&self) -> Vec<String> {
      self.chunks.borrow().clone()
    }

    pub fn text(&self) -> String {
      self.chunks.borrow().concat()
    }
  }

  impl Sink for RecordingSink {
    fn write(&self, text: &str) -> Result<(), SinkError> {
      self.chunks.borrow_mut().push(text.to_string());
      Ok(())
    }
  }

  /// Line source replaying a fixed script, then reporting end of input.
  ///
  /// When given a sink, every request records a `<read>` marker on it first so
  /// tests can check ordering against writes.
  pub struct ScriptedSource {
    lines: RefCell<VecDeque<Option<String>>>,
    marker: Option<Rc<RecordingSink>>,
  }

  impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
      I: IntoIterator<Item = Option<S>>,
      S: Into<String>,
    {
      Self {
        lines: RefCell::new(lines.into_iter().map(|l| l.map(Into::into)).collect()),
        marker: None,
      }
    }

    pub fn marking(mut self, sink: Rc<RecordingSink>) -> Self {
      self.marker = Some(sink);
      self
    }
  }

  impl LineSource for ScriptedSource {
    fn read_line(&self) -> Result<Option<String>, SourceError> {
      if let Some(sink) = &self.marker {
        let _ = sink.write("<read>");
      }
      Ok(self.lines.borrow_mut().pop_front().flatten())
    }
  }

  /// Cloneable in-memory writer used as a last-resort channel.
  #[derive(Clone, Default)]
  pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

  impl SharedBuffer {
    pub fn contents(&self) -> String {
      String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
  }

  impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.borrow_mut().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }
}
