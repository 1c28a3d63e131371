//! Output adapter: turns a host [`Sink`] into a text-output stream.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::warn;

use super::Sink;

/// Channel of last resort for text a sink refused.
///
/// Defaults to the process's own stderr. The shim never redirects the process
/// stderr, so this channel stays valid across every rebind.
#[derive(Clone)]
pub struct LastResort(Rc<RefCell<Box<dyn Write>>>);

impl LastResort {
  pub fn new(writer: impl Write + 'static) -> Self {
    Self(Rc::new(RefCell::new(Box::new(writer))))
  }

  pub fn stderr() -> Self {
    Self::new(std::io::stderr())
  }

  fn emit(&self, text: &str) {
    let mut writer = self.0.borrow_mut();
    // Nothing is left to report a failure to.
    let _ = writer.write_all(text.as_bytes());
    let _ = writer.flush();
  }
}

pub struct OutputAdapter {
  sink: Rc<dyn Sink>,
  last_resort: LastResort,
}

impl OutputAdapter {
  pub fn new(sink: Rc<dyn Sink>, last_resort: LastResort) -> Self {
    Self { sink, last_resort }
  }

  /// Forward a chunk to the sink and return its length in bytes.
  ///
  /// Absent and empty chunks return 0 without touching the sink. A sink failure
  /// is never propagated: the chunk goes to the last-resort channel instead and
  /// the full length is still reported.
  pub fn write(&self, chunk: Option<&str>) -> usize {
    let Some(text) = chunk else {
      return 0;
    };
    if text.is_empty() {
      return 0;
    }

    if let Err(e) = self.sink.write(text) {
      warn!(error = %e, len = text.len(), "sink rejected write, using last-resort channel");
      self.last_resort.emit(text);
    }

    text.len()
  }

  pub fn flush(&self) {}
}
