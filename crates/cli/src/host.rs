//! Host-side capabilities handed to the shim.
//!
//! Text mode binds the process streams directly (`StdoutSink`, `StdinSource`);
//! JSON mode needs the output in hand to embed it in the report.

use std::cell::RefCell;

use luashim_lib::{Sink, SinkError};

/// Collects output so it can be embedded in a JSON report.
#[derive(Default)]
pub struct CaptureSink {
  text: RefCell<String>,
}

impl CaptureSink {
  pub fn take(&self) -> String {
    self.text.take()
  }
}

impl Sink for CaptureSink {
  fn write(&self, text: &str) -> Result<(), SinkError> {
    self.text.borrow_mut().push_str(text);
    Ok(())
  }
}
