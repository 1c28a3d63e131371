//! Input adapter: emulates line reads over a host [`LineSource`].

use std::rc::Rc;

use tracing::warn;

use super::LineSource;

pub struct InputAdapter {
  source: Rc<dyn LineSource>,
}

impl InputAdapter {
  pub fn new(source: Rc<dyn LineSource>) -> Self {
    Self { source }
  }

  /// Request one line from the source, always newline-terminated.
  ///
  /// The end-of-input marker reads as an empty line, never as end of stream.
  /// A failing source also yields an empty line.
  pub fn read_line(&self) -> String {
    match self.source.read_line() {
      Ok(line) => {
        let mut line = line.unwrap_or_default();
        line.push('\n');
        line
      }
      Err(e) => {
        warn!(error = %e, "line source failed, substituting an empty line");
        "\n".to_string()
      }
    }
  }
}
