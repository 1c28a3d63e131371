mod eval;
mod repl;
mod run;

pub use eval::cmd_eval;
pub use repl::cmd_repl;
pub use run::cmd_run;

use std::rc::Rc;

use anyhow::Result;
use luashim_lib::streams::{StdinSource, StdoutSink};
use luashim_lib::{Outcome, Shim};

use crate::host::CaptureSink;
use crate::output::{OutputFormat, print_error, print_json};

// mlua errors are not Send + Sync, so they cannot become anyhow errors directly.
pub(crate) fn map_shim_err<T>(result: Result<T, luashim_lib::ShimError>) -> Result<T> {
  result.map_err(|e| anyhow::anyhow!("{}", e))
}

/// Run one snippet under `format`, returning whether it completed.
///
/// Text mode streams output to the terminal and writes diagnostics there too.
/// JSON mode captures output and prints a single report object afterwards.
pub(crate) fn run_snippet(shim: &Shim, source: &str, format: OutputFormat) -> Result<bool> {
  if format.is_json() {
    let capture = Rc::new(CaptureSink::default());
    map_shim_err(shim.hook_io(capture.clone(), Some(Rc::new(StdinSource))))?;

    let outcome = shim.execute(source);
    let mut report = serde_json::to_value(&outcome)?;
    report["output"] = serde_json::Value::String(capture.take());
    print_json(&report)?;
    return Ok(outcome.is_completed());
  }

  map_shim_err(shim.hook_io(Rc::new(StdoutSink), Some(Rc::new(StdinSource))))?;
  let outcome = shim.execute(source);
  shim.report(&outcome);
  if let Outcome::Failed(diagnostic) = &outcome {
    print_error(&format!("snippet failed ({} error)", diagnostic.kind));
  }
  Ok(outcome.is_completed())
}
