//! Implementation of the `luashim eval` command.

use anyhow::Result;
use luashim_lib::Shim;

use super::run_snippet;
use crate::output::OutputFormat;

/// Run inline source as one snippet. Returns whether it completed.
pub fn cmd_eval(shim: &Shim, code: &str, format: OutputFormat) -> Result<bool> {
  run_snippet(shim, code, format)
}
