//! Implementation of the `luashim run` command.

use std::path::Path;

use anyhow::{Context, Result};
use luashim_lib::Shim;
use tracing::info;

use super::run_snippet;
use crate::output::OutputFormat;

/// Run a Lua file as one snippet. Returns whether it completed.
pub fn cmd_run(shim: &Shim, file: &Path, format: OutputFormat) -> Result<bool> {
  let source = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
  info!(path = %file.display(), "running file");
  run_snippet(shim, strip_shebang(&source), format)
}

/// Blank out a leading `#!` line, keeping line numbers intact.
fn strip_shebang(source: &str) -> &str {
  if source.starts_with("#!") {
    match source.find('\n') {
      Some(at) => &source[at..],
      None => "",
    }
  } else {
    source
  }
}
