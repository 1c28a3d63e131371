//! Implementation of the `luashim repl` command.
//!
//! Every line is its own snippet with its own namespace, so top-level names do
//! not carry over from one line to the next. Lines a snippet reads through
//! `input` or `io.read` come from the same stdin.

use std::io::{self, BufRead, IsTerminal, Write};
use std::rc::Rc;

use anyhow::Result;
use luashim_lib::Shim;
use luashim_lib::streams::{StdinSource, StdoutSink};
use tracing::debug;

use super::map_shim_err;
use crate::output::print_info;

const QUIT: &str = ":quit";

pub fn cmd_repl(shim: &Shim) -> Result<()> {
  let interactive = io::stdin().is_terminal();
  map_shim_err(shim.hook_io(Rc::new(StdoutSink), Some(Rc::new(StdinSource))))?;

  if interactive {
    print_info(&format!(
      "luashim v{} (each line runs in a fresh namespace, {} to exit)",
      env!("CARGO_PKG_VERSION"),
      QUIT
    ));
  }

  let mut runs = 0usize;
  loop {
    if interactive {
      write!(io::stderr(), "> ")?;
      io::stderr().flush()?;
    }

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
      break;
    }

    let snippet = line.trim();
    if snippet.is_empty() {
      continue;
    }
    if snippet == QUIT {
      break;
    }

    shim.run_code(snippet);
    runs += 1;
  }

  debug!(runs, "repl finished");
  Ok(())
}
