//! The session object hosts talk to.
//!
//! A [`Shim`] owns one Lua state and the stream context shared with it:
//!
//! ```ignore
//! use std::rc::Rc;
//! use luashim_lib::Shim;
//!
//! let shim = Shim::new()?;
//! shim.hook_io(Rc::new(my_sink), Some(Rc::new(my_line_source)))?;
//! shim.run_code("print('hi')");
//! ```

use std::io::Write;
use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;

use crate::config::ShimConfig;
use crate::error::ShimError;
use crate::exec::{self, Outcome};
use crate::lua::{globals, runtime};
use crate::streams::{LastResort, LineSource, Sink, Streams};

pub struct Shim {
  lua: Lua,
  streams: Rc<Streams>,
  config: ShimConfig,
}

#[derive(Default)]
pub struct ShimBuilder {
  config: Option<ShimConfig>,
  last_resort: Option<LastResort>,
}

impl ShimBuilder {
  pub fn config(mut self, config: ShimConfig) -> Self {
    self.config = Some(config);
    self
  }

  /// Replace the last-resort channel (the process stderr by default).
  pub fn last_resort(mut self, writer: impl Write + 'static) -> Self {
    self.last_resort = Some(LastResort::new(writer));
    self
  }

  pub fn build(self) -> Result<Shim, ShimError> {
    let config = self.config.unwrap_or_else(ShimConfig::from_env);
    let streams = Rc::new(Streams::new(self.last_resort.unwrap_or_else(LastResort::stderr)));
    let lua = runtime::create_runtime(streams.clone(), &config)?;
    Ok(Shim { lua, streams, config })
  }
}

impl Shim {
  /// Create a shim configured from the environment.
  pub fn new() -> Result<Self, ShimError> {
    Self::builder().build()
  }

  pub fn builder() -> ShimBuilder {
    ShimBuilder::default()
  }

  /// Route the interpreter's standard streams to host capabilities.
  ///
  /// Output and error both go to `sink`. When `line_source` is given, input is
  /// read from it and the prompted-read global `input` is installed. Each call
  /// replaces the previous binding; the previous sink is simply released.
  /// If installing `input` fails, the previous binding is left untouched.
  pub fn hook_io(&self, sink: Rc<dyn Sink>, line_source: Option<Rc<dyn LineSource>>) -> Result<(), ShimError> {
    if line_source.is_some() {
      globals::register_input(&self.lua, self.streams.clone())?;
    }
    self.streams.bind(sink, line_source);
    Ok(())
  }

  /// Run a snippet, writing any failure's diagnostic to the bound output.
  ///
  /// Never fails and never panics on account of the snippet.
  pub fn run_code(&self, source: &str) {
    let outcome = self.execute(source);
    self.report(&outcome);
  }

  /// Run a snippet and hand back its outcome without reporting it.
  pub fn execute(&self, source: &str) -> Outcome {
    exec::execute(&self.lua, source, &self.config)
  }

  /// Write the diagnostic of a failed outcome to the bound output.
  pub fn report(&self, outcome: &Outcome) {
    if let Some(diagnostic) = outcome.diagnostic() {
      debug!(kind = %diagnostic.kind, "reporting snippet failure");
      let out = self.streams.output();
      out.write(Some(&diagnostic.render()));
      out.flush();
    }
  }

  pub fn streams(&self) -> &Streams {
    &self.streams
  }

  pub fn config(&self) -> &ShimConfig {
    &self.config
  }

  /// Get access to the raw Lua state (for advanced use cases)
  pub fn lua(&self) -> &Lua {
    &self.lua
  }
}
