//! Error types shared across the shim.
//!
//! Only [`ShimError`] ever reaches a caller. [`SinkError`] and [`SourceError`] are
//! produced by host capabilities and absorbed by the stream adapters.

use mlua::prelude::*;

/// Errors raised while setting up the interpreter or installing stream bindings.
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
  /// Lua state creation or global registration failed.
  #[error("lua error: {0}")]
  Lua(#[from] LuaError),
}

/// A host sink refused a chunk of text.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
  #[error("sink is closed")]
  Closed,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("write rejected: {0}")]
  Rejected(String),
}

/// A host line source failed to produce a line.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  #[error("line source is closed")]
  Closed,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("read failed: {0}")]
  Failed(String),
}
