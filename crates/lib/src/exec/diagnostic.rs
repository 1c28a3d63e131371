//! Rendering of snippet failures.

use std::fmt;

use mlua::prelude::*;
use serde::Serialize;

const TRACEBACK_MARKER: &str = "stack traceback:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
  Syntax,
  Runtime,
  Memory,
  Callback,
  Other,
}

impl FailureKind {
  pub fn as_str(self) -> &'static str {
    match self {
      FailureKind::Syntax => "syntax",
      FailureKind::Runtime => "runtime",
      FailureKind::Memory => "memory",
      FailureKind::Callback => "callback",
      FailureKind::Other => "other",
    }
  }
}

impl fmt::Display for FailureKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Everything known about a failed run: what kind of failure, its message, and
/// the Lua stack traceback when the interpreter produced one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub kind: FailureKind,
  pub message: String,
  pub traceback: Option<String>,
}

impl Diagnostic {
  pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
      traceback: None,
    }
  }

  pub fn from_lua_error(err: &LuaError) -> Self {
    match err {
      LuaError::SyntaxError { message, .. } => Self::new(FailureKind::Syntax, message.clone()),
      LuaError::RuntimeError(message) => Self::with_embedded_traceback(FailureKind::Runtime, message),
      LuaError::MemoryError(message) => Self::new(FailureKind::Memory, message.clone()),
      LuaError::CallbackError { traceback, cause } => {
        let mut inner = Self::from_lua_error(cause);
        if inner.kind == FailureKind::Other {
          inner.kind = FailureKind::Callback;
        }
        // The outermost traceback covers the whole Lua stack.
        inner.traceback = Some(traceback.clone());
        inner
      }
      LuaError::WithContext { context, cause } => {
        let mut inner = Self::from_lua_error(cause);
        inner.message = format!("{}: {}", context, inner.message);
        inner
      }
      other => Self::new(FailureKind::Other, other.to_string()),
    }
  }

  /// Split a message that already carries `stack traceback:` into its parts.
  fn with_embedded_traceback(kind: FailureKind, raw: &str) -> Self {
    match raw.find(TRACEBACK_MARKER) {
      Some(at) => Self {
        kind,
        message: raw[..at].trim_end().to_string(),
        traceback: Some(raw[at..].trim_end().to_string()),
      },
      None => Self::new(kind, raw),
    }
  }

  /// Text written to the output stream, newline terminated.
  pub fn render(&self) -> String {
    let mut out = format!("{} error: {}\n", self.kind, self.message);
    if let Some(traceback) = &self.traceback {
      out.push_str(traceback.trim_end());
      out.push('\n');
    }
    out
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} error: {}", self.kind, self.message)
  }
}
