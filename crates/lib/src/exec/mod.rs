//! Snippet execution.
//!
//! [`execute`] runs one snippet in a fresh namespace and returns a tagged
//! [`Outcome`]. It never returns an error: every failure inside the snippet,
//! including a malformed source, becomes [`Outcome::Failed`].

mod diagnostic;

use mlua::prelude::*;
use serde::Serialize;
use tracing::debug;

pub use diagnostic::{Diagnostic, FailureKind};

use crate::config::ShimConfig;
use crate::lua::namespace::fresh_namespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "diagnostic", rename_all = "lowercase")]
pub enum Outcome {
  Completed,
  Failed(Diagnostic),
}

impl Outcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, Outcome::Completed)
  }

  pub fn diagnostic(&self) -> Option<&Diagnostic> {
    match self {
      Outcome::Completed => None,
      Outcome::Failed(diagnostic) => Some(diagnostic),
    }
  }
}

/// Compile and run `source` as a top-level chunk against a new namespace.
///
/// The chunk is run with statement semantics; a bare expression is a syntax
/// error, as in a script file.
pub fn execute(lua: &Lua, source: &str, config: &ShimConfig) -> Outcome {
  debug!(len = source.len(), "running snippet");

  let result = fresh_namespace(lua, config).and_then(|env| {
    lua
      .load(source)
      .set_name(format!("={}", config.chunk_name))
      .set_environment(env)
      .exec()
  });

  match result {
    Ok(()) => {
      debug!("snippet completed");
      Outcome::Completed
    }
    Err(e) => {
      let diagnostic = Diagnostic::from_lua_error(&e);
      debug!(kind = %diagnostic.kind, message = %diagnostic.message, "snippet failed");
      Outcome::Failed(diagnostic)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(source: &str) -> Outcome {
    let lua = Lua::new();
    execute(&lua, source, &ShimConfig::default())
  }

  #[test]
  fn completes() {
    assert_eq!(run("local x = 1 + 1"), Outcome::Completed);
  }

  #[test]
  fn empty_source_completes() {
    assert!(run("").is_completed());
  }

  #[test]
  fn syntax_error_is_captured() {
    let outcome = run("1/0");
    let diagnostic = outcome.diagnostic().unwrap();
    assert_eq!(diagnostic.kind, FailureKind::Syntax);
  }

  #[test]
  fn integer_division_by_zero_is_captured() {
    let outcome = run("local x = 1 // 0");
    let diagnostic = outcome.diagnostic().unwrap();
    assert_eq!(diagnostic.kind, FailureKind::Runtime);
    assert!(diagnostic.message.contains("n//0"), "{}", diagnostic.message);
  }

  #[test]
  fn error_location_uses_chunk_name() {
    let outcome = run("\nerror('boom')");
    let diagnostic = outcome.diagnostic().unwrap();
    assert!(diagnostic.message.contains("__main__:2: boom"), "{}", diagnostic.message);
  }

  #[test]
  fn runs_do_not_share_top_level_names() {
    let lua = Lua::new();
    let config = ShimConfig::default();
    assert!(execute(&lua, "x = 1", &config).is_completed());

    let outcome = execute(&lua, "print(x)", &config);
    let diagnostic = outcome.diagnostic().unwrap();
    assert!(diagnostic.message.contains("name 'x' is not defined"), "{}", diagnostic.message);
  }

  #[test]
  fn names_defined_through_load_do_not_leak() {
    let lua = Lua::new();
    let config = ShimConfig::default();
    assert!(execute(&lua, "load('leak = 1')()", &config).is_completed());

    let outcome = execute(&lua, "print(leak)", &config);
    let diagnostic = outcome.diagnostic().unwrap();
    assert!(diagnostic.message.contains("name 'leak' is not defined"), "{}", diagnostic.message);
  }

  #[test]
  fn failure_leaves_no_state_behind() {
    let lua = Lua::new();
    let config = ShimConfig::default();
    assert!(!execute(&lua, "y = 2; error('stop')", &config).is_completed());
    assert!(execute(&lua, "local ok = pcall(function() return y end); assert(not ok)", &config).is_completed());
  }

  #[test]
  fn names_defined_earlier_in_a_run_are_visible() {
    assert!(run("local function sq(n) return n * n end; total = sq(3); assert(total == 9)").is_completed());
  }

  #[test]
  fn outcome_serializes_with_status_tag() {
    let json = serde_json::to_value(run("error('x')")).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["diagnostic"]["kind"], "runtime");

    let json = serde_json::to_value(Outcome::Completed).unwrap();
    assert_eq!(json["status"], "completed");
  }
}
