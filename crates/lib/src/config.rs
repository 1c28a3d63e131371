//! Shim configuration.
//!
//! Every setting has a default and can be overridden through a `LUASHIM_*`
//! environment variable. Malformed values are ignored with a warning.

use tracing::warn;

use crate::consts::{MAIN_CHUNK_NAME, MEMORY_LIMIT_ENV, STRICT_NAMES_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
  /// Chunk name used for diagnostics and the `_NAME` marker of every namespace.
  pub chunk_name: String,
  /// Upper bound on interpreter memory, in bytes. `None` means unlimited.
  pub memory_limit: Option<usize>,
  /// Raise `name 'x' is not defined` when a snippet reads an unknown name.
  pub strict_names: bool,
}

impl Default for ShimConfig {
  fn default() -> Self {
    Self {
      chunk_name: MAIN_CHUNK_NAME.to_string(),
      memory_limit: None,
      strict_names: true,
    }
  }
}

impl ShimConfig {
  /// Build a config from the defaults plus any `LUASHIM_*` overrides.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(raw) = std::env::var(MEMORY_LIMIT_ENV) {
      match raw.trim().parse::<usize>() {
        Ok(0) => config.memory_limit = None,
        Ok(limit) => config.memory_limit = Some(limit),
        Err(_) => warn!(var = MEMORY_LIMIT_ENV, value = %raw, "ignoring invalid memory limit"),
      }
    }

    if let Ok(raw) = std::env::var(STRICT_NAMES_ENV) {
      match parse_flag(&raw) {
        Some(flag) => config.strict_names = flag,
        None => warn!(var = STRICT_NAMES_ENV, value = %raw, "ignoring invalid flag"),
      }
    }

    config
  }

  pub fn with_memory_limit(mut self, limit: Option<usize>) -> Self {
    self.memory_limit = limit;
    self
  }

  pub fn with_strict_names(mut self, strict: bool) -> Self {
    self.strict_names = strict;
    self
  }
}

fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn defaults() {
    let config = ShimConfig::default();
    assert_eq!(config.chunk_name, "__main__");
    assert_eq!(config.memory_limit, None);
    assert!(config.strict_names);
  }

  #[test]
  #[serial]
  fn from_env_reads_overrides() {
    temp_env::with_vars(
      [(MEMORY_LIMIT_ENV, Some("1048576")), (STRICT_NAMES_ENV, Some("off"))],
      || {
        let config = ShimConfig::from_env();
        assert_eq!(config.memory_limit, Some(1_048_576));
        assert!(!config.strict_names);
      },
    );
  }

  #[test]
  #[serial]
  fn from_env_ignores_garbage() {
    temp_env::with_vars(
      [(MEMORY_LIMIT_ENV, Some("lots")), (STRICT_NAMES_ENV, Some("maybe"))],
      || {
        assert_eq!(ShimConfig::from_env(), ShimConfig::default());
      },
    );
  }

  #[test]
  #[serial]
  fn zero_memory_limit_means_unlimited() {
    temp_env::with_var(MEMORY_LIMIT_ENV, Some("0"), || {
      assert_eq!(ShimConfig::from_env().memory_limit, None);
    });
  }

  #[test]
  #[serial]
  fn from_env_without_vars_is_default() {
    temp_env::with_vars_unset([MEMORY_LIMIT_ENV, STRICT_NAMES_ENV], || {
      assert_eq!(ShimConfig::from_env(), ShimConfig::default());
    });
  }
}
