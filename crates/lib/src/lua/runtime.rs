use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;

use crate::config::ShimConfig;
use crate::lua::{globals, loaders};
use crate::streams::Streams;

/// Create a Lua runtime whose standard streams go through `streams`.
///
/// The memory limit, if any, is applied after the globals are registered so a
/// tight limit cannot starve setup.
pub fn create_runtime(streams: Rc<Streams>, config: &ShimConfig) -> LuaResult<Lua> {
  let lua = Lua::new();

  globals::register_stream_globals(&lua, streams)?;
  loaders::register_loader_factory(&lua)?;

  if let Some(limit) = config.memory_limit {
    lua.set_memory_limit(limit)?;
    debug!(limit, "interpreter memory limit set");
  }

  Ok(lua)
}
