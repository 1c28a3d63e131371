//! Fresh per-run namespaces.
//!
//! A namespace is a table used as a chunk's `_ENV`. Reads fall through to the
//! base globals; writes stay in the namespace, so nothing a snippet defines
//! outlives its run. `_G` inside the namespace is the namespace itself, and
//! `load`/`loadfile`/`dofile` compile into it unless given another env.

use mlua::prelude::*;

use super::loaders;
use crate::config::ShimConfig;

/// Create an empty namespace marked with the configured main-entry name.
///
/// With `strict_names`, reading a name found neither in the namespace nor in
/// the base globals raises `name 'x' is not defined`.
pub fn fresh_namespace(lua: &Lua, config: &ShimConfig) -> LuaResult<LuaTable> {
  let env = lua.create_table()?;
  env.set("_NAME", config.chunk_name.as_str())?;
  env.set("_G", env.clone())?;
  loaders::install_namespace_loaders(lua, &env)?;

  let mt = lua.create_table()?;
  if config.strict_names {
    let base = lua.globals();
    let lookup = lua.create_function(move |_, (_env, key): (LuaTable, LuaValue)| {
      let value: LuaValue = base.raw_get(key.clone())?;
      if value.is_nil() {
        if let LuaValue::String(name) = &key {
          return Err(LuaError::runtime(format!(
            "name '{}' is not defined",
            name.to_string_lossy()
          )));
        }
      }
      Ok(value)
    })?;
    mt.set("__index", lookup)?;
  } else {
    mt.set("__index", lua.globals())?;
  }
  env.set_metatable(Some(mt))?;

  Ok(env)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::Diagnostic;

  fn run_in(lua: &Lua, env: &LuaTable, code: &str) -> LuaResult<()> {
    lua.load(code).set_environment(env.clone()).exec()
  }

  #[test]
  fn namespace_carries_main_marker() -> LuaResult<()> {
    let lua = Lua::new();
    let env = fresh_namespace(&lua, &ShimConfig::default())?;
    let name: String = lua.load("return _NAME").set_environment(env).eval()?;
    assert_eq!(name, "__main__");
    Ok(())
  }

  #[test]
  fn definitions_stay_in_the_namespace() -> LuaResult<()> {
    let lua = Lua::new();
    let env = fresh_namespace(&lua, &ShimConfig::default())?;
    run_in(&lua, &env, "x = 1; _G.y = 2; function f() return x end")?;

    assert_eq!(env.raw_get::<i64>("x")?, 1);
    assert_eq!(env.raw_get::<i64>("y")?, 2);
    assert!(lua.globals().raw_get::<LuaValue>("x")?.is_nil());
    assert!(lua.globals().raw_get::<LuaValue>("y")?.is_nil());
    assert!(lua.globals().raw_get::<LuaValue>("f")?.is_nil());
    Ok(())
  }

  #[test]
  fn base_globals_are_visible() -> LuaResult<()> {
    let lua = Lua::new();
    let env = fresh_namespace(&lua, &ShimConfig::default())?;
    let len: i64 = lua.load("return string.len('abc')").set_environment(env).eval()?;
    assert_eq!(len, 3);
    Ok(())
  }

  #[test]
  fn strict_lookup_rejects_unknown_names() -> LuaResult<()> {
    let lua = Lua::new();
    let env = fresh_namespace(&lua, &ShimConfig::default())?;
    let err = run_in(&lua, &env, "local _ = missing").unwrap_err();
    let diagnostic = Diagnostic::from_lua_error(&err);
    assert_eq!(diagnostic.message, "name 'missing' is not defined");
    Ok(())
  }

  #[test]
  fn nested_load_writes_to_the_namespace() -> LuaResult<()> {
    let lua = Lua::new();
    let env = fresh_namespace(&lua, &ShimConfig::default())?;
    run_in(&lua, &env, "load('nested = 1')()")?;

    assert_eq!(env.raw_get::<i64>("nested")?, 1);
    assert!(lua.globals().raw_get::<LuaValue>("nested")?.is_nil());
    Ok(())
  }

  #[test]
  fn lenient_lookup_yields_nil() -> LuaResult<()> {
    let lua = Lua::new();
    let config = ShimConfig::default().with_strict_names(false);
    let env = fresh_namespace(&lua, &config)?;
    let missing: bool = lua.load("return missing == nil").set_environment(env).eval()?;
    assert!(missing);
    Ok(())
  }
}
