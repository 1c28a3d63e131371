//! Namespace-bound `load`, `loadfile` and `dofile`.
//!
//! The stock loaders compile into the base globals when no environment is
//! passed, which would let `load('x = 1')()` leak `x` into later runs. Each
//! namespace gets its own copies that default to the namespace instead.
//!
//! The wrappers are Lua closures built by a factory compiled once per runtime.
//! They hold the namespace as an upvalue, so a finished namespace stays
//! collectable.

use mlua::prelude::*;

const FACTORY_KEY: &str = "luashim.loaders";

const FACTORY_SOURCE: &str = r##"
local env, load, loadfile = ...

local function ns_load(chunk, chunkname, mode, ...)
  if select("#", ...) > 0 then
    return load(chunk, chunkname, mode, ...)
  end
  return load(chunk, chunkname, mode, env)
end

local function ns_loadfile(filename, mode, ...)
  if filename == nil then
    error("loadfile: reading a chunk from stdin is not supported", 2)
  end
  if select("#", ...) > 0 then
    return loadfile(filename, mode, ...)
  end
  return loadfile(filename, mode, env)
end

local function ns_dofile(filename)
  if filename == nil then
    error("dofile: reading a chunk from stdin is not supported", 2)
  end
  local chunk, err = loadfile(filename, "bt", env)
  if chunk == nil then
    error(err, 2)
  end
  return chunk()
end

return ns_load, ns_loadfile, ns_dofile
"##;

/// Compile the loader factory and keep it in the registry.
///
/// Must run before any snippet can replace the base `load`/`loadfile`.
pub fn register_loader_factory(lua: &Lua) -> LuaResult<()> {
  let factory = lua.load(FACTORY_SOURCE).set_name("=luashim.loaders").into_function()?;
  let globals = lua.globals();
  let load: LuaFunction = globals.get("load")?;
  let loadfile: LuaFunction = globals.get("loadfile")?;
  let bound = lua.create_table()?;
  bound.set("factory", factory)?;
  bound.set("load", load)?;
  bound.set("loadfile", loadfile)?;
  lua.set_named_registry_value(FACTORY_KEY, bound)
}

/// Install `load`, `loadfile` and `dofile` in `env`, defaulting their
/// environment to `env`. An explicit `env` argument is passed through.
pub fn install_namespace_loaders(lua: &Lua, env: &LuaTable) -> LuaResult<()> {
  let bound = match lua.named_registry_value::<Option<LuaTable>>(FACTORY_KEY)? {
    Some(bound) => bound,
    None => {
      register_loader_factory(lua)?;
      lua.named_registry_value::<LuaTable>(FACTORY_KEY)?
    }
  };
  let factory: LuaFunction = bound.get("factory")?;
  let load: LuaFunction = bound.get("load")?;
  let loadfile: LuaFunction = bound.get("loadfile")?;

  let (ns_load, ns_loadfile, ns_dofile): (LuaFunction, LuaFunction, LuaFunction) =
    factory.call((env.clone(), load, loadfile))?;
  env.raw_set("load", ns_load)?;
  env.raw_set("loadfile", ns_loadfile)?;
  env.raw_set("dofile", ns_dofile)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn namespace(lua: &Lua) -> LuaResult<LuaTable> {
    register_loader_factory(lua)?;
    let env = lua.create_table()?;
    let mt = lua.create_table()?;
    mt.set("__index", lua.globals())?;
    env.set_metatable(Some(mt))?;
    install_namespace_loaders(lua, &env)?;
    Ok(env)
  }

  #[test]
  fn load_defaults_to_the_namespace() -> LuaResult<()> {
    let lua = Lua::new();
    let env = namespace(&lua)?;
    lua.load("load('leak = 1')()").set_environment(env.clone()).exec()?;

    assert_eq!(env.raw_get::<i64>("leak")?, 1);
    assert!(lua.globals().raw_get::<LuaValue>("leak")?.is_nil());
    Ok(())
  }

  #[test]
  fn load_from_a_reader_function_stays_local() -> LuaResult<()> {
    let lua = Lua::new();
    let env = namespace(&lua)?;
    lua
      .load(
        r#"
        local parts = { "pieces ", "= 2" }
        local i = 0
        load(function() i = i + 1; return parts[i] end)()
        "#,
      )
      .set_environment(env.clone())
      .exec()?;

    assert_eq!(env.raw_get::<i64>("pieces")?, 2);
    assert!(lua.globals().raw_get::<LuaValue>("pieces")?.is_nil());
    Ok(())
  }

  #[test]
  fn explicit_env_is_respected() -> LuaResult<()> {
    let lua = Lua::new();
    let env = namespace(&lua)?;
    let value: i64 = lua
      .load("local t = {} load('y = 3', 'chunk', 't', t)() return t.y")
      .set_environment(env.clone())
      .eval()?;

    assert_eq!(value, 3);
    assert!(env.raw_get::<LuaValue>("y")?.is_nil());
    Ok(())
  }

  #[test]
  fn dofile_and_loadfile_run_in_the_namespace() -> LuaResult<()> {
    let lua = Lua::new();
    let env = namespace(&lua)?;
    let mut file = tempfile::NamedTempFile::new().map_err(LuaError::external)?;
    writeln!(file, "from_file = (from_file or 0) + 1\nreturn from_file").map_err(LuaError::external)?;
    let path = file.path().to_string_lossy().into_owned();
    env.raw_set("path", path)?;

    let (first, second): (i64, i64) = lua
      .load("return dofile(path), loadfile(path)()")
      .set_environment(env.clone())
      .eval()?;

    assert_eq!((first, second), (1, 2));
    assert!(lua.globals().raw_get::<LuaValue>("from_file")?.is_nil());
    Ok(())
  }

  #[test]
  fn dofile_without_a_name_is_rejected() -> LuaResult<()> {
    let lua = Lua::new();
    let env = namespace(&lua)?;
    let err = lua.load("dofile()").set_environment(env).exec().unwrap_err();
    assert!(err.to_string().contains("reading a chunk from stdin is not supported"));
    Ok(())
  }
}
