//! Stream-facing Lua globals.
//!
//! Replaces the parts of the standard library that talk to the process streams:
//! - `print(...)` - writes to the bound output
//! - `io.write(...)`, `io.read(...)`, `io.flush()` - go through the bound streams
//! - `io.lines()` - iterates the bound input; `io.lines(filename)` is stock
//! - `io.output()`, `io.input()` - return the standard handles and cannot be switched
//! - `io.stdout`, `io.stderr`, `io.stdin` - [`StreamHandle`] userdata
//! - `input([prompt])` - prompted line read, installed once a line source is bound

use std::rc::Rc;

use mlua::prelude::*;

use super::handles::{StreamHandle, StreamKind, lines_iterator};
use crate::streams::Streams;

/// Coerce a Lua value to text the way `tostring` does. Nil stays absent.
pub fn to_text(lua: &Lua, value: LuaValue) -> LuaResult<Option<String>> {
  match value {
    LuaValue::Nil => Ok(None),
    LuaValue::String(s) => Ok(Some(s.to_string_lossy())),
    other => {
      let tostring: LuaFunction = lua.globals().get("tostring")?;
      let s: LuaString = tostring.call(other)?;
      Ok(Some(s.to_string_lossy()))
    }
  }
}

/// Register `print` and the `io` overrides in the base globals.
pub fn register_stream_globals(lua: &Lua, streams: Rc<Streams>) -> LuaResult<()> {
  let globals = lua.globals();

  let print_streams = streams.clone();
  let print = lua.create_function(move |lua, values: LuaMultiValue| {
    let mut line = String::new();
    for (i, value) in values.into_iter().enumerate() {
      if i > 0 {
        line.push('\t');
      }
      // tostring(nil) is "nil" for print, unlike io.write
      match value {
        LuaValue::Nil => line.push_str("nil"),
        value => line.push_str(&to_text(lua, value)?.unwrap_or_default()),
      }
    }
    line.push('\n');
    print_streams.output().write(Some(&line));
    Ok(())
  })?;
  globals.set("print", print)?;

  let io: LuaTable = globals.get("io")?;
  let stdout = lua.create_userdata(StreamHandle::new(streams.clone(), StreamKind::Output))?;
  let stderr = lua.create_userdata(StreamHandle::new(streams.clone(), StreamKind::Error))?;
  let stdin = lua.create_userdata(StreamHandle::new(streams.clone(), StreamKind::Input))?;

  let write_target = stdout.clone();
  let write = lua.create_function(move |lua, values: LuaMultiValue| {
    write_target.borrow::<StreamHandle>()?.write_values(lua, values)?;
    Ok(write_target.clone())
  })?;
  io.set("write", write)?;

  let read_source = stdin.clone();
  let read = lua.create_function(move |lua, formats: LuaMultiValue| {
    read_source.borrow::<StreamHandle>()?.read_values(lua, formats)
  })?;
  io.set("read", read)?;

  let stock_lines: LuaFunction = io.get("lines")?;
  let lines_source = stdin.clone();
  let lines = lua.create_function(move |lua, args: LuaMultiValue| {
    let mut args = args.into_iter();
    match args.next() {
      None | Some(LuaValue::Nil) => {
        let iter = lines_iterator(lua, lines_source.clone(), args.collect())?;
        Ok(LuaMultiValue::from_iter([LuaValue::Function(iter)]))
      }
      Some(filename) => stock_lines.call::<LuaMultiValue>(LuaMultiValue::from_iter(std::iter::once(filename).chain(args))),
    }
  })?;
  io.set("lines", lines)?;

  io.set("output", default_handle(lua, "output", stdout.clone())?)?;
  io.set("input", default_handle(lua, "input", stdin.clone())?)?;

  let flush_streams = streams;
  io.set(
    "flush",
    lua.create_function(move |_, ()| {
      flush_streams.output().flush();
      Ok(())
    })?,
  )?;

  io.set("stdout", stdout)?;
  io.set("stderr", stderr)?;
  io.set("stdin", stdin)?;

  Ok(())
}

/// `io.output`/`io.input`: with no argument, the standard handle. A standard
/// handle argument is returned as is. Files cannot become the default.
fn default_handle(lua: &Lua, name: &'static str, handle: LuaAnyUserData) -> LuaResult<LuaFunction> {
  lua.create_function(move |_, file: LuaValue| match file {
    LuaValue::Nil => Ok(handle.clone()),
    LuaValue::UserData(ud) if ud.is::<StreamHandle>() => Ok(ud),
    _ => Err(LuaError::runtime(format!(
      "io.{name}: only the standard streams can be the default {name}"
    ))),
  })
}

/// Install the prompted-read global `input([prompt])`.
///
/// A non-empty prompt is written to the output before the read blocks. The
/// returned line has exactly one trailing newline removed.
pub fn register_input(lua: &Lua, streams: Rc<Streams>) -> LuaResult<()> {
  let input = lua.create_function(move |lua, prompt: Option<LuaValue>| {
    let prompt = match prompt {
      Some(value) => to_text(lua, value)?,
      None => None,
    };
    Ok(streams.prompt(prompt.as_deref()))
  })?;
  lua.globals().set("input", input)
}
