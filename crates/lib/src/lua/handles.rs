//! `io.stdout`, `io.stderr` and `io.stdin` as Lua userdata over [`Streams`].

use std::rc::Rc;

use mlua::prelude::*;

use super::globals::to_text;
use crate::streams::Streams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
  Output,
  Error,
  Input,
}

impl StreamKind {
  pub fn as_str(self) -> &'static str {
    match self {
      StreamKind::Output => "stdout",
      StreamKind::Error => "stderr",
      StreamKind::Input => "stdin",
    }
  }
}

/// A standard-stream handle. The slot it names is looked up on every call.
pub struct StreamHandle {
  streams: Rc<Streams>,
  kind: StreamKind,
}

impl StreamHandle {
  pub fn new(streams: Rc<Streams>, kind: StreamKind) -> Self {
    Self { streams, kind }
  }

  /// Write each value as its own chunk. Nil values are skipped.
  pub fn write_values(&self, lua: &Lua, values: LuaMultiValue) -> LuaResult<()> {
    let adapter = match self.kind {
      StreamKind::Output => self.streams.output(),
      StreamKind::Error => self.streams.error(),
      StreamKind::Input => return Err(LuaError::runtime("stdin is not writable")),
    };

    for value in values {
      let text = to_text(lua, value)?;
      adapter.write(text.as_deref());
    }
    Ok(())
  }

  /// Read one value per format. Reading stops at the first format that fails,
  /// matching `file:read`.
  pub fn read_values(&self, lua: &Lua, formats: LuaMultiValue) -> LuaResult<LuaMultiValue> {
    if self.kind != StreamKind::Input {
      return Err(LuaError::runtime(format!("{} is not readable", self.kind.as_str())));
    }

    let mut formats: Vec<LuaValue> = formats.into_iter().collect();
    if formats.is_empty() {
      formats.push(LuaValue::String(lua.create_string("l")?));
    }

    let mut results = Vec::with_capacity(formats.len());
    for format in formats {
      let format = ReadFormat::parse(&format)?;
      let value = match self.streams.read_line() {
        Some(line) => format.convert(lua, line)?,
        None => LuaValue::Nil,
      };
      let done = value.is_nil();
      results.push(value);
      if done {
        break;
      }
    }

    Ok(LuaMultiValue::from_iter(results))
  }
}

/// Formats understood by `io.read`. Every format consumes exactly one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFormat {
  /// `"l"`: next line without its newline.
  Line,
  /// `"L"`: next line with its newline.
  LineWithNewline,
  /// `"n"`: next line parsed as a number, nil when it is not one.
  Number,
}

impl ReadFormat {
  fn parse(value: &LuaValue) -> LuaResult<Self> {
    let LuaValue::String(s) = value else {
      return Err(LuaError::runtime("bad argument to 'read' (only line formats are supported)"));
    };
    let spec = s.to_string_lossy();
    match spec.trim_start_matches('*').chars().next() {
      Some('l') => Ok(ReadFormat::Line),
      Some('L') => Ok(ReadFormat::LineWithNewline),
      Some('n') => Ok(ReadFormat::Number),
      _ => Err(LuaError::runtime(format!("bad argument to 'read' (invalid format '{}')", spec))),
    }
  }

  fn convert(self, lua: &Lua, mut line: String) -> LuaResult<LuaValue> {
    match self {
      ReadFormat::Line => {
        if line.ends_with('\n') {
          line.pop();
        }
        Ok(LuaValue::String(lua.create_string(&line)?))
      }
      ReadFormat::LineWithNewline => Ok(LuaValue::String(lua.create_string(&line)?)),
      // Lua's own numeral rules: hex and exponents parse, inf and nan do not.
      ReadFormat::Number => {
        let tonumber: LuaFunction = lua.globals().get("tonumber")?;
        tonumber.call(line.trim())
      }
    }
  }
}

/// An iterator for `for line in io.lines()` over a readable handle.
///
/// Each step reads with the given formats. A bound line source never ends,
/// so loops over it stop only through `break`.
pub fn lines_iterator(lua: &Lua, ud: LuaAnyUserData, formats: LuaMultiValue) -> LuaResult<LuaFunction> {
  let kind = ud.borrow::<StreamHandle>()?.kind;
  if kind != StreamKind::Input {
    return Err(LuaError::runtime(format!("{} is not readable", kind.as_str())));
  }

  let formats: Vec<LuaValue> = formats.into_iter().collect();
  lua.create_function(move |lua, _: LuaMultiValue| {
    let formats = LuaMultiValue::from_iter(formats.iter().cloned());
    ud.borrow::<StreamHandle>()?.read_values(lua, formats)
  })
}

impl LuaUserData for StreamHandle {
  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    // write and flush return the handle so calls chain like on a real file.
    methods.add_function("write", |lua, (ud, values): (LuaAnyUserData, LuaMultiValue)| {
      ud.borrow::<StreamHandle>()?.write_values(lua, values)?;
      Ok(ud)
    });

    methods.add_function("flush", |_, ud: LuaAnyUserData| {
      let handle = ud.borrow::<StreamHandle>()?;
      match handle.kind {
        StreamKind::Output => handle.streams.output().flush(),
        StreamKind::Error => handle.streams.error().flush(),
        StreamKind::Input => {}
      }
      drop(handle);
      Ok(ud)
    });

    methods.add_method("read", |lua, this, formats: LuaMultiValue| this.read_values(lua, formats));

    methods.add_function("lines", |lua, (ud, formats): (LuaAnyUserData, LuaMultiValue)| {
      lines_iterator(lua, ud, formats)
    });

    methods.add_method("setvbuf", |_, _, _: LuaMultiValue| Ok(true));

    methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
      Ok(format!("file ({})", this.kind.as_str()))
    });
  }
}
