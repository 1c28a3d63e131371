//! Lua runtime and stream bindings.
//!
//! # Submodules
//!
//! - [`globals`] - `print`, `io.*` and `input` wired to the stream context
//! - [`handles`] - `io.stdout`/`io.stderr`/`io.stdin` userdata
//! - [`loaders`] - namespace-bound `load`/`loadfile`/`dofile`
//! - [`namespace`] - fresh per-run environments
//! - [`runtime`] - Lua VM creation

pub mod globals;
pub mod handles;
pub mod loaders;
pub mod namespace;
pub mod runtime;
