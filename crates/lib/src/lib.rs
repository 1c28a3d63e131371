//! luashim-lib: redirect an embedded Lua interpreter's standard streams to host
//! capabilities and run snippets behind an absorbing failure boundary.
//!
//! - [`Shim`]: one Lua state plus its stream bindings (`hook_io`, `run_code`)
//! - [`streams`]: the [`Sink`]/[`LineSource`] capabilities and their adapters
//! - [`exec`]: snippet execution and the tagged [`Outcome`]
//! - [`config`]: environment-driven settings

pub mod config;
pub mod consts;
pub mod error;
pub mod exec;
pub mod lua;
pub mod shim;
pub mod streams;

pub use config::ShimConfig;
pub use error::{ShimError, SinkError, SourceError};
pub use exec::{Diagnostic, FailureKind, Outcome};
pub use shim::{Shim, ShimBuilder};
pub use streams::{LineSource, Sink, Streams};
