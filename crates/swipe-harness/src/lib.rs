#![forbid(unsafe_code)]

//! Trace replay and config tooling for [`swipe_core`].

pub mod cli;
pub mod error;
pub mod logging;
pub mod replay;
pub mod trace;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
pub use replay::{ReplayReport, ReplaySummary, StepReport, replay};
pub use trace::{SCHEMA_VERSION, TraceFile, TraceRecord, TraceWriter};
