#![forbid(unsafe_code)]
//! The command-pipeline engine.
//!
//! Commands register once during startup, pipelines are parsed and
//! validated in full before a single object is pulled, and execution is
//! strictly demand-driven: the terminal stage pulls from its upstream
//! one handle at a time, so a pipeline over a table with millions of
//! entries never materializes more than the element in flight.

mod command;
mod descriptor;
mod error;
mod help;
mod options;
mod pipeline;
mod registry;

pub use command::{Command, CommandInstance, ExecContext, ObjectStream};
pub use descriptor::{BuildFn, Capability, CapabilitySet, CommandDescriptor};
pub use error::PipelineError;
pub use help::{describe, listing, summary_line};
pub use options::{OptKind, OptSpec, OptionSchema, PositionalSpec};
pub use pipeline::{execute_line, Pipeline};
pub use registry::Registry;

pub const CRATE_NAME: &str = "scry-pipeline";
