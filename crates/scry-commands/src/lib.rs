#![forbid(unsafe_code)]
//! The built-in command set.
//!
//! Commands live behind descriptors and reach the engine only through
//! [`builtin_registry`], the single startup-phase registration point.

mod dbuf;
pub mod fixtures;
mod help;
pub mod names;

pub use dbuf::DBUF_TYPE;

use scry_pipeline::{PipelineError, Registry};

/// Register every built-in command. Called once at session startup;
/// a conflict here is a packaging defect, not a user error.
pub fn builtin_registry() -> Result<Registry, PipelineError> {
    let mut registry = Registry::new();
    registry.register(help::descriptor())?;
    registry.register(dbuf::descriptor())?;
    Ok(registry)
}

pub const CRATE_NAME: &str = "scry-commands";
