#![forbid(unsafe_code)]
//! Typed-handle model and the introspection boundary.
//!
//! Everything the pipeline engine knows about a target image goes
//! through the [`Image`] trait: named-field dereference, array-slot
//! access, and global-symbol lookup. Handles are opaque; this crate
//! never fabricates one on behalf of a command.

mod fault;
mod image;
mod mem_image;
mod types;

pub use fault::{ExitCode, Fault};
pub use image::{Image, ImageExt};
pub use mem_image::{MemImage, ObjectSpec};
pub use types::{FieldValue, TypeTag, TypedHandle};

pub const CRATE_NAME: &str = "scry-core";
