use crate::fault::Fault;
use crate::types::{FieldValue, TypeTag, TypedHandle};

/// Read-only introspection boundary over a target image.
///
/// The engine behind this trait owns field navigation, primitive
/// decoding, and symbol resolution. Implementations must be stateless
/// across calls so a single image can back every stage of a pipeline.
pub trait Image {
    /// Dereference `handle` and read the named field.
    fn field(&self, handle: &TypedHandle, name: &str) -> Result<FieldValue, Fault>;

    /// Read one slot of an array-shaped object (bucket tables).
    fn element(&self, handle: &TypedHandle, index: u64) -> Result<FieldValue, Fault>;

    /// Resolve a named global symbol to the handle rooted at it.
    fn symbol(&self, name: &str) -> Result<TypedHandle, Fault>;
}

/// Typed field accessors over any [`Image`].
pub trait ImageExt: Image {
    fn field_int(&self, handle: &TypedHandle, name: &str) -> Result<i64, Fault> {
        match self.field(handle, name)? {
            FieldValue::Int(v) => Ok(v),
            other => Err(Fault(format!(
                "field '{}' of {} is {}, expected int",
                name,
                handle,
                other.kind()
            ))),
        }
    }

    fn field_text(&self, handle: &TypedHandle, name: &str) -> Result<String, Fault> {
        match self.field(handle, name)? {
            FieldValue::Text(v) => Ok(v),
            other => Err(Fault(format!(
                "field '{}' of {} is {}, expected text",
                name,
                handle,
                other.kind()
            ))),
        }
    }

    /// Follow a relation; `Ok(None)` when the relation is absent.
    fn field_handle(
        &self,
        handle: &TypedHandle,
        name: &str,
    ) -> Result<Option<TypedHandle>, Fault> {
        match self.field(handle, name)? {
            FieldValue::Handle(h) => Ok(Some(h)),
            FieldValue::Absent => Ok(None),
            other => Err(Fault(format!(
                "field '{}' of {} is {}, expected handle",
                name,
                handle,
                other.kind()
            ))),
        }
    }

    /// Array slot as an optional handle; `Ok(None)` for empty slots.
    fn element_handle(
        &self,
        handle: &TypedHandle,
        index: u64,
    ) -> Result<Option<TypedHandle>, Fault> {
        match self.element(handle, index)? {
            FieldValue::Handle(h) => Ok(Some(h)),
            FieldValue::Absent => Ok(None),
            other => Err(Fault(format!(
                "slot {} of {} is {}, expected handle",
                index,
                handle,
                other.kind()
            ))),
        }
    }
}

impl<T: Image + ?Sized> ImageExt for T {}
