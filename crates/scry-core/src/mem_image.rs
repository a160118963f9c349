use crate::fault::Fault;
use crate::image::Image;
use crate::types::{FieldValue, TypeTag, TypedHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One object in a snapshot: its type tag, named fields, and (for
/// array-shaped objects such as bucket tables) indexed slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    #[serde(rename = "type")]
    pub tag: TypeTag,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub elements: Vec<FieldValue>,
}

impl ObjectSpec {
    #[must_use]
    pub fn new(tag: impl Into<TypeTag>) -> Self {
        Self {
            tag: tag.into(),
            fields: BTreeMap::new(),
            elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn elements(mut self, elements: Vec<FieldValue>) -> Self {
        self.elements = elements;
        self
    }
}

/// Deterministic in-memory image, loadable from a JSON snapshot.
///
/// Stands in for a live-process or core reader wherever one is not
/// available: CLI demos, fixtures, and every test in this workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemImage {
    #[serde(default)]
    symbols: BTreeMap<String, u64>,
    #[serde(default)]
    objects: BTreeMap<u64, ObjectSpec>,
}

impl MemImage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, Fault> {
        serde_json::from_str(raw).map_err(|e| Fault(format!("invalid image snapshot: {e}")))
    }

    pub fn insert(&mut self, addr: u64, object: ObjectSpec) -> TypedHandle {
        let handle = TypedHandle::new(addr, object.tag.clone());
        self.objects.insert(addr, object);
        handle
    }

    pub fn bind_symbol(&mut self, name: &str, addr: u64) {
        self.symbols.insert(name.to_string(), addr);
    }

    fn object(&self, handle: &TypedHandle) -> Result<&ObjectSpec, Fault> {
        let object = self
            .objects
            .get(&handle.addr)
            .ok_or_else(|| Fault(format!("no object at {:#x}", handle.addr)))?;
        if object.tag != handle.tag {
            return Err(Fault(format!(
                "object at {:#x} is {}, handle claims {}",
                handle.addr, object.tag, handle.tag
            )));
        }
        Ok(object)
    }
}

impl Image for MemImage {
    fn field(&self, handle: &TypedHandle, name: &str) -> Result<FieldValue, Fault> {
        let object = self.object(handle)?;
        object
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| Fault(format!("{} has no field '{}'", handle, name)))
    }

    fn element(&self, handle: &TypedHandle, index: u64) -> Result<FieldValue, Fault> {
        let object = self.object(handle)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| object.elements.get(i))
            .cloned()
            .ok_or_else(|| {
                Fault(format!(
                    "slot {} out of bounds for {} ({} slots)",
                    index,
                    handle,
                    object.elements.len()
                ))
            })
    }

    fn symbol(&self, name: &str) -> Result<TypedHandle, Fault> {
        let addr = *self
            .symbols
            .get(name)
            .ok_or_else(|| Fault(format!("unknown symbol '{name}'")))?;
        let object = self
            .objects
            .get(&addr)
            .ok_or_else(|| Fault(format!("symbol '{name}' points at nothing ({addr:#x})")))?;
        Ok(TypedHandle::new(addr, object.tag.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageExt;

    fn sample() -> MemImage {
        let mut img = MemImage::new();
        img.insert(
            0x10,
            ObjectSpec::new("node_t")
                .field("value", FieldValue::Int(7))
                .field("label", FieldValue::Text("head".to_string()))
                .field("next", FieldValue::Absent),
        );
        img.insert(
            0x20,
            ObjectSpec::new("table_t").elements(vec![
                FieldValue::Handle(TypedHandle::new(0x10, "node_t")),
                FieldValue::Absent,
            ]),
        );
        img.bind_symbol("the_table", 0x20);
        img
    }

    #[test]
    fn symbol_resolves_to_typed_handle() {
        let img = sample();
        let h = img.symbol("the_table").expect("symbol");
        assert_eq!(h.addr, 0x20);
        assert_eq!(h.tag, TypeTag::new("table_t"));
    }

    #[test]
    fn unknown_symbol_is_a_fault() {
        let err = sample().symbol("nope").expect_err("unknown symbol");
        assert!(err.0.contains("unknown symbol 'nope'"));
    }

    #[test]
    fn typed_field_access() {
        let img = sample();
        let node = TypedHandle::new(0x10, "node_t");
        assert_eq!(img.field_int(&node, "value").expect("int"), 7);
        assert_eq!(img.field_text(&node, "label").expect("text"), "head");
        assert_eq!(img.field_handle(&node, "next").expect("handle"), None);
    }

    #[test]
    fn wrong_kind_is_a_fault() {
        let img = sample();
        let node = TypedHandle::new(0x10, "node_t");
        let err = img.field_int(&node, "label").expect_err("kind mismatch");
        assert!(err.0.contains("expected int"));
    }

    #[test]
    fn stale_tag_is_a_fault() {
        let img = sample();
        let lying = TypedHandle::new(0x10, "other_t");
        let err = img.field(&lying, "value").expect_err("tag check");
        assert!(err.0.contains("handle claims other_t"));
    }

    #[test]
    fn element_walks_slots_and_bounds() {
        let img = sample();
        let table = img.symbol("the_table").expect("symbol");
        let first = img.element_handle(&table, 0).expect("slot 0");
        assert_eq!(first.expect("occupied").addr, 0x10);
        assert_eq!(img.element_handle(&table, 1).expect("slot 1"), None);
        let err = img.element(&table, 2).expect_err("out of bounds");
        assert!(err.0.contains("out of bounds"));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let raw = r#"{
            "symbols": { "the_table": 32 },
            "objects": {
                "16": {
                    "type": "node_t",
                    "fields": {
                        "value": { "int": 7 },
                        "label": { "text": "head" },
                        "next": "absent"
                    }
                },
                "32": {
                    "type": "table_t",
                    "elements": [ { "handle": { "addr": 16, "tag": "node_t" } }, "absent" ]
                }
            }
        }"#;
        let img = MemImage::from_json(raw).expect("parse snapshot");
        assert_eq!(img, sample());
    }

    #[test]
    fn unknown_snapshot_keys_are_rejected() {
        let err = MemImage::from_json(r#"{ "symbols": {}, "extra": 1 }"#).expect_err("deny");
        assert!(err.0.contains("invalid image snapshot"));
    }
}
