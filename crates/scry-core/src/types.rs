use serde::{Deserialize, Serialize};
use std::fmt;

/// Nominal label for the kind of structure a handle points at.
///
/// Two stream endpoints are exchange-compatible exactly when their tags
/// are equal; there is no subtyping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Address plus type tag. The only thing commands ever hold on to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedHandle {
    pub addr: u64,
    pub tag: TypeTag,
}

impl TypedHandle {
    #[must_use]
    pub fn new(addr: u64, tag: impl Into<TypeTag>) -> Self {
        Self {
            addr,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for TypedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} ({})", self.addr, self.tag)
    }
}

/// Result of dereferencing one field or array slot.
///
/// `Absent` is a present-but-null relation (e.g. the end of a linked
/// chain), not an error; unknown field names are faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Handle(TypedHandle),
    Absent,
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Handle(_) => "handle",
            Self::Absent => "absent",
        }
    }
}
