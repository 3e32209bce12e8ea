//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a chart entry.
///
/// Charts mix numeric ids (people) and named ids (departments, e.g. `"DIRETORIA"`).
/// `Num(1)` and `Name("1")` are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Num(i64),
    Name(String),
}

impl NodeId {
    /// Interpret user input: integers become `Num`, everything else `Name`.
    pub fn from_input(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => NodeId::Num(n),
            Err(_) => NodeId::Name(trimmed.to_string()),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, NodeId::Name(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Num(n) => write!(f, "{}", n),
            NodeId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for NodeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_input(s))
    }
}

impl From<i64> for NodeId {
    fn from(n: i64) -> Self {
        NodeId::Num(n)
    }
}

impl From<i32> for NodeId {
    fn from(n: i32) -> Self {
        NodeId::Num(i64::from(n))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Name(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Name(s)
    }
}

/// Opaque display payload (position, email, status, icon, ...).
pub type Attributes = BTreeMap<String, String>;

/// One entry of a chart node list, as supplied by the presentation layer.
///
/// `subordinates` is the ordered child list; it may be omitted for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subordinates: Vec<NodeId>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subordinates: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_subordinates<I, T>(mut self, subordinates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.subordinates = subordinates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
