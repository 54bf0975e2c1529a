//! Node identifiers for the consistent hash ring.
//!
//! A node is identified by an opaque string, usually the dial address of the
//! backend it stands for. The ring never interprets the contents.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a node participating in the ring.
///
/// Ordering is plain string ordering; it is used to break ties when two
/// virtual nodes land on the same token.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Construct an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for NodeId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display_is_raw() {
        let id = NodeId::from("10.0.0.1:9091");
        assert_eq!(id.to_string(), "10.0.0.1:9091");
        assert_eq!(id, "10.0.0.1:9091");
    }

    #[test]
    fn test_node_id_ordering_is_lexicographic() {
        assert!(NodeId::from("a:1") < NodeId::from("b:1"));
        assert!(NodeId::from("a:10") < NodeId::from("a:9"));
    }
}
