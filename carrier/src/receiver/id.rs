//! Receiver identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a connected remote endpoint.
///
/// Ids are supplied by the transport layer at connection time (e.g. a
/// connection id from a WebSocket hub) and are treated as opaque strings by
/// the core. Ids are unique per connected endpoint for the lifetime of the
/// connection.
///
/// # Example
///
/// ```rust,ignore
/// let id = ReceiverId::new("conn-42");
/// registry.add_receiver(id.clone());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReceiverId(String);

impl ReceiverId {
    /// Create a new receiver id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReceiverId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ReceiverId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips() {
        let id = ReceiverId::new("conn-1");
        assert_eq!(id.to_string(), "conn-1");
        assert_eq!(id.as_str(), "conn-1");
    }

    #[test]
    fn orders_lexicographically() {
        let mut ids = vec![
            ReceiverId::from("c"),
            ReceiverId::from("a"),
            ReceiverId::from("b"),
        ];
        ids.sort();
        assert_eq!(ids, vec!["a".into(), "b".into(), "c".into()]);
    }
}
