//! Identifiers for persisted entities
//!
//! Messages and citations are keyed by UUIDv7 values so that identifiers sort
//! chronologically and can be minted without coordinating with the store.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its hyphenated UUID form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid UUID string: {}", e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Milliseconds since the Unix epoch encoded in the UUIDv7
            pub fn timestamp(&self) -> u64 {
                (self.0 >> 80) as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_string(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a persisted chat message
    MessageId
);

uuid_id!(
    /// Identifier of a persisted citation record
    CitationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_ordering() {
        let id1 = MessageId::from_value(1000);
        let id2 = MessageId::from_value(2000);

        assert!(id1 < id2);
    }

    #[test]
    fn test_ids_are_chronological() {
        let id1 = CitationId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = CitationId::new();

        assert!(id1 < id2);
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_display_and_parse() {
        let id = MessageId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);
        assert_eq!(MessageId::from_string(&id_str).unwrap(), id);
    }

    #[test]
    fn test_invalid_string() {
        assert!(MessageId::from_string("not-a-valid-uuid").is_err());
        assert!(CitationId::from_string("").is_err());
    }

    #[test]
    fn test_serializes_as_uuid_string() {
        let id = CitationId::new();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{}\"", id));
        let back: CitationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_ordering_matches_value(a: u128, b: u128) {
            let id_a = MessageId::from_value(a);
            let id_b = MessageId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        #[test]
        fn test_string_roundtrip(value: u128) {
            let id = CitationId::from_value(value);
            match CitationId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
