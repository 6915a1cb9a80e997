//! Catalog and session identity types.
//!
//! Catalog identifiers are stable strings authored in the catalog file.
//! They are wrapped in distinct newtypes so a category id can never be
//! passed where an option id is expected.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Identifier of an assessment category (e.g. `breathing`).
    CategoryId
);

string_id!(
    /// Identifier of an answer option, unique within its category.
    OptionId
);

string_id!(
    /// Identifier of a risk band (e.g. `urgent`).
    BandId
);

/// Session ID for correlating one assessment run in logs and handoffs.
///
/// Format: `vt-YYYYMMDD-HHMMSS-XXXX`
/// Example: `vt-20260115-143022-a7xq`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new session ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let suffix = generate_base32_suffix();
        SessionId(format!(
            "vt-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            suffix
        ))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut value = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);
    value &= 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut out = String::with_capacity(4);
    for shift in [15_u32, 10, 5, 0] {
        let idx = ((value >> shift) & 0x1F) as usize;
        out.push(alphabet[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_session_id_format() {
        let sid = SessionId::new().to_string();
        let parts: Vec<&str> = sid.split('-').collect();
        assert_eq!(sid.len(), 23);
        assert_eq!(parts[0], "vt");
        assert!(parts[1].len() == 8 && parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].len() == 6 && parts[2].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[3].chars().all(|c| matches!(c, 'a'..='z' | '2'..='7')));
    }

    #[test]
    fn test_session_ids_are_distinct() {
        let ids: std::collections::HashSet<String> =
            (0..32).map(|_| SessionId::new().to_string()).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_string_ids_compare_with_str() {
        let id = CategoryId::from("breathing");
        assert_eq!(id, "breathing");
        assert_eq!(id.as_str(), "breathing");
        assert_eq!(id.to_string(), "breathing");
    }

    #[test]
    fn test_string_ids_borrow_for_map_lookup() {
        let mut map = BTreeMap::new();
        map.insert(OptionId::from("normal"), 0u32);
        assert_eq!(map.get("normal"), Some(&0));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&BandId::from("urgent")).unwrap();
        assert_eq!(json, r#""urgent""#);
    }
}
