//! Identifier wrappers for catalog records.
//!
//! Both ids are opaque strings assigned by the remote catalog. Asset ids are
//! URL-safe path-like keys; folder ids are UUID strings, but the panel never
//! relies on their format, so neither wrapper validates its contents.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// Stable identity of a remote asset.
    AssetId
);
define_string_id!(
    /// Identity of a real remote folder. Never `all` or `favorites` in practice;
    /// virtual selectors live in a separate type on the view side.
    FolderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = AssetId::new("photos/2024/beach.jpg");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"photos/2024/beach.jpg\"");

        let parsed: FolderId = serde_json::from_str("\"3f1c0d2e\"").unwrap();
        assert_eq!(parsed.as_str(), "3f1c0d2e");
    }
}
