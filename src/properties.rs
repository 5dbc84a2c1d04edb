//! Stable identifiers for documents, outline items and flashcards.
//!
//! Ids are v6 UUIDs, so they order chronologically by creation time within a process. The node
//! bytes of each id are derived from its kind, which keeps ids of different kinds apart even when
//! they are generated in the same clock tick.
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
pub use uuid::Uuid;

use crate::error::MarginaliaError;

// Use `Uuid` as a custom type, with `String` as the Builtin
uniffi::custom_type!(Uuid, String, {
    remote,
    try_lift: |val| Ok(Uuid::try_from(val)?),
    lower: |obj| format!(
        "{}",
        obj.hyphenated().encode_lower(&mut Uuid::encode_buffer())
    )
});

pub const UUID_NAMESPACE_MARGINALIA: Uuid = Uuid::from_bytes([
    0x3b, 0x5d, 0x1c, 0x8e, 0x7a, 0x42, 0x4f, 0x0e, 0x9c, 0x61, 0x2d, 0xe4, 0x50, 0x8a, 0x17, 0xc3,
]);

/// Node bytes for ids of `kind`: the last six bytes of a v5 UUID of the kind name.
fn kind_node(kind: &str) -> [u8; 6] {
    let mut node = [0u8; 6];
    let named = Uuid::new_v5(&UUID_NAMESPACE_MARGINALIA, kind.as_bytes());
    node.copy_from_slice(&named.as_bytes()[10..16]);
    node
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(Uuid);

        uniffi::custom_newtype!($name, Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::now_v6(&kind_node($kind)))
            }

            pub fn nil() -> Self {
                $name(Uuid::nil())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                $name(id)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = MarginaliaError;

            fn try_from(string: &str) -> Result<Self, Self::Error> {
                Ok($name(Uuid::parse_str(string)?))
            }
        }

        impl std::str::FromStr for $name {
            type Err = MarginaliaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::try_from(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "{}",
                    self.0.hyphenated().encode_lower(&mut Uuid::encode_buffer())
                )
            }
        }

        impl From<$name> for String {
            fn from(val: $name) -> Self {
                format!("{val}")
            }
        }
    };
}

id_newtype!(
    /// A document (book or PDF) in the library.
    DocumentId,
    "document"
);

id_newtype!(
    /// An outline item. Independent of the item's chapter, so it survives renumbering.
    OutlineId,
    "outline"
);

id_newtype!(CardId, "card");
