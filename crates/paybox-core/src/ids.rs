//! Identifier types for Paybox.
//!
//! This module provides strongly-typed identifiers for owners, wallets,
//! transactions, and refund requests.
//!
//! # Macro-based ID Types
//!
//! The `uuid_id_type!` and `ulid_id_type!` macros reduce boilerplate for
//! identifier types, ensuring consistent implementation of serialization,
//! parsing, and display traits. UUID ids identify long-lived entities;
//! ULID ids are time-ordered and identify ledger rows, which makes
//! chronological range scans over an id-keyed index possible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Macro to define a UUID-based identifier type with standard trait implementations.
macro_rules! uuid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Create a new identifier from a UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Return the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Return the bytes of the UUID (16 bytes).
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Create an identifier from raw UUID bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Uuid::from_bytes(bytes))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
                Ok(Self(uuid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }
    };
}

/// Macro to define a ULID-based identifier type with standard trait implementations.
macro_rules! ulid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Ulid);

        impl $name {
            /// Create a new identifier from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Generate a new identifier with the current timestamp.
            #[must_use]
            pub fn generate() -> Self {
                Self(Ulid::new())
            }

            /// Return the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> &Ulid {
                &self.0
            }

            /// Return the bytes of the ULID (16 bytes).
            #[must_use]
            pub fn to_bytes(&self) -> [u8; 16] {
                self.0.to_bytes()
            }

            /// Create an identifier from raw ULID bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Ulid::from_bytes(bytes))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
                Ok(Self(ulid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

uuid_id_type!(
    OwnerId,
    "A wallet owner identifier (UUID format).\n\nOwner IDs come from the authentication collaborator; every ledger call carries a verified one."
);
uuid_id_type!(WalletId, "A wallet identifier (UUID format).");

ulid_id_type!(
    TransactionId,
    "A ledger transaction identifier using ULID for time-ordering.\n\nTransaction IDs sort chronologically, so a wallet's transaction index is naturally ordered by creation time."
);
ulid_id_type!(
    RefundRequestId,
    "A refund request identifier using ULID for time-ordering."
);

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_roundtrip() {
        let id = OwnerId::generate();
        let parsed = OwnerId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn owner_id_serde_json() {
        let id = OwnerId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn owner_id_rejects_garbage() {
        assert_eq!(OwnerId::from_str("not-a-uuid"), Err(IdError::InvalidUuid));
    }

    #[test]
    fn transaction_id_roundtrip() {
        let id = TransactionId::generate();
        let parsed = TransactionId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn transaction_id_bytes_roundtrip() {
        let id = TransactionId::generate();
        let parsed = TransactionId::from_bytes(id.to_bytes());
        assert_eq!(id, parsed);
    }

    #[test]
    fn transaction_ids_sort_by_time() {
        let a = TransactionId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = TransactionId::generate();
        assert!(a.to_bytes() < b.to_bytes());
    }

    #[test]
    fn refund_request_id_serde_json() {
        let id = RefundRequestId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RefundRequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
