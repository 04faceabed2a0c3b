//! Transaction handles.
//!
//! Properties and endpoints never open, commit or roll back a transaction;
//! they thread the caller's handle into every store call. A `set` issued
//! through a `TxMode::ReadOnly` handle is refused by `MemoryStore` with
//! `Error::TxError` before any edge changes. Commit and rollback on
//! `MemoryStore` only consume the handle: writes are visible as soon as
//! they are applied, and a failed `set` changes nothing because its edge
//! batch is validated first.

use serde::{Deserialize, Serialize};

/// Transaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
}

/// Opaque transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub u64);

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// Transaction trait that all stores must implement.
pub trait Transaction: Send + Sync {
    fn mode(&self) -> TxMode;
    fn id(&self) -> TxId;

    fn is_writable(&self) -> bool {
        self.mode() == TxMode::ReadWrite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Handle(TxMode);

    impl Transaction for Handle {
        fn mode(&self) -> TxMode {
            self.0
        }

        fn id(&self) -> TxId {
            TxId(7)
        }
    }

    #[test]
    fn test_only_read_write_handles_are_writable() {
        assert!(Handle(TxMode::ReadWrite).is_writable());
        assert!(!Handle(TxMode::ReadOnly).is_writable());
        assert_eq!(TxId(7).to_string(), "tx-7");
    }
}
