//! Collaborators the broker talks to: the domain ledgers and the legacy state store.

mod in_memory;
mod state_store;

pub use in_memory::{InMemoryLedgerBackend, LedgerCall, LedgerCallKind};
pub use state_store::{InMemoryStateStore, StateStore, batch_read};

use crate::core::LedgerCallError;
use async_trait::async_trait;

/// Sentinel text a domain ledger returns when a key is absent.
pub const NOT_FOUND_MARKER: &str = "Did not find entry";

/// Builds the not-found payload for `key`.
pub fn not_found_payload(key: &str) -> Vec<u8> {
    format!("{NOT_FOUND_MARKER} for key: {key}").into_bytes()
}

pub type LedgerCallResult = std::result::Result<Vec<u8>, LedgerCallError>;

/// Remote surface of a domain ledger, addressed by partition identifier.
///
/// Each call returns exactly once. A `query` miss is a successful response
/// whose text contains [`NOT_FOUND_MARKER`].
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Read-style call.
    async fn query(&self, partition_id: &str, args: &[String]) -> LedgerCallResult;

    /// Write-style call.
    async fn invoke(&self, partition_id: &str, args: &[String]) -> LedgerCallResult;
}
