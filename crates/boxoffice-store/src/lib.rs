//! Append-only, version-ordered audit log of saga actions.
//!
//! Every entry belongs to one saga and carries a version that counts up from
//! 1 without gaps for that saga. Entries are never updated or removed. The log
//! exists for traceability; nothing reads it back to drive execution.

mod error;
mod event;
mod export;
mod memory;

pub use error::{Result, StoreError};
pub use event::AuditEvent;
pub use export::{DOMAIN_EVENTS_SCHEMA, DomainEventRow, export_rows, write_json_lines};
pub use memory::InMemoryEventStore;

use boxoffice_core::SagaId;
use serde::Serialize;

/// Storage for audit events.
///
/// Implementations assign versions atomically with the append, so concurrent
/// appends for the same saga still produce `1..=n` without gaps.
pub trait EventStore: Send + Sync {
    /// Append an already-serialized JSON payload and return its version.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot record the entry.
    fn append_raw(&self, event_type: &str, saga_id: &SagaId, payload: Vec<u8>) -> Result<u64>;

    /// Entries of one saga ordered by version; empty for an unknown saga.
    fn get_events(&self, saga_id: &SagaId) -> Vec<AuditEvent>;

    fn has_saga(&self, saga_id: &SagaId) -> bool;

    /// Every saga with at least one entry, in order of first append.
    fn saga_ids(&self) -> Vec<SagaId>;

    /// Every entry across all sagas, in global append order.
    fn all_events(&self) -> Vec<AuditEvent>;

    /// Serialize `payload` as JSON and append it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the payload cannot be encoded;
    /// nothing is appended in that case.
    fn append_event<P>(&self, event_type: &str, saga_id: &SagaId, payload: &P) -> Result<u64>
    where
        P: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(payload)?;
        self.append_raw(event_type, saga_id, bytes)
    }
}
