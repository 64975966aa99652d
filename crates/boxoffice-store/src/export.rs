use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::EventStore;
use crate::error::{Result, StoreError};

/// DDL of the relational audit export, for offline queries only.
pub const DOMAIN_EVENTS_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS domain_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type TEXT NOT NULL,
    payload JSON NOT NULL,
    occurred_at DATETIME NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_event_type ON domain_events(event_type);
CREATE INDEX IF NOT EXISTS idx_occurred_at ON domain_events(occurred_at);
";

/// One row of the `domain_events` table.
///
/// `payload` holds the whole audit entry (saga id, type, version, timestamp
/// and decoded payload), so the row is self-describing without extra columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEventRow {
    pub id: u64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Convert every stored entry into `domain_events` rows.
///
/// Ids are assigned from 1 in global append order.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if a stored payload is not valid JSON.
pub fn export_rows<S: EventStore + ?Sized>(store: &S) -> Result<Vec<DomainEventRow>> {
    let created_at = Utc::now();

    store
        .all_events()
        .into_iter()
        .zip(1..)
        .map(|(event, id)| -> Result<DomainEventRow> {
            let payload = serde_json::json!({
                "sagaId": &event.saga_id,
                "type": &event.event_type,
                "version": event.version,
                "occurredAt": &event.timestamp,
                "payload": event.payload_json()?,
            });
            Ok(DomainEventRow {
                id,
                event_type: event.event_type,
                payload,
                occurred_at: event.timestamp,
                created_at,
            })
        })
        .collect()
}

/// Write rows as newline-delimited JSON, one row per line.
///
/// # Errors
///
/// Returns `StoreError::Export` if writing fails.
pub fn write_json_lines<W: Write>(rows: &[DomainEventRow], mut writer: W) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n").map_err(StoreError::Export)?;
    }
    writer.flush().map_err(StoreError::Export)
}
