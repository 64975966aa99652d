use boxoffice_core::SagaId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One immutable entry of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub saga_id: SagaId,
    #[serde(rename = "type")]
    pub event_type: String,
    /// JSON-encoded payload.
    pub payload: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    /// Position within the saga, starting at 1.
    pub version: u64,
}

impl AuditEvent {
    /// Decode the payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the payload does not match `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Decode the payload as untyped JSON.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the payload is not valid JSON.
    pub fn payload_json(&self) -> Result<serde_json::Value> {
        self.payload_as()
    }
}
