use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use boxoffice_core::SagaId;
use chrono::Utc;
use tracing::debug;

use crate::EventStore;
use crate::error::Result;
use crate::event::AuditEvent;

#[derive(Debug, Default)]
struct Log {
    by_saga: HashMap<SagaId, Vec<AuditEvent>>,
    /// (saga, index into that saga's entries), one per append.
    append_order: Vec<(SagaId, usize)>,
}

/// Process-local audit log guarded by a single reader/writer lock.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Log>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all sagas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .append_order
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for InMemoryEventStore {
    fn append_raw(&self, event_type: &str, saga_id: &SagaId, payload: Vec<u8>) -> Result<u64> {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);

        let entries = log.by_saga.entry(*saga_id).or_default();
        let index = entries.len();
        let version = index as u64 + 1;
        entries.push(AuditEvent {
            saga_id: *saga_id,
            event_type: event_type.to_string(),
            payload,
            timestamp: Utc::now(),
            version,
        });
        log.append_order.push((*saga_id, index));
        drop(log);

        debug!(saga_id = %saga_id, event_type, version, "appended audit event");
        Ok(version)
    }

    fn get_events(&self, saga_id: &SagaId) -> Vec<AuditEvent> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_saga
            .get(saga_id)
            .cloned()
            .unwrap_or_default()
    }

    fn has_saga(&self, saga_id: &SagaId) -> bool {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_saga
            .contains_key(saga_id)
    }

    fn saga_ids(&self) -> Vec<SagaId> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.append_order
            .iter()
            .filter(|(_, index)| *index == 0)
            .map(|(saga_id, _)| *saga_id)
            .collect()
    }

    fn all_events(&self) -> Vec<AuditEvent> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.append_order
            .iter()
            .filter_map(|(saga_id, index)| log.by_saga.get(saga_id)?.get(*index).cloned())
            .collect()
    }
}
