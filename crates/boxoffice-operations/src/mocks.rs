use std::sync::Arc;

use boxoffice_core::{DomainError, Event, Money, Result, SagaId, Ticket};
use boxoffice_store::{AuditEvent, EventStore, InMemoryEventStore, StoreError};
use chrono::{TimeZone, Utc};
use serde::ser::Error as _;

use crate::fault::FaultInjector;
use crate::providers::{
    InMemoryEmailService, InMemoryEventRepository, InMemoryPaymentService, InMemoryTicketService,
};
use crate::traits::TicketService;

/// Event store that refuses appends of one entry type and records the rest.
pub struct FailingEventStore {
    inner: InMemoryEventStore,
    fail_on: &'static str,
}

impl FailingEventStore {
    #[must_use]
    pub fn failing_on(event_type: &'static str) -> Self {
        Self {
            inner: InMemoryEventStore::new(),
            fail_on: event_type,
        }
    }
}

impl EventStore for FailingEventStore {
    fn append_raw(
        &self,
        event_type: &str,
        saga_id: &SagaId,
        payload: Vec<u8>,
    ) -> boxoffice_store::Result<u64> {
        if event_type == self.fail_on {
            return Err(StoreError::Serialization(serde_json::Error::custom(
                "store offline",
            )));
        }
        self.inner.append_raw(event_type, saga_id, payload)
    }

    fn get_events(&self, saga_id: &SagaId) -> Vec<AuditEvent> {
        self.inner.get_events(saga_id)
    }

    fn has_saga(&self, saga_id: &SagaId) -> bool {
        self.inner.has_saga(saga_id)
    }

    fn saga_ids(&self) -> Vec<SagaId> {
        self.inner.saga_ids()
    }

    fn all_events(&self) -> Vec<AuditEvent> {
        self.inner.all_events()
    }
}

/// Ticket service whose cancellations always fail.
pub struct UncancellableTicketService {
    inner: InMemoryTicketService<InMemoryEventRepository>,
}

impl UncancellableTicketService {
    #[must_use]
    pub fn new(repository: Arc<InMemoryEventRepository>) -> Self {
        Self {
            inner: InMemoryTicketService::new(repository, FaultInjector::never()),
        }
    }
}

impl TicketService for UncancellableTicketService {
    fn reserve(
        &self,
        saga_id: &SagaId,
        user_id: &str,
        event: &Event,
        quantity: u32,
    ) -> Result<Ticket> {
        self.inner.reserve(saga_id, user_id, event, quantity)
    }

    fn cancel(&self, _saga_id: &SagaId, _ticket_id: &str) -> Result<Ticket> {
        Err(DomainError::transient("ticketing", "cancellations offline"))
    }

    fn confirm(&self, saga_id: &SagaId, ticket_id: &str) -> Result<Ticket> {
        self.inner.confirm(saga_id, ticket_id)
    }

    fn ticket(&self, ticket_id: &str) -> Option<Ticket> {
        self.inner.ticket(ticket_id)
    }
}

/// `event-001`: Rock Concert, 100 seats at 150.00.
#[must_use]
pub fn concert() -> Event {
    Event::new(
        "event-001",
        "Rock Concert",
        Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0)
            .single()
            .expect("valid date"),
        Money::from_major(150),
        100,
    )
}

#[must_use]
pub fn repository() -> Arc<InMemoryEventRepository> {
    Arc::new(InMemoryEventRepository::with_events([concert()]))
}

#[must_use]
pub fn payments(faults: FaultInjector) -> Arc<InMemoryPaymentService> {
    Arc::new(InMemoryPaymentService::new(Money::from_major(1000), faults))
}

#[must_use]
pub fn mail(faults: FaultInjector) -> Arc<InMemoryEmailService> {
    Arc::new(InMemoryEmailService::new(faults))
}
