use std::sync::{PoisonError, RwLock};

use boxoffice_core::{Event, Result, SagaId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::fault::FaultInjector;
use crate::traits::EmailService;

const SERVICE: &str = "mail service";

/// A confirmation that left the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentConfirmation {
    pub saga_id: SagaId,
    pub user_id: String,
    pub event_id: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryEmailService {
    outbox: RwLock<Vec<SentConfirmation>>,
    faults: FaultInjector,
}

impl InMemoryEmailService {
    #[must_use]
    pub fn new(faults: FaultInjector) -> Self {
        Self {
            outbox: RwLock::new(Vec::new()),
            faults,
        }
    }

    /// Confirmations sent so far, oldest first.
    #[must_use]
    pub fn outbox(&self) -> Vec<SentConfirmation> {
        self.outbox
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EmailService for InMemoryEmailService {
    fn send_confirmation(&self, saga_id: &SagaId, user_id: &str, event: &Event) -> Result<()> {
        self.faults.check(SERVICE)?;

        let message = SentConfirmation {
            saga_id: *saga_id,
            user_id: user_id.to_string(),
            event_id: event.id.clone(),
            subject: format!("Your tickets for {}", event.name),
            sent_at: Utc::now(),
        };
        debug!(saga_id = %saga_id, user_id, event_id = %event.id, "sent confirmation");
        self.outbox
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_core::{ErrorKind, Money};

    use super::*;

    fn event() -> Event {
        Event::new("event-001", "Rock Concert", Utc::now(), Money::from_major(150), 100)
    }

    #[test]
    fn sent_confirmation_lands_in_outbox() -> anyhow::Result<()> {
        let mail = InMemoryEmailService::default();
        let saga_id = SagaId::new();

        mail.send_confirmation(&saga_id, "user-789", &event())?;

        let outbox = mail.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].saga_id, saga_id);
        assert_eq!(outbox[0].subject, "Your tickets for Rock Concert");
        Ok(())
    }

    #[test]
    fn outage_sends_nothing() {
        let mail = InMemoryEmailService::new(FaultInjector::always());

        let err = mail
            .send_confirmation(&SagaId::new(), "user-789", &event())
            .expect_err("mail down");

        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(mail.outbox().is_empty());
    }
}
