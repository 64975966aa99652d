use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use boxoffice_core::{DomainError, EntityKind, Event, Result, SagaId, Ticket};
use tracing::{debug, warn};

use crate::fault::FaultInjector;
use crate::traits::{EventRepository, TicketService};

const SERVICE: &str = "ticketing";

/// Ticket bookkeeping on top of an [`EventRepository`].
///
/// Seat counts live in the repository; this service only keeps the tickets.
/// A reservation takes capacity first and then records the ticket, while a
/// cancellation marks the ticket first and then returns the seats.
#[derive(Debug)]
pub struct InMemoryTicketService<R> {
    repository: Arc<R>,
    tickets: RwLock<HashMap<String, Ticket>>,
    faults: FaultInjector,
}

impl<R: EventRepository> InMemoryTicketService<R> {
    #[must_use]
    pub fn new(repository: Arc<R>, faults: FaultInjector) -> Self {
        Self {
            repository,
            tickets: RwLock::new(HashMap::new()),
            faults,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Copies of every ticket ever reserved, in no particular order.
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn reopen(&self, ticket_id: &str) {
        if let Some(ticket) = self
            .tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(ticket_id)
        {
            ticket.reopen();
        }
    }
}

impl<R: EventRepository> TicketService for InMemoryTicketService<R> {
    fn reserve(
        &self,
        saga_id: &SagaId,
        user_id: &str,
        event: &Event,
        quantity: u32,
    ) -> Result<Ticket> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        self.faults.check(SERVICE)?;

        let ticket = self.repository.update_with(&event.id, |stored| {
            let ticket = Ticket::new(stored, user_id, quantity)?;
            stored.reserve(quantity)?;
            Ok(ticket)
        })?;

        self.tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ticket.id.clone(), ticket.clone());

        debug!(
            saga_id = %saga_id,
            ticket_id = %ticket.id,
            event_id = %ticket.event_id,
            quantity,
            total = %ticket.total_price,
            "reserved tickets"
        );
        Ok(ticket)
    }

    fn cancel(&self, saga_id: &SagaId, ticket_id: &str) -> Result<Ticket> {
        let ticket = {
            let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
            let ticket = tickets
                .get_mut(ticket_id)
                .ok_or_else(|| DomainError::not_found(EntityKind::Ticket, ticket_id))?;
            ticket.cancel()?;
            ticket.clone()
        };

        if let Err(err) = self
            .repository
            .update_with(&ticket.event_id, |event| event.release(ticket.quantity))
        {
            warn!(
                saga_id = %saga_id,
                ticket_id,
                %err,
                "could not release capacity, reopening ticket"
            );
            self.reopen(ticket_id);
            return Err(err);
        }

        debug!(
            saga_id = %saga_id,
            ticket_id,
            event_id = %ticket.event_id,
            quantity = ticket.quantity,
            "cancelled ticket"
        );
        Ok(ticket)
    }

    fn confirm(&self, saga_id: &SagaId, ticket_id: &str) -> Result<Ticket> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Ticket, ticket_id))?;
        ticket.confirm()?;
        debug!(saga_id = %saga_id, ticket_id, "confirmed ticket");
        Ok(ticket.clone())
    }

    fn ticket(&self, ticket_id: &str) -> Option<Ticket> {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ticket_id)
            .cloned()
    }
}
