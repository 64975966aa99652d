use std::sync::Arc;

use boxoffice_store::EventStore;

use crate::traits::{EmailService, PaymentService, TicketService};

/// Collaborators shared by every step of a purchase saga.
pub struct PurchaseSagaContext<T, P, M, S> {
    ticket_service: Arc<T>,
    payment_service: Arc<P>,
    email_service: Arc<M>,
    event_store: Arc<S>,
}

impl<T, P, M, S> Clone for PurchaseSagaContext<T, P, M, S> {
    fn clone(&self) -> Self {
        Self {
            ticket_service: Arc::clone(&self.ticket_service),
            payment_service: Arc::clone(&self.payment_service),
            email_service: Arc::clone(&self.email_service),
            event_store: Arc::clone(&self.event_store),
        }
    }
}

impl<T, P, M, S> PurchaseSagaContext<T, P, M, S>
where
    T: TicketService,
    P: PaymentService,
    M: EmailService,
    S: EventStore,
{
    pub fn new(
        ticket_service: Arc<T>,
        payment_service: Arc<P>,
        email_service: Arc<M>,
        event_store: Arc<S>,
    ) -> Self {
        Self {
            ticket_service,
            payment_service,
            email_service,
            event_store,
        }
    }

    #[must_use]
    pub fn ticket_service(&self) -> &T {
        &self.ticket_service
    }

    #[must_use]
    pub fn payment_service(&self) -> &P {
        &self.payment_service
    }

    #[must_use]
    pub fn email_service(&self) -> &M {
        &self.email_service
    }

    #[must_use]
    pub fn event_store(&self) -> &S {
        &self.event_store
    }
}
