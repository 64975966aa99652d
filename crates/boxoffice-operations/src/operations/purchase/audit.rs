use boxoffice_core::{Money, Payment, SagaId, Ticket};
use boxoffice_store::EventStore;
use serde::Serialize;

/// Audit log entries written by the purchase saga.
///
/// The variant name is the entry's `type`; the fields are its JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum PurchaseEvent {
    SagaStarted {
        user_id: String,
        event_id: String,
        quantity: u32,
    },
    TicketReserved {
        ticket_id: String,
        event_id: String,
        user_id: String,
        quantity: u32,
        total_price: Money,
    },
    PaymentProcessed {
        payment_id: String,
        user_id: String,
        amount: Money,
    },
    ConfirmationSent {
        user_id: String,
        event_id: String,
    },
    TicketCancelled {
        ticket_id: String,
        event_id: String,
        quantity: u32,
    },
    PaymentRefunded {
        payment_id: String,
        amount: Money,
    },
    SagaCompleted {
        ticket_id: String,
        payment_id: String,
    },
    SagaFailed {
        ordinal: usize,
        step: String,
        error: String,
        rollback_complete: bool,
        compensation_failures: Vec<FailedCompensation>,
    },
}

/// A compensation that did not complete, as written into `SagaFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCompensation {
    pub ordinal: usize,
    pub step: String,
    pub error: String,
}

impl PurchaseEvent {
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SagaStarted { .. } => "SagaStarted",
            Self::TicketReserved { .. } => "TicketReserved",
            Self::PaymentProcessed { .. } => "PaymentProcessed",
            Self::ConfirmationSent { .. } => "ConfirmationSent",
            Self::TicketCancelled { .. } => "TicketCancelled",
            Self::PaymentRefunded { .. } => "PaymentRefunded",
            Self::SagaCompleted { .. } => "SagaCompleted",
            Self::SagaFailed { .. } => "SagaFailed",
        }
    }

    pub(crate) fn ticket_reserved(ticket: &Ticket) -> Self {
        Self::TicketReserved {
            ticket_id: ticket.id.clone(),
            event_id: ticket.event_id.clone(),
            user_id: ticket.user_id.clone(),
            quantity: ticket.quantity,
            total_price: ticket.total_price,
        }
    }

    pub(crate) fn ticket_cancelled(ticket: &Ticket) -> Self {
        Self::TicketCancelled {
            ticket_id: ticket.id.clone(),
            event_id: ticket.event_id.clone(),
            quantity: ticket.quantity,
        }
    }

    pub(crate) fn payment_processed(payment: &Payment) -> Self {
        Self::PaymentProcessed {
            payment_id: payment.id.clone(),
            user_id: payment.user_id.clone(),
            amount: payment.amount,
        }
    }

    pub(crate) fn payment_refunded(payment: &Payment) -> Self {
        Self::PaymentRefunded {
            payment_id: payment.id.clone(),
            amount: payment.amount,
        }
    }

    /// Append this entry to `store` under `saga_id` and return its version.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the entry could not be appended.
    pub fn record<S>(&self, store: &S, saga_id: &SagaId) -> boxoffice_store::Result<u64>
    where
        S: EventStore + ?Sized,
    {
        store.append_event(self.event_type(), saga_id, self)
    }
}
