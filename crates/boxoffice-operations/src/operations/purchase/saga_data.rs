use boxoffice_core::{Event, Payment, SagaId, Ticket};

/// Input of the first step: what the caller asked for.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub saga_id: SagaId,
    pub user_id: String,
    /// The event as resolved when the saga started.
    pub event: Event,
    pub quantity: u32,
}

/// Output of `reserve_ticket`, and what its compensation cancels.
#[derive(Debug, Clone)]
pub struct ReservedPurchase {
    pub request: PurchaseRequest,
    pub ticket: Ticket,
}

/// Output of `process_payment`, and what its compensation refunds.
#[derive(Debug, Clone)]
pub struct PaidPurchase {
    pub reservation: ReservedPurchase,
    pub payment: Payment,
}

impl PaidPurchase {
    #[must_use]
    pub fn request(&self) -> &PurchaseRequest {
        &self.reservation.request
    }

    #[must_use]
    pub fn ticket(&self) -> &Ticket {
        &self.reservation.ticket
    }
}
