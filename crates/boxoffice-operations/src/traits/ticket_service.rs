use boxoffice_core::{Event, Result, SagaId, Ticket};

pub trait TicketService: Send + Sync {
    /// Reserve `quantity` seats of `event` for `user_id`.
    ///
    /// Capacity is checked and taken in one step, so concurrent reservations
    /// never oversell.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity`, `InsufficientCapacity`, `Transient`, or
    /// `NotFound` if the event is gone.
    fn reserve(
        &self,
        saga_id: &SagaId,
        user_id: &str,
        event: &Event,
        quantity: u32,
    ) -> Result<Ticket>;

    /// Cancel a reserved ticket and give its seats back, exactly once.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyCancelled` for a second cancel, or
    /// `InvalidState` for a confirmed ticket.
    fn cancel(&self, saga_id: &SagaId, ticket_id: &str) -> Result<Ticket>;

    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidState` unless the ticket is reserved.
    fn confirm(&self, saga_id: &SagaId, ticket_id: &str) -> Result<Ticket>;

    fn ticket(&self, ticket_id: &str) -> Option<Ticket>;
}
