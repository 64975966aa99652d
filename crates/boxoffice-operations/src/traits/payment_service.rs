use boxoffice_core::{Money, Payment, Result, SagaId};

pub trait PaymentService: Send + Sync {
    /// # Errors
    ///
    /// Checked in order: `InvalidAmount` unless `amount` is positive,
    /// `Transient` if the gateway is down, `LimitExceeded` above the ceiling.
    fn process_payment(&self, saga_id: &SagaId, user_id: &str, amount: Money) -> Result<Payment>;

    /// Refund a processed payment. Refunding twice succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown payment id.
    fn refund_payment(&self, saga_id: &SagaId, payment_id: &str) -> Result<Payment>;

    fn payment(&self, payment_id: &str) -> Option<Payment>;
}
