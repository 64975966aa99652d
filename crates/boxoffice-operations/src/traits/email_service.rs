use boxoffice_core::{Event, Result, SagaId};

/// Outbound notifications. A sent message cannot be recalled.
pub trait EmailService: Send + Sync {
    /// # Errors
    ///
    /// Returns `Transient` if the mail service is unavailable.
    fn send_confirmation(&self, saga_id: &SagaId, user_id: &str, event: &Event) -> Result<()>;
}
