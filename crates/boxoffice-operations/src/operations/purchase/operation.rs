use std::sync::Arc;

use boxoffice_core::{DomainError, EntityKind, Payment, SagaId, Ticket};
use boxoffice_saga::{Saga, SagaAuditLog, SagaBuilder};
use boxoffice_store::{AuditEvent, EventStore};
use tracing::{info, warn};

use super::audit::{FailedCompensation, PurchaseEvent};
use super::context::PurchaseSagaContext;
use super::saga_data::{PaidPurchase, PurchaseRequest};
use super::saga_steps::{ProcessPaymentStep, ReserveTicketStep, SendConfirmationStep};
use crate::error::{OperationError, Result};
use crate::traits::{EmailService, EventRepository, PaymentService, TicketService};

/// Result of a purchase whose three steps all succeeded.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub saga_id: SagaId,
    pub ticket: Ticket,
    pub payment: Payment,
    /// Per-step timing and status of this run.
    pub steps: SagaAuditLog,
}

/// Buys tickets by reserving seats, charging for them and sending a
/// confirmation, undoing completed steps in reverse order if one fails.
pub struct TicketPurchaseSaga<R, T, P, M, S> {
    events: Arc<R>,
    context: PurchaseSagaContext<T, P, M, S>,
    saga: Saga<PurchaseRequest, PaidPurchase, PurchaseSagaContext<T, P, M, S>, OperationError>,
}

impl<R, T, P, M, S> TicketPurchaseSaga<R, T, P, M, S>
where
    R: EventRepository,
    T: TicketService + 'static,
    P: PaymentService + 'static,
    M: EmailService + 'static,
    S: EventStore + 'static,
{
    pub fn new(
        events: Arc<R>,
        ticket_service: Arc<T>,
        payment_service: Arc<P>,
        email_service: Arc<M>,
        event_store: Arc<S>,
    ) -> Self {
        let saga = SagaBuilder::new()
            .first_step(ReserveTicketStep::<T, P, M, S>::new())
            .then(ProcessPaymentStep::<T, P, M, S>::new())
            .then(SendConfirmationStep::<T, P, M, S>::new())
            .build();

        Self {
            events,
            context: PurchaseSagaContext::new(
                ticket_service,
                payment_service,
                email_service,
                event_store,
            ),
            saga,
        }
    }

    /// Step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.saga.step_names()
    }

    #[must_use]
    pub fn context(&self) -> &PurchaseSagaContext<T, P, M, S> {
        &self.context
    }

    /// Audit entries recorded for `saga_id`, in version order.
    #[must_use]
    pub fn audit_trail(&self, saga_id: &SagaId) -> Vec<AuditEvent> {
        self.context.event_store().get_events(saga_id)
    }

    /// Run one purchase under a fresh saga id.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the start of the saga cannot be recorded; nothing
    /// has run in that case. Every later failure, an unknown event included,
    /// is reported as `SagaFailed` or, if some compensation also failed,
    /// `SagaCompensationFailed`.
    pub fn handle(&self, user_id: &str, event_id: &str, quantity: u32) -> Result<PurchaseOutcome> {
        self.handle_with_id(SagaId::new(), user_id, event_id, quantity)
    }

    /// Like [`TicketPurchaseSaga::handle`], with a caller-chosen saga id.
    ///
    /// # Errors
    ///
    /// Returns `Domain(InvalidState)` without recording anything if the store
    /// already holds entries for `saga_id`. Otherwise see
    /// [`TicketPurchaseSaga::handle`].
    pub fn handle_with_id(
        &self,
        saga_id: SagaId,
        user_id: &str,
        event_id: &str,
        quantity: u32,
    ) -> Result<PurchaseOutcome> {
        let store = self.context.event_store();
        if store.has_saga(&saga_id) {
            warn!(saga_id = %saga_id, "saga id already used, refusing to run it again");
            return Err(DomainError::InvalidState {
                kind: EntityKind::Saga,
                id: saga_id.to_string(),
                status: "started".to_string(),
                operation: "start",
            }
            .into());
        }

        info!(saga_id = %saga_id, user_id, event_id, quantity, "starting ticket purchase");
        PurchaseEvent::SagaStarted {
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
            quantity,
        }
        .record(store, &saga_id)?;

        let event = match self.events.find_by_id(event_id) {
            Ok(event) => event,
            Err(err) => {
                let step = ReserveTicketStep::<T, P, M, S>::NAME;
                self.record_failure(&saga_id, 1, step, &err.to_string(), Vec::new());
                return Err(OperationError::SagaFailed {
                    saga_id,
                    ordinal: 1,
                    step: step.to_string(),
                    source: Box::new(err.into()),
                });
            }
        };

        let request = PurchaseRequest {
            saga_id,
            user_id: user_id.to_string(),
            event,
            quantity,
        };
        let (result, steps) = self.saga.execute_with_audit(&self.context, request);

        match result {
            Ok(paid) => {
                let completed = PurchaseEvent::SagaCompleted {
                    ticket_id: paid.ticket().id.clone(),
                    payment_id: paid.payment.id.clone(),
                };
                if let Err(err) = completed.record(store, &saga_id) {
                    warn!(saga_id = %saga_id, %err, "could not record saga completion");
                }
                info!(
                    saga_id = %saga_id,
                    ticket_id = %paid.ticket().id,
                    payment_id = %paid.payment.id,
                    "ticket purchase completed"
                );
                Ok(PurchaseOutcome {
                    saga_id,
                    ticket: paid.reservation.ticket,
                    payment: paid.payment,
                    steps,
                })
            }
            Err(saga_err) => {
                let stuck = saga_err
                    .compensation_errors()
                    .iter()
                    .map(|e| FailedCompensation {
                        ordinal: e.ordinal,
                        step: e.step.clone(),
                        error: e.error.to_string(),
                    })
                    .collect();
                self.record_failure(
                    &saga_id,
                    saga_err.ordinal(),
                    saga_err.step(),
                    &saga_err.step_error().to_string(),
                    stuck,
                );
                Err(OperationError::from_saga(saga_id, saga_err))
            }
        }
    }

    fn record_failure(
        &self,
        saga_id: &SagaId,
        ordinal: usize,
        step: &str,
        cause: &str,
        compensation_failures: Vec<FailedCompensation>,
    ) {
        let rollback_complete = compensation_failures.is_empty();
        warn!(
            saga_id = %saga_id,
            ordinal,
            step,
            error = cause,
            rollback_complete,
            "ticket purchase failed"
        );
        for stuck in &compensation_failures {
            warn!(
                saga_id = %saga_id,
                ordinal = stuck.ordinal,
                step = %stuck.step,
                error = %stuck.error,
                "compensation left incomplete"
            );
        }

        let failed = PurchaseEvent::SagaFailed {
            ordinal,
            step: step.to_string(),
            error: cause.to_string(),
            rollback_complete,
            compensation_failures,
        };
        if let Err(store_err) = failed.record(self.context.event_store(), saga_id) {
            warn!(saga_id = %saga_id, %store_err, "could not record saga failure");
        }
    }
}
