use std::marker::PhantomData;

use boxoffice_saga::SagaStep;
use boxoffice_store::EventStore;
use tracing::{debug, warn};

use super::audit::PurchaseEvent;
use super::context::PurchaseSagaContext;
use super::saga_data::{PaidPurchase, PurchaseRequest, ReservedPurchase};
use crate::OperationError;
use crate::traits::{EmailService, PaymentService, TicketService};

pub struct ReserveTicketStep<T, P, M, S> {
    _marker: PhantomData<(T, P, M, S)>,
}

impl<T, P, M, S> ReserveTicketStep<T, P, M, S> {
    pub const NAME: &'static str = "reserve_ticket";

    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, P, M, S> Default for ReserveTicketStep<T, P, M, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, M, S> SagaStep for ReserveTicketStep<T, P, M, S>
where
    T: TicketService,
    P: PaymentService,
    M: EmailService,
    S: EventStore,
{
    type Input = PurchaseRequest;
    type Output = ReservedPurchase;
    type Context = PurchaseSagaContext<T, P, M, S>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, ctx: &Self::Context, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let saga_id = input.saga_id;
        let ticket = ctx.ticket_service().reserve(
            &saga_id,
            &input.user_id,
            &input.event,
            input.quantity,
        )?;

        if let Err(err) = PurchaseEvent::ticket_reserved(&ticket).record(ctx.event_store(), &saga_id)
        {
            warn!(
                saga_id = %saga_id,
                ticket_id = %ticket.id,
                %err,
                "could not record reservation, cancelling it"
            );
            if let Err(cancel_err) = ctx.ticket_service().cancel(&saga_id, &ticket.id) {
                warn!(saga_id = %saga_id, ticket_id = %ticket.id, %cancel_err, "cancel failed");
            }
            return Err(err.into());
        }

        Ok(ReservedPurchase {
            request: input,
            ticket,
        })
    }

    fn compensate(&self, ctx: &Self::Context, output: Self::Output) -> Result<(), Self::Error> {
        let saga_id = output.request.saga_id;
        debug!(saga_id = %saga_id, ticket_id = %output.ticket.id, "cancelling reservation");

        let cancelled = ctx.ticket_service().cancel(&saga_id, &output.ticket.id)?;
        if let Err(err) =
            PurchaseEvent::ticket_cancelled(&cancelled).record(ctx.event_store(), &saga_id)
        {
            warn!(saga_id = %saga_id, ticket_id = %cancelled.id, %err, "could not record cancellation");
        }
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "cancel the reserved ticket and release its seats".to_string()
    }
}

pub struct ProcessPaymentStep<T, P, M, S> {
    _marker: PhantomData<(T, P, M, S)>,
}

impl<T, P, M, S> ProcessPaymentStep<T, P, M, S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, P, M, S> Default for ProcessPaymentStep<T, P, M, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, M, S> SagaStep for ProcessPaymentStep<T, P, M, S>
where
    T: TicketService,
    P: PaymentService,
    M: EmailService,
    S: EventStore,
{
    type Input = ReservedPurchase;
    type Output = PaidPurchase;
    type Context = PurchaseSagaContext<T, P, M, S>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "process_payment"
    }

    fn execute(&self, ctx: &Self::Context, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let saga_id = input.request.saga_id;
        let payment = ctx.payment_service().process_payment(
            &saga_id,
            &input.request.user_id,
            input.ticket.total_price,
        )?;

        if let Err(err) =
            PurchaseEvent::payment_processed(&payment).record(ctx.event_store(), &saga_id)
        {
            warn!(
                saga_id = %saga_id,
                payment_id = %payment.id,
                %err,
                "could not record payment, refunding it"
            );
            if let Err(refund_err) = ctx.payment_service().refund_payment(&saga_id, &payment.id) {
                warn!(saga_id = %saga_id, payment_id = %payment.id, %refund_err, "refund failed");
            }
            return Err(err.into());
        }

        Ok(PaidPurchase {
            reservation: input,
            payment,
        })
    }

    fn compensate(&self, ctx: &Self::Context, output: Self::Output) -> Result<(), Self::Error> {
        let saga_id = output.request().saga_id;
        debug!(saga_id = %saga_id, payment_id = %output.payment.id, "refunding payment");

        let refunded = ctx
            .payment_service()
            .refund_payment(&saga_id, &output.payment.id)?;
        if let Err(err) =
            PurchaseEvent::payment_refunded(&refunded).record(ctx.event_store(), &saga_id)
        {
            warn!(saga_id = %saga_id, payment_id = %refunded.id, %err, "could not record refund");
        }
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "refund the payment".to_string()
    }
}

pub struct SendConfirmationStep<T, P, M, S> {
    _marker: PhantomData<(T, P, M, S)>,
}

impl<T, P, M, S> SendConfirmationStep<T, P, M, S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, P, M, S> Default for SendConfirmationStep<T, P, M, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, M, S> SagaStep for SendConfirmationStep<T, P, M, S>
where
    T: TicketService,
    P: PaymentService,
    M: EmailService,
    S: EventStore,
{
    type Input = PaidPurchase;
    type Output = PaidPurchase;
    type Context = PurchaseSagaContext<T, P, M, S>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "send_confirmation"
    }

    fn execute(&self, ctx: &Self::Context, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let request = input.request();
        ctx.email_service()
            .send_confirmation(&request.saga_id, &request.user_id, &request.event)?;

        let sent = PurchaseEvent::ConfirmationSent {
            user_id: request.user_id.clone(),
            event_id: request.event.id.clone(),
        };
        // A sent message cannot be taken back, so a lost audit entry is only logged.
        if let Err(err) = sent.record(ctx.event_store(), &request.saga_id) {
            warn!(saga_id = %request.saga_id, %err, "could not record confirmation");
        }

        Ok(input)
    }

    fn compensate(&self, _ctx: &Self::Context, output: Self::Output) -> Result<(), Self::Error> {
        let request = output.request();
        warn!(
            saga_id = %request.saga_id,
            user_id = %request.user_id,
            "confirmation already sent and cannot be recalled"
        );
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "none: a sent confirmation cannot be recalled".to_string()
    }
}
