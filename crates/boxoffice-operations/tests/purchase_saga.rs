//! End-to-end purchase runs against the in-memory providers.

use std::sync::Arc;

use boxoffice_core::{ErrorKind, Event, Money, PaymentStatus, SagaId, TicketStatus};
use boxoffice_operations::operations::purchase::TicketPurchaseSaga;
use boxoffice_operations::providers::{
    InMemoryEmailService, InMemoryEventRepository, InMemoryPaymentService, InMemoryTicketService,
};
use boxoffice_operations::traits::{EventRepository, PaymentService, TicketService};
use boxoffice_operations::{FaultInjector, OperationError, sample_events};
use boxoffice_saga::StepStatus;
use boxoffice_store::{EventStore, InMemoryEventStore};

type Tickets = InMemoryTicketService<InMemoryEventRepository>;

struct Harness {
    repository: Arc<InMemoryEventRepository>,
    tickets: Arc<Tickets>,
    payments: Arc<InMemoryPaymentService>,
    mail: Arc<InMemoryEmailService>,
    store: Arc<InMemoryEventStore>,
    saga: TicketPurchaseSaga<
        InMemoryEventRepository,
        Tickets,
        InMemoryPaymentService,
        InMemoryEmailService,
        InMemoryEventStore,
    >,
}

impl Harness {
    fn new(payment_faults: FaultInjector, mail_faults: FaultInjector) -> Self {
        Self::with_events(sample_events(), payment_faults, mail_faults)
    }

    fn healthy() -> Self {
        Self::new(FaultInjector::never(), FaultInjector::never())
    }

    fn with_events(
        events: Vec<Event>,
        payment_faults: FaultInjector,
        mail_faults: FaultInjector,
    ) -> Self {
        let repository = Arc::new(InMemoryEventRepository::with_events(events));
        let tickets = Arc::new(InMemoryTicketService::new(
            Arc::clone(&repository),
            FaultInjector::never(),
        ));
        let payments = Arc::new(InMemoryPaymentService::new(
            Money::from_major(1000),
            payment_faults,
        ));
        let mail = Arc::new(InMemoryEmailService::new(mail_faults));
        let store = Arc::new(InMemoryEventStore::new());
        let saga = TicketPurchaseSaga::new(
            Arc::clone(&repository),
            Arc::clone(&tickets),
            Arc::clone(&payments),
            Arc::clone(&mail),
            Arc::clone(&store),
        );
        Self {
            repository,
            tickets,
            payments,
            mail,
            store,
            saga,
        }
    }

    fn sold(&self, event_id: &str) -> u32 {
        self.repository
            .find_by_id(event_id)
            .expect("event exists")
            .sold_tickets()
    }

    fn audit_types(&self, saga_id: &SagaId) -> Vec<String> {
        self.store
            .get_events(saga_id)
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

#[test]
fn successful_purchase_reserves_charges_and_confirms() -> anyhow::Result<()> {
    let harness = Harness::healthy();

    let outcome = harness.saga.handle("user-789", "event-001", 2)?;

    assert_eq!(outcome.ticket.total_price, Money::from_major(300));
    assert_eq!(outcome.ticket.total_price.to_string(), "300.00");
    assert_eq!(outcome.ticket.status(), TicketStatus::Reserved);
    assert_eq!(outcome.payment.amount, Money::from_major(300));
    assert_eq!(outcome.payment.status(), PaymentStatus::Processed);
    assert_eq!(harness.sold("event-001"), 2);
    assert_eq!(harness.mail.outbox().len(), 1);
    assert_eq!(
        harness.audit_types(&outcome.saga_id),
        vec![
            "SagaStarted",
            "TicketReserved",
            "PaymentProcessed",
            "ConfirmationSent",
            "SagaCompleted"
        ]
    );
    assert_eq!(
        outcome.steps.with_status(StepStatus::Executed).count(),
        3,
        "{}",
        outcome.steps.summary()
    );
    Ok(())
}

#[test]
fn audit_versions_count_up_from_one() -> anyhow::Result<()> {
    let harness = Harness::healthy();

    let outcome = harness.saga.handle("user-789", "event-001", 1)?;

    let versions: Vec<u64> = harness
        .store
        .get_events(&outcome.saga_id)
        .iter()
        .map(|e| e.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn payment_failure_cancels_the_reservation() {
    let harness = Harness::new(FaultInjector::always(), FaultInjector::never());

    let err = harness
        .saga
        .handle("user-789", "event-001", 2)
        .expect_err("payment gateway down");

    assert!(matches!(err, OperationError::SagaFailed { .. }));
    assert_eq!(err.failed_ordinal(), Some(2));
    assert_eq!(err.kind(), Some(ErrorKind::Transient));
    assert!(err.to_string().contains("process_payment"));
    let cause = std::error::Error::source(&err).expect("has cause");
    assert!(cause.to_string().contains("payment gateway"));

    assert_eq!(harness.sold("event-001"), 0);
    let tickets = harness.tickets.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].status(), TicketStatus::Cancelled);
    assert!(harness.mail.outbox().is_empty());

    let saga_id = err.saga_id().expect("terminal error carries saga id");
    assert_eq!(
        harness.audit_types(&saga_id),
        vec![
            "SagaStarted",
            "TicketReserved",
            "TicketCancelled",
            "SagaFailed"
        ]
    );
}

#[test]
fn insufficient_capacity_fails_first_step_without_side_effects() {
    let events = vec![
        sample_events()[0]
            .clone()
            .with_sold_tickets(95)
            .expect("within capacity"),
    ];
    let harness = Harness::with_events(events, FaultInjector::never(), FaultInjector::never());

    let err = harness
        .saga
        .handle("user-789", "event-001", 10)
        .expect_err("only 5 remain");

    assert_eq!(err.failed_ordinal(), Some(1));
    assert_eq!(err.kind(), Some(ErrorKind::Capacity));
    assert!(err.compensation_failures().is_empty());
    assert_eq!(harness.sold("event-001"), 95);
    assert!(harness.tickets.tickets().is_empty());
    assert!(harness.payments.payments().is_empty());

    let saga_id = err.saga_id().expect("terminal error carries saga id");
    assert_eq!(harness.audit_types(&saga_id), vec!["SagaStarted", "SagaFailed"]);
}

#[test]
fn email_failure_refunds_then_cancels() -> anyhow::Result<()> {
    let harness = Harness::new(FaultInjector::never(), FaultInjector::always());

    let err = harness
        .saga
        .handle("user-789", "event-002", 3)
        .expect_err("mail service down");

    assert_eq!(err.failed_ordinal(), Some(3));
    assert_eq!(harness.sold("event-002"), 0);

    let payments = harness.payments.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status(), PaymentStatus::Refunded);
    let refunded = harness
        .payments
        .payment(&payments[0].id)
        .expect("payment kept");
    assert!(refunded.refunded_at.is_some());

    let saga_id = err.saga_id().expect("terminal error carries saga id");
    assert_eq!(
        harness.audit_types(&saga_id),
        vec![
            "SagaStarted",
            "TicketReserved",
            "PaymentProcessed",
            "PaymentRefunded",
            "TicketCancelled",
            "SagaFailed"
        ]
    );

    let ticket_id = &harness.tickets.tickets()[0].id;
    let ticket = harness.tickets.ticket(ticket_id).expect("ticket kept");
    assert_eq!(ticket.status(), TicketStatus::Cancelled);
    Ok(())
}

#[test]
fn amount_over_limit_fails_payment_step() {
    let harness = Harness::healthy();

    let err = harness
        .saga
        .handle("user-789", "event-001", 7)
        .expect_err("1050.00 is over the limit");

    assert_eq!(err.failed_ordinal(), Some(2));
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
    assert_eq!(harness.sold("event-001"), 0);
}

#[test]
fn zero_quantity_fails_first_step() {
    let harness = Harness::healthy();

    let err = harness
        .saga
        .handle("user-789", "event-001", 0)
        .expect_err("zero is invalid");

    assert_eq!(err.failed_ordinal(), Some(1));
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
}

#[test]
fn unknown_event_fails_the_first_step() {
    let harness = Harness::healthy();

    let err = harness
        .saga
        .handle("user-789", "event-404", 1)
        .expect_err("no such event");

    assert!(matches!(err, OperationError::SagaFailed { .. }));
    assert_eq!(err.failed_ordinal(), Some(1));
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    assert!(err.to_string().contains("step 1 'reserve_ticket'"));

    let saga_id = err.saga_id().expect("terminal error carries the saga id");
    assert_eq!(harness.audit_types(&saga_id), vec!["SagaStarted", "SagaFailed"]);
    assert!(harness.tickets.tickets().is_empty());
    assert!(harness.payments.payments().is_empty());
}

#[test]
fn reused_saga_id_is_refused_without_touching_its_trail() -> anyhow::Result<()> {
    let harness = Harness::healthy();
    let saga_id = SagaId::new();
    harness
        .saga
        .handle_with_id(saga_id, "user-1", "event-001", 1)?;
    let trail_before = harness.audit_types(&saga_id);

    let err = harness
        .saga
        .handle_with_id(saga_id, "user-2", "event-001", 1)
        .expect_err("saga id already used");

    assert!(!err.is_terminal());
    assert_eq!(err.kind(), Some(ErrorKind::StateConflict));
    assert_eq!(harness.audit_types(&saga_id), trail_before);
    assert_eq!(harness.sold("event-001"), 1);
    assert_eq!(harness.payments.payments().len(), 1);
    Ok(())
}

#[test]
fn each_purchase_gets_its_own_saga_id() -> anyhow::Result<()> {
    let harness = Harness::healthy();

    let first = harness.saga.handle("user-1", "event-001", 1)?;
    let second = harness.saga.handle("user-2", "event-001", 1)?;

    assert_ne!(first.saga_id, second.saga_id);
    assert_eq!(harness.store.saga_ids(), vec![first.saga_id, second.saga_id]);
    assert_eq!(harness.sold("event-001"), 2);
    Ok(())
}

#[test]
fn caller_supplied_saga_id_tags_every_entry() -> anyhow::Result<()> {
    let harness = Harness::healthy();
    let saga_id = SagaId::new();

    let outcome = harness
        .saga
        .handle_with_id(saga_id, "user-789", "event-002", 1)?;

    assert_eq!(outcome.saga_id, saga_id);
    assert!(
        harness
            .store
            .all_events()
            .iter()
            .all(|e| e.saga_id == saga_id)
    );
    assert_eq!(harness.mail.outbox()[0].saga_id, saga_id);
    Ok(())
}

#[test]
fn cancelling_twice_never_double_releases() -> anyhow::Result<()> {
    let harness = Harness::healthy();
    let outcome = harness.saga.handle("user-789", "event-001", 2)?;

    harness.tickets.cancel(&outcome.saga_id, &outcome.ticket.id)?;
    let err = harness
        .tickets
        .cancel(&outcome.saga_id, &outcome.ticket.id)
        .expect_err("already cancelled");

    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(harness.sold("event-001"), 0);
    Ok(())
}

#[test]
fn refund_after_purchase_is_idempotent() -> anyhow::Result<()> {
    let harness = Harness::healthy();
    let outcome = harness.saga.handle("user-789", "event-001", 1)?;

    let first = harness
        .payments
        .refund_payment(&outcome.saga_id, &outcome.payment.id)?;
    let second = harness
        .payments
        .refund_payment(&outcome.saga_id, &outcome.payment.id)?;

    assert_eq!(first.status(), PaymentStatus::Refunded);
    assert_eq!(second, first);
    Ok(())
}
