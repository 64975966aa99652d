//! Capacity under concurrent purchases.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use boxoffice_core::{ErrorKind, Event, Money};
use boxoffice_operations::{FaultInjector, FaultPolicy};
use boxoffice_operations::operations::purchase::TicketPurchaseSaga;
use boxoffice_operations::providers::{
    InMemoryEmailService, InMemoryEventRepository, InMemoryPaymentService, InMemoryTicketService,
};
use boxoffice_operations::traits::EventRepository;
use boxoffice_store::{EventStore, InMemoryEventStore};
use chrono::Utc;
use proptest::prelude::*;

type Saga = TicketPurchaseSaga<
    InMemoryEventRepository,
    InMemoryTicketService<InMemoryEventRepository>,
    InMemoryPaymentService,
    InMemoryEmailService,
    InMemoryEventStore,
>;

fn setup(
    capacity: u32,
    payment_faults: FaultInjector,
) -> (Saga, Arc<InMemoryEventRepository>, Arc<InMemoryEventStore>) {
    let repository = Arc::new(InMemoryEventRepository::with_events([Event::new(
        "event-001",
        "Rock Concert",
        Utc::now(),
        Money::from_major(10),
        capacity,
    )]));
    let store = Arc::new(InMemoryEventStore::new());
    let saga = TicketPurchaseSaga::new(
        Arc::clone(&repository),
        Arc::new(InMemoryTicketService::new(
            Arc::clone(&repository),
            FaultInjector::never(),
        )),
        Arc::new(InMemoryPaymentService::new(
            Money::from_major(1_000_000),
            payment_faults,
        )),
        Arc::new(InMemoryEmailService::default()),
        Arc::clone(&store),
    );
    (saga, repository, store)
}

fn sold(repository: &InMemoryEventRepository) -> u32 {
    repository
        .find_by_id("event-001")
        .expect("event exists")
        .sold_tickets()
}

#[test]
fn concurrent_buyers_never_oversell() {
    let (saga, repository, _) = setup(50, FaultInjector::never());
    let saga = Arc::new(saga);
    let done = AtomicBool::new(false);

    let sold_by_buyers: u32 = thread::scope(|scope| {
        let observer = scope.spawn(|| {
            let mut max_seen = 0;
            while !done.load(Ordering::SeqCst) {
                max_seen = max_seen.max(sold(&repository));
            }
            max_seen
        });

        let buyers: Vec<_> = (0..16)
            .map(|n| {
                let saga = Arc::clone(&saga);
                scope.spawn(move || {
                    let user = format!("user-{n}");
                    (0..5)
                        .filter_map(|_| saga.handle(&user, "event-001", 1).ok())
                        .map(|outcome| outcome.ticket.quantity)
                        .sum::<u32>()
                })
            })
            .collect();

        let total = buyers
            .into_iter()
            .map(|b| b.join().expect("buyer panicked"))
            .sum();
        done.store(true, Ordering::SeqCst);
        assert!(observer.join().expect("observer panicked") <= 50);
        total
    });

    assert_eq!(sold_by_buyers, 50);
    assert_eq!(sold(&repository), 50);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        ..ProptestConfig::default()
    })]

    /// Successful purchases account for every sold seat, and failed ones
    /// leave nothing behind, whether they fail on capacity or on payment.
    #[test]
    fn sold_tickets_match_successful_purchases(
        capacity in 1_u32..40,
        quantities in prop::collection::vec(1_u32..6, 1..24),
        fail_every in prop::option::of(2_u64..5),
    ) {
        let faults = match fail_every {
            Some(call) => FaultInjector::new(FaultPolicy::OnCall { call }),
            None => FaultInjector::never(),
        };
        let (saga, repository, store) = setup(capacity, faults);

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = quantities
                .iter()
                .enumerate()
                .map(|(n, &quantity)| {
                    let saga = &saga;
                    scope.spawn(move || saga.handle(&format!("user-{n}"), "event-001", quantity))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("buyer panicked"))
                .collect()
        });

        let mut expected_sold = 0;
        for result in &results {
            match result {
                Ok(outcome) => expected_sold += outcome.ticket.quantity,
                Err(err) => {
                    prop_assert!(err.is_terminal());
                    let kind = err.kind();
                    prop_assert!(
                        kind == Some(ErrorKind::Capacity) || kind == Some(ErrorKind::Transient),
                        "unexpected failure: {err}"
                    );
                    prop_assert!(err.compensation_failures().is_empty());
                }
            }
        }

        prop_assert!(sold(&repository) <= capacity);
        prop_assert_eq!(sold(&repository), expected_sold);

        for saga_id in store.saga_ids() {
            let versions: Vec<u64> = store.get_events(&saga_id).iter().map(|e| e.version).collect();
            let expected: Vec<u64> = (1..=versions.len() as u64).collect();
            prop_assert_eq!(versions, expected);
        }
    }
}
