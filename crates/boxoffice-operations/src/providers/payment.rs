use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use boxoffice_core::{DomainError, EntityKind, Money, Payment, Result, SagaId};
use tracing::{debug, warn};

use crate::fault::FaultInjector;
use crate::traits::PaymentService;

const SERVICE: &str = "payment gateway";

/// Payment gateway stand-in with a per-payment ceiling.
///
/// Charges rejected by the gateway are kept as `Failed` payments.
#[derive(Debug)]
pub struct InMemoryPaymentService {
    limit: Money,
    payments: RwLock<HashMap<String, Payment>>,
    faults: FaultInjector,
}

impl InMemoryPaymentService {
    #[must_use]
    pub fn new(limit: Money, faults: FaultInjector) -> Self {
        Self {
            limit,
            payments: RwLock::new(HashMap::new()),
            faults,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Money {
        self.limit
    }

    #[must_use]
    pub fn payments(&self) -> Vec<Payment> {
        self.payments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn store(&self, payment: Payment) {
        self.payments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(payment.id.clone(), payment);
    }
}

impl PaymentService for InMemoryPaymentService {
    fn process_payment(&self, saga_id: &SagaId, user_id: &str, amount: Money) -> Result<Payment> {
        if !amount.is_positive() {
            return Err(DomainError::InvalidAmount { amount });
        }

        if let Err(err) = self.faults.check(SERVICE) {
            let failed = Payment::failed(user_id, amount);
            warn!(saga_id = %saga_id, payment_id = %failed.id, %amount, %err, "payment declined");
            self.store(failed);
            return Err(err);
        }

        if amount > self.limit {
            return Err(DomainError::LimitExceeded {
                amount,
                limit: self.limit,
            });
        }

        let payment = Payment::processed(user_id, amount)?;
        debug!(saga_id = %saga_id, payment_id = %payment.id, %amount, "processed payment");
        self.store(payment.clone());
        Ok(payment)
    }

    fn refund_payment(&self, saga_id: &SagaId, payment_id: &str) -> Result<Payment> {
        let mut payments = self.payments.write().unwrap_or_else(PoisonError::into_inner);
        let payment = payments
            .get_mut(payment_id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Payment, payment_id))?;

        if payment.refund()? {
            debug!(saga_id = %saga_id, payment_id, amount = %payment.amount, "refunded payment");
        } else {
            debug!(saga_id = %saga_id, payment_id, "payment already refunded");
        }
        Ok(payment.clone())
    }

    fn payment(&self, payment_id: &str) -> Option<Payment> {
        self.payments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(payment_id)
            .cloned()
    }
}
