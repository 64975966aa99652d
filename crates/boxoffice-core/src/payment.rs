use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, EntityKind, Result};
use crate::ids::prefixed_id;
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processed,
    Refunded,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Processed => "processed",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub amount: Money,
    status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// A successfully processed payment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` unless `amount` is positive.
    pub fn processed(user_id: impl Into<String>, amount: Money) -> Result<Self> {
        if !amount.is_positive() {
            return Err(DomainError::InvalidAmount { amount });
        }
        Ok(Self::with_status(user_id, amount, PaymentStatus::Processed))
    }

    /// A record of a charge attempt that the gateway rejected.
    #[must_use]
    pub fn failed(user_id: impl Into<String>, amount: Money) -> Self {
        Self::with_status(user_id, amount, PaymentStatus::Failed)
    }

    fn with_status(user_id: impl Into<String>, amount: Money, status: PaymentStatus) -> Self {
        Self {
            id: prefixed_id("pay"),
            user_id: user_id.into(),
            amount,
            status,
            paid_at: Utc::now(),
            refunded_at: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Refund the payment. Returns `false` if it was already refunded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` for a failed payment, which has nothing to refund.
    pub fn refund(&mut self) -> Result<bool> {
        match self.status {
            PaymentStatus::Processed => {
                self.status = PaymentStatus::Refunded;
                self.refunded_at = Some(Utc::now());
                Ok(true)
            }
            PaymentStatus::Refunded => Ok(false),
            PaymentStatus::Failed => Err(DomainError::InvalidState {
                kind: EntityKind::Payment,
                id: self.id.clone(),
                status: self.status.to_string(),
                operation: "refund",
            }),
        }
    }
}
