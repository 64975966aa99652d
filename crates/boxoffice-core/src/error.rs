use std::fmt;

use thiserror::Error;

use crate::money::Money;

/// The kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Event,
    Ticket,
    Payment,
    Saga,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Event => "event",
            Self::Ticket => "ticket",
            Self::Payment => "payment",
            Self::Saga => "saga",
        };
        write!(f, "{s}")
    }
}

/// Coarse classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected before any state was touched.
    Validation,
    /// The referenced entity does not exist.
    NotFound,
    /// The request would exceed an event's capacity.
    Capacity,
    /// A collaborator was temporarily unavailable.
    Transient,
    /// The operation is invalid for the entity's current status.
    StateConflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: u32 },

    #[error("payment amount must be positive, got {amount}")]
    InvalidAmount { amount: Money },

    #[error("payment of {amount} exceeds the limit of {limit}")]
    LimitExceeded { amount: Money, limit: Money },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("event '{event_id}' has {remaining} ticket(s) left, {requested} requested")]
    InsufficientCapacity {
        event_id: String,
        requested: u32,
        remaining: u32,
    },

    #[error("{service} unavailable: {reason}")]
    Transient {
        service: &'static str,
        reason: String,
    },

    #[error("ticket '{ticket_id}' is already cancelled")]
    AlreadyCancelled { ticket_id: String },

    #[error("cannot {operation} {kind} '{id}' in status '{status}'")]
    InvalidState {
        kind: EntityKind,
        id: String,
        status: String,
        operation: &'static str,
    },
}

impl DomainError {
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn transient(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Transient {
            service,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity { .. }
            | Self::InvalidAmount { .. }
            | Self::LimitExceeded { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientCapacity { .. } => ErrorKind::Capacity,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::AlreadyCancelled { .. } | Self::InvalidState { .. } => ErrorKind::StateConflict,
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
