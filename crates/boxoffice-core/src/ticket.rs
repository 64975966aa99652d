use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, EntityKind, Result};
use crate::event::Event;
use crate::ids::prefixed_id;
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Reserved,
    Cancelled,
    Confirmed,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reserved => "reserved",
            Self::Cancelled => "cancelled",
            Self::Confirmed => "confirmed",
        };
        write!(f, "{s}")
    }
}

/// A reservation of one or more seats at an event.
///
/// Status moves from `Reserved` to either `Confirmed` or `Cancelled`, once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    status: TicketStatus,
    pub quantity: u32,
    pub total_price: Money,
    pub reserved_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a reservation against `event` without touching its counters.
    ///
    /// The total price is fixed here from the event's unit price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` or `InsufficientCapacity` if the event cannot
    /// take `quantity` more tickets.
    pub fn new(event: &Event, user_id: impl Into<String>, quantity: u32) -> Result<Self> {
        event.check_available(quantity)?;
        let total_price = event.price_for(quantity)?;

        Ok(Self {
            id: prefixed_id("tkt"),
            event_id: event.id.clone(),
            user_id: user_id.into(),
            status: TicketStatus::Reserved,
            quantity,
            total_price,
            reserved_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// # Errors
    ///
    /// Returns `AlreadyCancelled` for a cancelled ticket and `InvalidState`
    /// for a confirmed one.
    pub fn cancel(&mut self) -> Result<()> {
        match self.status {
            TicketStatus::Reserved => {
                self.status = TicketStatus::Cancelled;
                Ok(())
            }
            TicketStatus::Cancelled => Err(DomainError::AlreadyCancelled {
                ticket_id: self.id.clone(),
            }),
            TicketStatus::Confirmed => Err(self.invalid_state("cancel")),
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidState` unless the ticket is still reserved.
    pub fn confirm(&mut self) -> Result<()> {
        if self.status != TicketStatus::Reserved {
            return Err(self.invalid_state("confirm"));
        }
        self.status = TicketStatus::Confirmed;
        Ok(())
    }

    /// Revert a cancellation whose capacity release could not be applied.
    ///
    /// Has no effect unless the ticket is cancelled.
    pub fn reopen(&mut self) {
        if self.status == TicketStatus::Cancelled {
            self.status = TicketStatus::Reserved;
        }
    }

    fn invalid_state(&self, operation: &'static str) -> DomainError {
        DomainError::InvalidState {
            kind: EntityKind::Ticket,
            id: self.id.clone(),
            status: self.status.to_string(),
            operation,
        }
    }
}
