use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, EntityKind, Result};
use crate::money::Money;

/// A ticketed event and its capacity counters.
///
/// `sold_tickets` never exceeds `max_tickets`; the only mutators are
/// [`Event::reserve`] and [`Event::release`], and both check the bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub unit_price: Money,
    max_tickets: u32,
    sold_tickets: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EventRecord {
    id: String,
    name: String,
    date: DateTime<Utc>,
    unit_price: Money,
    max_tickets: u32,
    #[serde(default)]
    sold_tickets: u32,
}

impl TryFrom<EventRecord> for Event {
    type Error = DomainError;

    fn try_from(record: EventRecord) -> Result<Self> {
        Event::new(
            record.id,
            record.name,
            record.date,
            record.unit_price,
            record.max_tickets,
        )
        .with_sold_tickets(record.sold_tickets)
    }
}

impl Event {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: DateTime<Utc>,
        unit_price: Money,
        max_tickets: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date,
            unit_price,
            max_tickets,
            sold_tickets: 0,
        }
    }

    /// Start from an already partially sold event.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCapacity` if `sold` exceeds `max_tickets`.
    pub fn with_sold_tickets(mut self, sold: u32) -> Result<Self> {
        if sold > self.max_tickets {
            return Err(DomainError::InsufficientCapacity {
                event_id: self.id,
                requested: sold,
                remaining: self.max_tickets,
            });
        }
        self.sold_tickets = sold;
        Ok(self)
    }

    #[must_use]
    pub fn max_tickets(&self) -> u32 {
        self.max_tickets
    }

    #[must_use]
    pub fn sold_tickets(&self) -> u32 {
        self.sold_tickets
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.max_tickets - self.sold_tickets
    }

    /// Validate a reservation request without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for zero and `InsufficientCapacity` when fewer
    /// than `quantity` tickets remain.
    pub fn check_available(&self, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        if quantity > self.remaining() {
            return Err(DomainError::InsufficientCapacity {
                event_id: self.id.clone(),
                requested: quantity,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Price of `quantity` tickets at this event's unit price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for zero or when the total overflows.
    pub fn price_for(&self, quantity: u32) -> Result<Money> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        self.unit_price
            .checked_times(quantity)
            .ok_or(DomainError::InvalidQuantity { quantity })
    }

    /// Count `quantity` more tickets as sold.
    ///
    /// # Errors
    ///
    /// Same as [`Event::check_available`]; nothing changes on error.
    pub fn reserve(&mut self, quantity: u32) -> Result<()> {
        self.check_available(quantity)?;
        self.sold_tickets += quantity;
        Ok(())
    }

    /// Return `quantity` previously sold tickets to the pool.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if fewer than `quantity` tickets are sold.
    pub fn release(&mut self, quantity: u32) -> Result<()> {
        if quantity > self.sold_tickets {
            return Err(DomainError::InvalidState {
                kind: EntityKind::Event,
                id: self.id.clone(),
                status: format!("{} sold", self.sold_tickets),
                operation: "release tickets of",
            });
        }
        self.sold_tickets -= quantity;
        Ok(())
    }
}
