mod error;
mod event;
mod ids;
mod money;
mod payment;
mod ticket;

pub use error::{DomainError, EntityKind, ErrorKind, Result};
pub use event::Event;
pub use ids::SagaId;
pub use money::{Money, ParseMoneyError};
pub use payment::{Payment, PaymentStatus};
pub use ticket::{Ticket, TicketStatus};
