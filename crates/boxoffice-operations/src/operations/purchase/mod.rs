mod audit;
mod context;
mod operation;
mod saga_data;
mod saga_steps;

pub use audit::{FailedCompensation, PurchaseEvent};
pub use context::PurchaseSagaContext;
pub use operation::{PurchaseOutcome, TicketPurchaseSaga};
pub use saga_data::{PaidPurchase, PurchaseRequest, ReservedPurchase};
pub use saga_steps::{ProcessPaymentStep, ReserveTicketStep, SendConfirmationStep};
