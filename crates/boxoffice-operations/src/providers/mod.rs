mod email;
mod event_repository;
mod payment;
mod ticketing;

pub use email::{InMemoryEmailService, SentConfirmation};
pub use event_repository::InMemoryEventRepository;
pub use payment::InMemoryPaymentService;
pub use ticketing::InMemoryTicketService;
