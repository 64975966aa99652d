mod email_service;
mod event_repository;
mod payment_service;
mod ticket_service;

pub use email_service::EmailService;
pub use event_repository::EventRepository;
pub use payment_service::PaymentService;
pub use ticket_service::TicketService;
