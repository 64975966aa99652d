//! Saga executor for multi-step operations without a shared transaction.
//!
//! A saga runs its steps strictly in declaration order. Each step's output
//! becomes the next step's input and is also kept as the value its
//! compensation receives. When a step fails, every step that completed before
//! it is compensated in reverse order (LIFO) before the error is returned.

mod audit;
mod builder;
mod erased;
mod error;
mod saga;
mod step;

pub use audit::{SagaAuditLog, StepRecord, StepStatus};
pub use builder::SagaBuilder;
pub use error::{CompensationError, SagaError};
pub use saga::Saga;
pub use step::SagaStep;
