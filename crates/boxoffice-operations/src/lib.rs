mod config;
mod error;
mod fault;
pub mod operations;
pub mod providers;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use config::{BoxofficeConfig, PaymentConfig, ServiceConfig, sample_events};
pub use error::{CompensationFailure, OperationError, Result};
pub use fault::{FaultInjector, FaultPolicy};
