use std::path::PathBuf;

use boxoffice_core::{DomainError, ErrorKind, SagaId};
use boxoffice_saga::SagaError;
use boxoffice_store::StoreError;
use thiserror::Error;

/// Details about a failed compensation during saga rollback.
#[derive(Debug)]
pub struct CompensationFailure {
    /// 1-based position of the step whose compensation failed.
    pub ordinal: usize,
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The error that occurred during compensation.
    pub error: Box<OperationError>,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to record audit event")]
    Store(#[from] StoreError),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("purchase saga {saga_id} failed at step {ordinal} '{step}'")]
    SagaFailed {
        saga_id: SagaId,
        ordinal: usize,
        step: String,
        #[source]
        source: Box<OperationError>,
    },

    #[error(
        "purchase saga {saga_id} failed at step {ordinal} '{step}' and {} compensation(s) also failed",
        compensation_failures.len()
    )]
    SagaCompensationFailed {
        saga_id: SagaId,
        ordinal: usize,
        step: String,
        #[source]
        source: Box<OperationError>,
        compensation_failures: Vec<CompensationFailure>,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

impl OperationError {
    /// Wrap an engine error as the terminal error of saga `saga_id`.
    #[must_use]
    pub fn from_saga(saga_id: SagaId, err: SagaError<OperationError>) -> Self {
        let (ordinal, step, step_error, compensation_errors) = err.into_parts();
        let source = Box::new(step_error);

        if compensation_errors.is_empty() {
            return Self::SagaFailed {
                saga_id,
                ordinal,
                step,
                source,
            };
        }

        let compensation_failures = compensation_errors
            .into_iter()
            .map(|e| CompensationFailure {
                ordinal: e.ordinal,
                step: e.step,
                description: e.description,
                error: Box::new(e.error),
            })
            .collect();
        Self::SagaCompensationFailed {
            saga_id,
            ordinal,
            step,
            source,
            compensation_failures,
        }
    }

    /// Whether this is the single terminal error of a saga run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SagaFailed { .. } | Self::SagaCompensationFailed { .. }
        )
    }

    /// 1-based position of the failed step, for terminal errors.
    #[must_use]
    pub fn failed_ordinal(&self) -> Option<usize> {
        match self {
            Self::SagaFailed { ordinal, .. } | Self::SagaCompensationFailed { ordinal, .. } => {
                Some(*ordinal)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn saga_id(&self) -> Option<SagaId> {
        match self {
            Self::SagaFailed { saga_id, .. } | Self::SagaCompensationFailed { saga_id, .. } => {
                Some(*saga_id)
            }
            _ => None,
        }
    }

    /// Failures of compensations that ran during rollback; empty unless the
    /// rollback was incomplete.
    #[must_use]
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        match self {
            Self::SagaCompensationFailed {
                compensation_failures,
                ..
            } => compensation_failures,
            _ => &[],
        }
    }

    /// The domain error at the root of this error, looking through saga
    /// wrappers.
    #[must_use]
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::SagaFailed { source, .. } | Self::SagaCompensationFailed { source, .. } => {
                source.domain_error()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.domain_error().map(DomainError::kind)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use boxoffice_core::{EntityKind, Money};
    use boxoffice_saga::CompensationError;

    use super::*;

    fn declined() -> OperationError {
        OperationError::Domain(DomainError::LimitExceeded {
            amount: Money::from_major(1500),
            limit: Money::from_major(1000),
        })
    }

    #[test]
    fn clean_rollback_becomes_saga_failed() {
        let saga_id = SagaId::new();
        let err = OperationError::from_saga(
            saga_id,
            SagaError::StepFailed {
                ordinal: 2,
                step: "process_payment".to_string(),
                source: declined(),
            },
        );

        assert!(err.is_terminal());
        assert_eq!(err.failed_ordinal(), Some(2));
        assert_eq!(err.saga_id(), Some(saga_id));
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert!(err.compensation_failures().is_empty());
        assert!(err.to_string().contains("step 2 'process_payment'"));
    }

    #[test]
    fn failed_compensation_keeps_step_error_as_source() {
        let err = OperationError::from_saga(
            SagaId::new(),
            SagaError::CompensationFailed {
                ordinal: 2,
                failed_step: "process_payment".to_string(),
                step_error: declined(),
                compensation_errors: vec![CompensationError {
                    ordinal: 1,
                    step: "reserve_ticket".to_string(),
                    description: "cancel the reserved ticket".to_string(),
                    error: OperationError::Domain(DomainError::not_found(
                        EntityKind::Ticket,
                        "tkt-1",
                    )),
                }],
            },
        );

        assert!(matches!(err, OperationError::SagaCompensationFailed { .. }));
        assert_eq!(err.compensation_failures().len(), 1);
        assert_eq!(err.compensation_failures()[0].ordinal, 1);
        assert_eq!(err.kind(), Some(ErrorKind::Validation));

        let source = err.source().expect("has source");
        assert!(source.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn non_saga_errors_are_not_terminal() {
        let err = OperationError::from(DomainError::not_found(EntityKind::Event, "event-404"));

        assert!(!err.is_terminal());
        assert_eq!(err.failed_ordinal(), None);
        assert_eq!(err.saga_id(), None);
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn config_parse_error_includes_path() {
        let source = toml::from_str::<toml::Table>("not = [valid").expect_err("invalid toml");
        let err = OperationError::ConfigParse {
            path: PathBuf::from("/etc/boxoffice.toml"),
            source,
        };

        assert!(err.to_string().contains("/etc/boxoffice.toml"));
        assert!(err.source().is_some());
    }
}
