use std::fmt::Debug;

use thiserror::Error;

/// Error from a failed compensation operation.
#[derive(Debug, thiserror::Error)]
#[error("compensation failed for step {ordinal} '{step}': {description}")]
pub struct CompensationError<E> {
    /// 1-based position of the step whose compensation failed.
    pub ordinal: usize,
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: E,
}

/// Error from saga execution.
///
/// The failing step's error is always the primary cause. Compensation errors
/// are reported alongside it and never replace it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SagaError<E: Debug> {
    /// A step failed and all compensations succeeded.
    #[error("step {ordinal} '{step}' failed")]
    StepFailed {
        /// 1-based position of the failed step.
        ordinal: usize,
        /// Name of the step that failed.
        step: String,
        /// The error that caused the step to fail.
        #[source]
        source: E,
    },

    /// A step failed and some compensations also failed.
    #[error("step {ordinal} '{failed_step}' failed, and {} compensation(s) also failed", compensation_errors.len())]
    CompensationFailed {
        /// 1-based position of the failed step.
        ordinal: usize,
        /// Name of the step that originally failed.
        failed_step: String,
        /// The error from the failed step.
        #[source]
        step_error: E,
        /// Errors from failed compensations, in the order they were attempted.
        compensation_errors: Vec<CompensationError<E>>,
    },
}

impl<E: Debug> SagaError<E> {
    /// 1-based position of the step that failed.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        match self {
            Self::StepFailed { ordinal, .. } | Self::CompensationFailed { ordinal, .. } => {
                *ordinal
            }
        }
    }

    /// Name of the step that failed.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::StepFailed { step, .. } => step,
            Self::CompensationFailed { failed_step, .. } => failed_step,
        }
    }

    /// The error that made the failing step fail.
    #[must_use]
    pub fn step_error(&self) -> &E {
        match self {
            Self::StepFailed { source, .. } => source,
            Self::CompensationFailed { step_error, .. } => step_error,
        }
    }

    /// Split into ordinal, failed step name, step error and compensation errors.
    #[must_use]
    pub fn into_parts(self) -> (usize, String, E, Vec<CompensationError<E>>) {
        match self {
            Self::StepFailed {
                ordinal,
                step,
                source,
            } => (ordinal, step, source, Vec::new()),
            Self::CompensationFailed {
                ordinal,
                failed_step,
                step_error,
                compensation_errors,
            } => (ordinal, failed_step, step_error, compensation_errors),
        }
    }

    /// Compensations that failed during rollback, in the order they ran.
    #[must_use]
    pub fn compensation_errors(&self) -> &[CompensationError<E>] {
        match self {
            Self::StepFailed { .. } => &[],
            Self::CompensationFailed {
                compensation_errors,
                ..
            } => compensation_errors,
        }
    }

    /// Whether every compensation ran to completion.
    #[must_use]
    pub fn rollback_complete(&self) -> bool {
        matches!(self, Self::StepFailed { .. })
    }
}
