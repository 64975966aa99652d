use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::audit::SagaAuditLog;
use crate::erased::{ErasedStep, StepValue};
use crate::error::{CompensationError, SagaError};

/// Outputs of completed steps, newest last, waiting to be undone.
type Undo = Vec<(usize, Box<dyn StepValue>)>;

/// An ordered chain of steps, produced by [`SagaBuilder::build`].
///
/// Steps run one after another on the calling thread. Every completed step
/// leaves its output on an undo stack. When a step fails the stack is popped
/// until empty, so completed steps are compensated newest first and each one
/// exactly once. The failing step itself is not compensated.
///
/// Holds no per-run state: one instance may be executed any number of times,
/// including concurrently.
///
/// [`SagaBuilder::build`]: crate::SagaBuilder::build
pub struct Saga<Input, Output, Ctx, Err> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>,
    _phantom: PhantomData<fn(Input) -> Output>,
}

impl<Input, Output, Ctx, Err> Saga<Input, Output, Ctx, Err>
where
    Input: Clone + Send + 'static,
    Output: Send + 'static,
    Err: Debug + Display,
{
    pub(crate) fn from_steps(steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>) -> Self {
        Self {
            steps,
            _phantom: PhantomData,
        }
    }

    /// Step names in the order they run.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true: the builder refuses to build without a step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step and return the last step's output.
    ///
    /// # Errors
    ///
    /// [`SagaError::StepFailed`] when a step fails and the rollback finishes
    /// cleanly, [`SagaError::CompensationFailed`] when at least one
    /// compensation also fails during that rollback.
    pub fn execute(&self, ctx: &Ctx, input: Input) -> Result<Output, SagaError<Err>> {
        self.run(ctx, input).0
    }

    /// Like [`Saga::execute`], but also hands back a per-step record of what
    /// ran, what failed and what was rolled back.
    pub fn execute_with_audit(
        &self,
        ctx: &Ctx,
        input: Input,
    ) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        self.run(ctx, input)
    }

    fn run(&self, ctx: &Ctx, input: Input) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        let mut log = SagaAuditLog::new();
        let mut undo: Undo = Vec::with_capacity(self.steps.len());
        let mut value: Box<dyn StepValue> = Box::new(input);

        for (index, step) in self.steps.iter().enumerate() {
            let ordinal = index + 1;
            log.record_start(ordinal, step.name());
            debug!(ordinal, step = step.name(), "running saga step");

            let error = match step.execute_erased(ctx, value) {
                Ok(output) => {
                    log.record_success(step.compensation_description());
                    undo.push((index, output.clone_value()));
                    value = output;
                    continue;
                }
                Err(error) => error,
            };

            warn!(ordinal, step = step.name(), %error, "saga step failed, rolling back");
            log.record_failure(error.to_string());
            let failure = self.roll_back(ctx, &mut log, undo, index, error);
            return (Err(failure), log);
        }

        let output = value
            .into_any()
            .downcast::<Output>()
            .expect("builder chains the last step's output to the saga output");
        (Ok(*output), log)
    }

    fn roll_back(
        &self,
        ctx: &Ctx,
        log: &mut SagaAuditLog,
        mut undo: Undo,
        failed_index: usize,
        step_error: Err,
    ) -> SagaError<Err> {
        let mut failures = Vec::new();

        while let Some((index, output)) = undo.pop() {
            let step = &self.steps[index];
            let ordinal = index + 1;

            if let Err(error) = step.compensate_erased(ctx, output) {
                warn!(ordinal, step = step.name(), %error, "compensation failed, rollback continues");
                log.record_compensation_failed(ordinal, error.to_string());
                failures.push(CompensationError {
                    ordinal,
                    step: step.name().to_string(),
                    description: step.compensation_description(),
                    error,
                });
            } else {
                debug!(ordinal, step = step.name(), "saga step compensated");
                log.record_compensated(ordinal);
            }
        }

        let ordinal = failed_index + 1;
        let step = self.steps[failed_index].name().to_string();

        if failures.is_empty() {
            return SagaError::StepFailed {
                ordinal,
                step,
                source: step_error,
            };
        }

        SagaError::CompensationFailed {
            ordinal,
            failed_step: step,
            step_error,
            compensation_errors: failures,
        }
    }
}
