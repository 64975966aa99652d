use std::any::Any;

use crate::step::SagaStep;

/// Type-erased value passed between steps.
///
/// Steps are stored behind a single trait object type, so inputs and outputs
/// travel as boxed values that can still be cloned for the compensation stack
/// and downcast back by the step that owns their concrete type.
pub(crate) trait StepValue: Any + Send {
    fn clone_value(&self) -> Box<dyn StepValue>;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T> StepValue for T
where
    T: Clone + Send + 'static,
{
    fn clone_value(&self) -> Box<dyn StepValue> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

pub(crate) trait ErasedStep<Ctx, Err>: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute_erased(
        &self,
        ctx: &Ctx,
        input: Box<dyn StepValue>,
    ) -> Result<Box<dyn StepValue>, Err>;

    fn compensate_erased(&self, ctx: &Ctx, output: Box<dyn StepValue>) -> Result<(), Err>;

    fn compensation_description(&self) -> String;
}

pub(crate) struct StepWrapper<S> {
    step: S,
}

impl<S> StepWrapper<S> {
    pub(crate) fn new(step: S) -> Self {
        Self { step }
    }
}

impl<S> ErasedStep<S::Context, S::Error> for StepWrapper<S>
where
    S: SagaStep,
{
    fn name(&self) -> &'static str {
        self.step.name()
    }

    fn execute_erased(
        &self,
        ctx: &S::Context,
        input: Box<dyn StepValue>,
    ) -> Result<Box<dyn StepValue>, S::Error> {
        let typed_input = input
            .into_any()
            .downcast::<S::Input>()
            .expect("type-state builder guarantees correct input type");
        let output = self.step.execute(ctx, *typed_input)?;
        Ok(Box::new(output))
    }

    fn compensate_erased(
        &self,
        ctx: &S::Context,
        output: Box<dyn StepValue>,
    ) -> Result<(), S::Error> {
        let typed_output = output
            .into_any()
            .downcast::<S::Output>()
            .expect("executor only stores a step's own output for compensation");
        self.step.compensate(ctx, *typed_output)
    }

    fn compensation_description(&self) -> String {
        self.step.compensation_description()
    }
}
