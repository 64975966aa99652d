use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use crate::erased::{ErasedStep, StepWrapper};
use crate::saga::Saga;
use crate::step::SagaStep;

/// Builder state before the first step.
pub struct Empty;

/// Builder state once a step producing `LastOutput` has been added.
pub struct HasSteps<LastOutput>(PhantomData<LastOutput>);

/// Assembles a [`Saga`] one step at a time.
///
/// The state parameter tracks the output type of the last step, so chaining
/// a step whose input does not match, or building with no steps at all, is a
/// type error rather than a runtime one.
///
/// ```compile_fail
/// use boxoffice_saga::{SagaBuilder, SagaStep};
///
/// struct Reserve;
/// impl SagaStep for Reserve {
///     type Input = u32;
///     type Output = String;
///     type Context = ();
///     type Error = ();
///     fn name(&self) -> &'static str { "reserve" }
///     fn execute(&self, _: &(), seats: u32) -> Result<String, ()> {
///         Ok(format!("hold-{seats}"))
///     }
/// }
///
/// struct Charge;
/// impl SagaStep for Charge {
///     type Input = u32;
///     type Output = u32;
///     type Context = ();
///     type Error = ();
///     fn name(&self) -> &'static str { "charge" }
///     fn execute(&self, _: &(), amount: u32) -> Result<u32, ()> {
///         Ok(amount)
///     }
/// }
///
/// // Charge expects u32 but Reserve outputs String
/// let saga = SagaBuilder::new()
///     .first_step(Reserve)
///     .then(Charge)
///     .build();
/// ```
///
/// ```compile_fail
/// use boxoffice_saga::SagaBuilder;
///
/// // `build()` is only available after `first_step()`
/// let saga = SagaBuilder::<(), (), (), ()>::new().build();
/// ```
pub struct SagaBuilder<Input, Output, Ctx, Err, State> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>,
    _phantom: PhantomData<(Input, Output, State)>,
}

impl<Ctx, Err> SagaBuilder<(), (), Ctx, Err, Empty> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Start the chain. The saga's input type is this step's input type.
    #[must_use]
    pub fn first_step<S>(
        self,
        step: S,
    ) -> SagaBuilder<S::Input, S::Output, Ctx, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Context = Ctx, Error = Err> + 'static,
    {
        self.push(step)
    }
}

impl<Input, Output, Ctx, Err, State> SagaBuilder<Input, Output, Ctx, Err, State> {
    fn push<In, S>(mut self, step: S) -> SagaBuilder<In, S::Output, Ctx, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Context = Ctx, Error = Err> + 'static,
    {
        self.steps.push(Box::new(StepWrapper::new(step)));
        SagaBuilder {
            steps: self.steps,
            _phantom: PhantomData,
        }
    }
}

impl<Ctx, Err> Default for SagaBuilder<(), (), Ctx, Err, Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Input, CurrentOutput, Ctx, Err>
    SagaBuilder<Input, CurrentOutput, Ctx, Err, HasSteps<CurrentOutput>>
{
    /// Append a step that consumes the previous step's output.
    #[must_use]
    pub fn then<S>(self, step: S) -> SagaBuilder<Input, S::Output, Ctx, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Input = CurrentOutput, Context = Ctx, Error = Err> + 'static,
    {
        self.push(step)
    }

    /// Number of steps added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: a builder in this state holds at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Freeze the chain into an executable saga.
    #[must_use]
    pub fn build(self) -> Saga<Input, CurrentOutput, Ctx, Err>
    where
        Input: Clone + Send + 'static,
        CurrentOutput: Send + 'static,
        Err: Debug + Display,
    {
        Saga::from_steps(self.steps)
    }
}
