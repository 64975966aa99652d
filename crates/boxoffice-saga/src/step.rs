/// One unit of work in a saga, paired with the action that undoes it.
///
/// `execute` turns the previous step's output into this step's output. The
/// executor keeps a copy of that output, and if a later step fails it hands
/// the copy back to `compensate` so the step can reverse precisely what it did.
///
/// `Context` carries the shared collaborators. It is borrowed by every step
/// and never flows between them.
pub trait SagaStep: Send + Sync {
    /// Output of the previous step, or the saga's own input for the first step.
    type Input: Clone + Send + 'static;

    /// Handed to the next step and kept for compensation.
    type Output: Clone + Send + 'static;

    type Context;

    type Error;

    /// Stable name used in logs, audit records and error messages.
    fn name(&self) -> &'static str;

    /// Do the forward work.
    ///
    /// # Errors
    ///
    /// Any failure that stops the saga. A failed step is never
    /// compensated, so it must not leave a committed side effect behind.
    fn execute(&self, ctx: &Self::Context, input: Self::Input)
    -> Result<Self::Output, Self::Error>;

    /// Reverse the forward work, given the output it produced.
    ///
    /// Runs at most once per execution, and only after `execute` succeeded.
    /// Steps with nothing to reverse can rely on the no-op default.
    ///
    /// # Errors
    ///
    /// A failure here is collected and reported; the rollback keeps going.
    fn compensate(&self, ctx: &Self::Context, output: Self::Output) -> Result<(), Self::Error> {
        let _ = (ctx, output);
        Ok(())
    }

    /// Short phrase describing the compensation, for logs and error reports.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}
