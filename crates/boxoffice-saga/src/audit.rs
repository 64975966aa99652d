use std::time::{Duration, Instant};

/// Where a step ended up during one saga run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Forward work finished.
    Executed,
    /// Forward work returned an error.
    Failed,
    /// Rolled back.
    Compensated,
    /// Rollback of this step returned an error.
    CompensationFailed,
}

impl StepStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Executed => "✓",
            Self::Failed => "✗",
            Self::Compensated => "↩",
            Self::CompensationFailed => "⚠",
        }
    }
}

/// What happened to one step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// 1-based position in the chain.
    pub ordinal: usize,
    pub name: String,
    pub status: StepStatus,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step last changed status (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Description of compensation, once the step has succeeded.
    pub compensation_description: Option<String>,
    /// Rendered error from execution or compensation, if either failed.
    pub error: Option<String>,
}

impl StepRecord {
    /// Time between the step starting and its last status change.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.completed_at
            .map(|done| done.saturating_duration_since(self.started_at))
    }
}

/// In-process record of every step execution and compensation of one saga run.
#[derive(Debug, Default, Clone)]
pub struct SagaAuditLog {
    records: Vec<StepRecord>,
}

impl SagaAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, ordinal: usize, name: &str) {
        self.records.push(StepRecord {
            ordinal,
            name: name.to_string(),
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
            error: None,
        });
    }

    pub(crate) fn record_failure(&mut self, error: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
            record.error = Some(error);
        }
    }

    pub(crate) fn record_success(&mut self, compensation_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    pub(crate) fn record_compensated(&mut self, ordinal: usize) {
        if let Some(record) = self.record_mut(ordinal) {
            record.status = StepStatus::Compensated;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_compensation_failed(&mut self, ordinal: usize, error: String) {
        if let Some(record) = self.record_mut(ordinal) {
            record.status = StepStatus::CompensationFailed;
            record.completed_at = Some(Instant::now());
            record.error = Some(error);
        }
    }

    fn record_mut(&mut self, ordinal: usize) -> Option<&mut StepRecord> {
        self.records.iter_mut().find(|r| r.ordinal == ordinal)
    }

    /// Records in the order the steps started.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Records of steps whose status matches `status`.
    pub fn with_status(&self, status: StepStatus) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(move |r| r.status == status)
    }

    /// One line per step: ordinal, status marker and name.
    #[must_use]
    pub fn summary(&self) -> String {
        self.records
            .iter()
            .map(|record| {
                let mut line =
                    format!("{}. {} {}", record.ordinal, record.status.marker(), record.name);
                if let Some(error) = &record.error {
                    line.push_str(": ");
                    line.push_str(error);
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
