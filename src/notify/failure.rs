// src/notify/failure.rs

pub const FAILURE_STEP: u32 = 10;
pub const RECOVERY_STEP: u32 = 1;
pub const DEFAULT_ABORT_COUNT: u32 = 100;

/// What the loop should do after a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Keep going.
    Continue,
    /// Tell the operator, then keep going.
    NotifyOperator,
    /// Stop the loop.
    Abort,
}

/// Kind of failure a cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network timeouts only; expected now and then.
    Timeout,
    Error,
}

/// Running failure score: grows by a step per failed cycle and decays by one
/// per clean cycle.
#[derive(Debug, Clone)]
pub struct FailureCounter {
    count: u32,
    notify_threshold: u32,
    abort_threshold: u32,
    operator_notified: bool,
}

impl FailureCounter {
    /// `repeated_failures` failed cycles in a row trigger the operator mail.
    pub fn new(repeated_failures: u32) -> Self {
        Self {
            count: 0,
            notify_threshold: repeated_failures.saturating_mul(FAILURE_STEP),
            abort_threshold: DEFAULT_ABORT_COUNT,
            operator_notified: false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Count in units of failed cycles, as shown to the operator.
    pub fn failures(&self) -> u32 {
        self.count / FAILURE_STEP
    }

    pub fn abort_failures(&self) -> u32 {
        self.abort_threshold / FAILURE_STEP
    }

    pub fn recover(&mut self) {
        self.count = self.count.saturating_sub(RECOVERY_STEP);
        if self.count <= self.notify_threshold {
            self.operator_notified = false;
        }
    }

    pub fn record(&mut self, kind: FailureKind) -> Escalation {
        self.count = self.count.saturating_add(FAILURE_STEP);

        if self.count > self.abort_threshold {
            return Escalation::Abort;
        }

        if kind == FailureKind::Error
            && self.count > self.notify_threshold
            && !self.operator_notified
        {
            self.operator_notified = true;
            return Escalation::NotifyOperator;
        }

        Escalation::Continue
    }
}
