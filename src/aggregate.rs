//! Required-failure aggregation
//!
//! Fail-fast schemas stop at the first required failure; collecting schemas
//! keep walking and report every required failure at the end.

use crate::error::{AggregatedError, FieldFailure};

/// How required failures are surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    #[default]
    FailFast,
    Collect,
}

impl ErrorMode {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            ErrorMode::FailFast
        } else {
            ErrorMode::Collect
        }
    }
}

#[derive(Debug, Default)]
pub struct ErrorAggregator {
    mode: ErrorMode,
    failures: Vec<FieldFailure>,
}

impl ErrorAggregator {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            failures: Vec::new(),
        }
    }

    /// Record a required failure; in fail-fast mode the walk aborts here
    pub fn record(&mut self, failure: FieldFailure) -> Result<(), AggregatedError> {
        match self.mode {
            ErrorMode::FailFast => Err(AggregatedError::single(failure)),
            ErrorMode::Collect => {
                self.failures.push(failure);
                Ok(())
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Raise everything collected, if anything was
    pub fn finish(self) -> Result<(), AggregatedError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(AggregatedError::new(self.failures))
        }
    }
}
