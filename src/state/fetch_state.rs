/// Fetch state definitions for tracking a single page task
///
/// Every page task walks the same small machine:
///
/// ```text
/// Pending -> Attempting -> Succeeded
///                |-------> Failed
///                |-------> Retrying -> Attempting -> ...
/// ```
use crate::HarvestError;
use std::fmt;

/// Represents the current state of one page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    // ===== Active States =====
    /// Task created, not yet admitted
    Pending,

    /// A request is in flight
    Attempting,

    /// The last attempt failed transiently; backing off before the next one
    Retrying,

    // ===== Terminal States =====
    /// The page body was retrieved
    Succeeded,

    /// Permanent failure or retries exhausted; the page is skipped
    Failed,
}

impl FetchState {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: FetchState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Attempting)
                | (Self::Attempting, Self::Succeeded)
                | (Self::Attempting, Self::Retrying)
                | (Self::Attempting, Self::Failed)
                | (Self::Retrying, Self::Attempting)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(self, next: FetchState) -> Result<FetchState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Attempting => "attempting",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt bookkeeping for one page task
///
/// Wraps a [`FetchState`] together with the attempt budget (`1 + max_retries`).
#[derive(Debug, Clone)]
pub struct FetchTracker {
    state: FetchState,
    attempts: u32,
    max_retries: u32,
}

impl FetchTracker {
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: FetchState::Pending,
            attempts: 0,
            max_retries,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Number of attempts started so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Marks the start of a new attempt
    pub fn begin_attempt(&mut self) -> Result<u32, HarvestError> {
        self.state = self.state.transition(FetchState::Attempting)?;
        self.attempts += 1;
        Ok(self.attempts)
    }

    pub fn succeed(&mut self) -> Result<(), HarvestError> {
        self.state = self.state.transition(FetchState::Succeeded)?;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), HarvestError> {
        self.state = self.state.transition(FetchState::Failed)?;
        Ok(())
    }

    /// Records a transient failure
    ///
    /// Moves to `Retrying` when attempts remain and returns `true`; otherwise the
    /// task becomes `Failed` and `false` is returned.
    pub fn transient_failure(&mut self) -> Result<bool, HarvestError> {
        if self.attempts <= self.max_retries {
            self.state = self.state.transition(FetchState::Retrying)?;
            Ok(true)
        } else {
            self.fail()?;
            Ok(false)
        }
    }
}
