use super::Status;
use crate::dispatch::DispatchError;

/// How one phase's chain finished.
#[must_use]
#[derive(Debug)]
pub enum Outcome {
    /// Every entry ran without stopping. Carries `OK` if some handler
    /// handled the phase, otherwise the decline fallback.
    Completed(Status),
    /// A handler returned a status that ends the phase.
    Stopped(Status),
    /// Resolution or handler failure. Never retried.
    Failed(DispatchError),
}

impl Outcome {
    /// Status to report upward. Failures map to 500.
    pub fn status(&self) -> Status {
        match self {
            Self::Completed(status) | Self::Stopped(status) => *status,
            Self::Failed(err) => err.status(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Status, DispatchError> {
        match self {
            Self::Completed(status) | Self::Stopped(status) => Ok(status),
            Self::Failed(err) => Err(err),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed(status) => write!(f, "completed ({})", status),
            Self::Stopped(status) => write!(f, "stopped ({})", status),
            Self::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

#[cfg(feature = "http")]
impl Outcome {
    /// Response status for this outcome, if it determines one.
    pub fn to_http(&self) -> Option<http::StatusCode> {
        self.status().to_http()
    }
}
