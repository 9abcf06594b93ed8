use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::sheets::types::CallStatus;

/// How a call ended, as written back to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The callee stayed on the line for at least the minimum duration.
    Success,
    /// The callee connected but hung up early, or the call could not be placed.
    Failed,
    /// The SIP leg never connected.
    NoAnswer,
}

impl CallOutcome {
    pub fn status(self) -> CallStatus {
        match self {
            CallOutcome::Success => CallStatus::Success,
            CallOutcome::Failed => CallStatus::Failed,
            CallOutcome::NoAnswer => CallStatus::NoAnswer,
        }
    }
}

/// Classify a finished SIP leg.
pub fn classify(
    joined_at: Option<DateTime<Utc>>,
    left_at: DateTime<Utc>,
    min_success: Duration,
) -> CallOutcome {
    let Some(joined_at) = joined_at else {
        return CallOutcome::NoAnswer;
    };

    let connected = (left_at - joined_at).to_std().unwrap_or(Duration::ZERO);
    if connected >= min_success {
        CallOutcome::Success
    } else {
        CallOutcome::Failed
    }
}

/// Join/leave bookkeeping for the SIP participant of one room.
#[derive(Debug, Clone)]
pub struct SipLifecycle {
    joined_at: Option<DateTime<Utc>>,
    min_success: Duration,
}

impl SipLifecycle {
    pub fn new(min_success: Duration) -> Self {
        Self {
            joined_at: None,
            min_success,
        }
    }

    /// A later join replaces the earlier timestamp.
    pub fn on_join(&mut self, at: DateTime<Utc>) {
        self.joined_at = Some(at);
    }

    pub fn on_leave(&self, at: DateTime<Utc>) -> CallOutcome {
        classify(self.joined_at, at, self.min_success)
    }

    pub fn has_joined(&self) -> bool {
        self.joined_at.is_some()
    }
}
