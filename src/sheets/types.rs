use std::fmt;

/// Call status as stored in the status column.
///
/// Values are matched exactly; anything unrecognised is kept verbatim in
/// `Other` and is never picked up for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    NoAnswer,
    Other(String),
}

impl CallStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "PENDING" => CallStatus::Pending,
            "IN_PROGRESS" => CallStatus::InProgress,
            "SUCCESS" => CallStatus::Success,
            "FAILED" => CallStatus::Failed,
            "NO_ANSWER" => CallStatus::NoAnswer,
            other => CallStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Pending => "PENDING",
            CallStatus::InProgress => "IN_PROGRESS",
            CallStatus::Success => "SUCCESS",
            CallStatus::Failed => "FAILED",
            CallStatus::NoAnswer => "NO_ANSWER",
            CallStatus::Other(value) => value,
        }
    }

    /// Rows waiting for a first call, or whose last attempt failed.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, CallStatus::Pending | CallStatus::Failed)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data row of the reminder sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 1-based sheet row number.
    pub row: u32,
    pub patient_name: String,
    pub phone_number: String,
    pub operation_type: String,
    pub status: CallStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrips_known_values() {
        for value in ["PENDING", "IN_PROGRESS", "SUCCESS", "FAILED", "NO_ANSWER"] {
            assert_eq!(CallStatus::parse(value).as_str(), value);
        }
    }

    #[test]
    fn test_status_matching_is_exact() {
        assert_eq!(CallStatus::parse("pending"), CallStatus::Other("pending".to_string()));
        assert_eq!(CallStatus::parse(" FAILED"), CallStatus::Other(" FAILED".to_string()));
        assert_eq!(CallStatus::parse(""), CallStatus::Other(String::new()));
    }

    #[test]
    fn test_only_pending_and_failed_are_dispatchable() {
        assert!(CallStatus::Pending.is_dispatchable());
        assert!(CallStatus::Failed.is_dispatchable());
        assert!(!CallStatus::InProgress.is_dispatchable());
        assert!(!CallStatus::Success.is_dispatchable());
        assert!(!CallStatus::NoAnswer.is_dispatchable());
        assert!(!CallStatus::Other("DONE".to_string()).is_dispatchable());
    }
}
