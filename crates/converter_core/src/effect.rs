use std::time::Duration;

use crate::{OutputFormat, SubmissionId, SubmitFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the snapshot to the conversion service and save the archive.
    SubmitBatch {
        submission_id: SubmissionId,
        links: Vec<String>,
        format: OutputFormat,
    },
    /// Deliver `Msg::SuccessExpired` once `after` has elapsed.
    ScheduleSuccessExpiry {
        submission_id: SubmissionId,
        after: Duration,
    },
    CancelSuccessExpiry {
        submission_id: SubmissionId,
    },
    /// Log the failure and answer with `Msg::FailureReported`.
    ReportFailure {
        submission_id: SubmissionId,
        failure: SubmitFailure,
    },
}
