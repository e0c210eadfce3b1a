#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the "number of links" field (raw text).
    LinkCountChanged(String),
    /// User edited a single link field.
    LinkEdited { index: usize, value: String },
    /// User picked an output format.
    FormatSelected(crate::OutputFormat),
    /// User clicked submit.
    SubmitClicked,
    /// Engine progress while the archive is streaming in.
    TransferProgress {
        submission_id: crate::SubmissionId,
        bytes: u64,
    },
    /// Engine saved the archive.
    BatchSucceeded {
        submission_id: crate::SubmissionId,
        archive: crate::SavedArchive,
    },
    /// Engine gave up on the batch.
    BatchFailed {
        submission_id: crate::SubmissionId,
        failure: crate::SubmitFailure,
    },
    /// The failure has been written to the diagnostic log.
    FailureReported { submission_id: crate::SubmissionId },
    /// The success display window elapsed.
    SuccessExpired { submission_id: crate::SubmissionId },
}
