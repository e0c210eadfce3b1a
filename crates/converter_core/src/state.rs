use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::link_set::{LinkSet, ResizePolicy};
use crate::view_model::{AppViewModel, SUCCESS_NOTIFICATION};

pub type SubmissionId = u64;

/// How long the success notification stays up before the form returns to idle.
pub const SUCCESS_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Mp3,
    Mp4,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Mp3, OutputFormat::Mp4];

    /// Wire name used in the request body.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormatError(pub String);

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown output format {:?} (expected mp3 or mp4)", self.0)
    }
}

impl std::error::Error for ParseFormatError {}

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl SubmissionState {
    /// The submit control is disabled only while a request is in flight.
    pub fn accepts_submit(self) -> bool {
        !matches!(self, SubmissionState::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCategory {
    InvalidEndpoint,
    Network,
    Timeout,
    HttpStatus(u16),
    TooLarge,
    Storage,
}

impl FailureCategory {
    /// Message shown on the form next to the submit control.
    pub fn user_message(&self) -> String {
        match self {
            FailureCategory::InvalidEndpoint => {
                "The conversion service address is not a valid URL".to_string()
            }
            FailureCategory::Network => "Could not reach the conversion service".to_string(),
            FailureCategory::Timeout => {
                "The conversion service did not respond in time".to_string()
            }
            FailureCategory::HttpStatus(code) => {
                format!("The conversion service responded with HTTP {code}")
            }
            FailureCategory::TooLarge => {
                "The archive exceeded the configured size limit".to_string()
            }
            FailureCategory::Storage => "The archive could not be saved locally".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub category: FailureCategory,
    /// Diagnostic text from the transport or filesystem.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArchive {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    links: LinkSet,
    format: OutputFormat,
    submission: SubmissionState,
    current_submission: Option<SubmissionId>,
    next_submission_id: SubmissionId,
    bytes_received: Option<u64>,
    last_archive: Option<SavedArchive>,
    last_failure: Option<SubmitFailure>,
    success_window: Duration,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_resize_policy(ResizePolicy::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resize_policy(policy: ResizePolicy) -> Self {
        Self {
            links: LinkSet::with_policy(policy),
            format: OutputFormat::default(),
            submission: SubmissionState::Idle,
            current_submission: None,
            next_submission_id: 1,
            bytes_received: None,
            last_archive: None,
            last_failure: None,
            success_window: SUCCESS_DISPLAY_WINDOW,
            dirty: false,
        }
    }

    pub fn with_success_window(mut self, window: Duration) -> Self {
        self.success_window = window;
        self
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn current_submission(&self) -> Option<SubmissionId> {
        self.current_submission
    }

    pub fn success_window(&self) -> Duration {
        self.success_window
    }

    pub fn last_failure(&self) -> Option<&SubmitFailure> {
        self.last_failure.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let notification = (self.submission == SubmissionState::Succeeded)
            .then(|| SUCCESS_NOTIFICATION.to_string());
        AppViewModel {
            link_count: self.links.count(),
            links: self.links.snapshot(),
            format: self.format,
            submission: self.submission,
            submit_enabled: self.submission.accepts_submit(),
            bytes_received: self.bytes_received,
            notification,
            archive_path: self.last_archive.as_ref().map(|archive| archive.path.clone()),
            last_failure: self
                .last_failure
                .as_ref()
                .map(|failure| failure.category.user_message()),
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_link_count(&mut self, requested: usize) {
        self.links.resize(requested);
        self.dirty = true;
    }

    pub(crate) fn set_link(&mut self, index: usize, value: String) -> bool {
        let changed = self.links.set(index, value);
        self.dirty |= changed;
        changed
    }

    pub(crate) fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
        self.dirty = true;
    }

    /// Submission whose success timer is still running, if any.
    pub(crate) fn expiring_success(&self) -> Option<SubmissionId> {
        match self.submission {
            SubmissionState::Succeeded => self.current_submission,
            _ => None,
        }
    }

    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        let submission_id = self.next_submission_id;
        self.next_submission_id += 1;
        self.current_submission = Some(submission_id);
        self.submission = SubmissionState::Pending;
        self.bytes_received = None;
        self.last_failure = None;
        self.dirty = true;
        submission_id
    }

    fn is_current(&self, submission_id: SubmissionId, expected: SubmissionState) -> bool {
        self.current_submission == Some(submission_id) && self.submission == expected
    }

    pub(crate) fn apply_progress(&mut self, submission_id: SubmissionId, bytes: u64) {
        if self.is_current(submission_id, SubmissionState::Pending) {
            self.bytes_received = Some(bytes);
            self.dirty = true;
        }
    }

    pub(crate) fn complete_success(
        &mut self,
        submission_id: SubmissionId,
        archive: SavedArchive,
    ) -> bool {
        if !self.is_current(submission_id, SubmissionState::Pending) {
            return false;
        }
        self.bytes_received = Some(archive.bytes);
        self.last_archive = Some(archive);
        self.submission = SubmissionState::Succeeded;
        self.dirty = true;
        true
    }

    pub(crate) fn complete_failure(
        &mut self,
        submission_id: SubmissionId,
        failure: SubmitFailure,
    ) -> bool {
        if !self.is_current(submission_id, SubmissionState::Pending) {
            return false;
        }
        self.last_failure = Some(failure);
        self.submission = SubmissionState::Failed;
        self.dirty = true;
        true
    }

    pub(crate) fn acknowledge_failure(&mut self, submission_id: SubmissionId) {
        if self.is_current(submission_id, SubmissionState::Failed) {
            self.submission = SubmissionState::Idle;
            self.dirty = true;
        }
    }

    pub(crate) fn expire_success(&mut self, submission_id: SubmissionId) {
        if self.is_current(submission_id, SubmissionState::Succeeded) {
            self.submission = SubmissionState::Idle;
            self.dirty = true;
        }
    }
}
