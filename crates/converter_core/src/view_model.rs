use std::path::PathBuf;

use crate::{OutputFormat, SubmissionState};

pub const SUCCESS_NOTIFICATION: &str = "Download completed successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub link_count: usize,
    pub links: Vec<String>,
    pub format: OutputFormat,
    pub submission: SubmissionState,
    pub submit_enabled: bool,
    pub bytes_received: Option<u64>,
    pub notification: Option<String>,
    pub archive_path: Option<PathBuf>,
    pub last_failure: Option<String>,
}
