//! Converter core: pure form state machine and view-model helpers.
mod effect;
mod link_set;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use link_set::{parse_link_count, LinkSet, ResizePolicy, MAX_LINKS, MIN_LINKS};
pub use msg::Msg;
pub use state::{
    AppState, FailureCategory, OutputFormat, ParseFormatError, SavedArchive, SubmissionId,
    SubmissionState, SubmitFailure, SUCCESS_DISPLAY_WINDOW,
};
pub use update::update;
pub use view_model::{AppViewModel, SUCCESS_NOTIFICATION};
