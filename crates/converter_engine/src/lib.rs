//! Converter engine: batch request IO, archive persistence and effect execution.
mod client;
mod engine;
mod persist;
mod types;

pub use client::{
    download_url, BatchClient, ChannelEventSink, ClientSettings, EventSink, ReqwestBatchClient,
    DEFAULT_ENDPOINT, DOWNLOAD_PATH,
};
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{ensure_output_dir, save_archive, AtomicFileWriter, PersistError, ARCHIVE_FILENAME};
pub use types::{
    ArchiveFormat, ArchivePayload, BatchRequest, EngineEvent, FailureKind, ResponseMetadata,
    SavedArchive, SubmissionId, SubmitError, TransferProgress,
};
