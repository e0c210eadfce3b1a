use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use converter_logging::{conv_info, conv_warn};

use crate::client::{BatchClient, ClientSettings, EventSink, ReqwestBatchClient};
use crate::persist::save_archive;
use crate::{BatchRequest, EngineEvent, FailureKind, SavedArchive, SubmissionId, SubmitError};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    /// Directory that receives `download.zip`.
    pub output_dir: PathBuf,
}

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        request: BatchRequest,
    },
}

/// Runs batch submissions on a background tokio runtime.
///
/// Events for every submission are delivered to the sink passed to
/// [`EngineHandle::new`], from runtime worker threads.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let client: Arc<dyn BatchClient> = Arc::new(ReqwestBatchClient::new(config.client));
        Self::with_client(client, config.output_dir, sink)
    }

    /// Same as [`EngineHandle::new`] with a caller-provided client.
    pub fn with_client(
        client: Arc<dyn BatchClient>,
        output_dir: PathBuf,
        sink: Arc<dyn EventSink>,
    ) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let output_dir = Arc::new(output_dir);

        thread::Builder::new()
            .name("converter-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let sink = sink.clone();
                    let output_dir = output_dir.clone();
                    runtime.spawn(async move {
                        handle_command(client.as_ref(), &output_dir, command, sink.as_ref())
                            .await;
                    });
                }
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, submission_id: SubmissionId, request: BatchRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission_id,
            request,
        });
    }
}

async fn handle_command(
    client: &dyn BatchClient,
    output_dir: &Path,
    command: EngineCommand,
    sink: &dyn EventSink,
) {
    match command {
        EngineCommand::Submit {
            submission_id,
            request,
        } => {
            let result = run_submission(client, output_dir, submission_id, &request, sink).await;
            match &result {
                Ok(archive) => conv_info!(
                    "Batch {} saved {} bytes to {:?}",
                    submission_id,
                    archive.bytes,
                    archive.path
                ),
                Err(err) => conv_warn!("Batch {} failed: {}", submission_id, err),
            }
            sink.emit(EngineEvent::BatchCompleted {
                submission_id,
                result,
            });
        }
    }
}

async fn run_submission(
    client: &dyn BatchClient,
    output_dir: &Path,
    submission_id: SubmissionId,
    request: &BatchRequest,
    sink: &dyn EventSink,
) -> Result<SavedArchive, SubmitError> {
    let payload = client.submit(submission_id, request, sink).await?;
    let metadata = &payload.metadata;
    conv_info!(
        "Batch {} response from {} status={} content_type={:?} bytes={}",
        submission_id,
        metadata.request_url,
        metadata.status,
        metadata.content_type,
        metadata.byte_len
    );
    let dir = output_dir.to_path_buf();
    tokio::task::spawn_blocking(move || save_archive(&dir, &payload.bytes))
        .await
        .map_err(|err| SubmitError::new(FailureKind::Storage, err.to_string()))?
        .map_err(|err| SubmitError::new(FailureKind::Storage, err.to_string()))
}
