use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use converter_core::{
    Effect, FailureCategory, Msg, OutputFormat, SavedArchive, SubmissionId, SubmitFailure,
};
use converter_engine::{
    ArchiveFormat, BatchRequest, EngineConfig, EngineEvent, EngineHandle, EventSink, FailureKind,
    SubmitError,
};
use converter_logging::{conv_debug, conv_error, conv_info};

use crate::app::AppEvent;

pub struct EffectRunner {
    engine: EngineHandle,
    events: mpsc::Sender<AppEvent>,
    success_timer: Option<SuccessTimer>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, events: mpsc::Sender<AppEvent>) -> io::Result<Self> {
        let sink = Arc::new(MsgSink {
            events: events.clone(),
        });
        let engine = EngineHandle::new(config, sink)?;
        Ok(Self {
            engine,
            events,
            success_timer: None,
        })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitBatch {
                    submission_id,
                    links,
                    format,
                } => {
                    conv_info!(
                        "SubmitBatch submission_id={} links={} format={}",
                        submission_id,
                        links.len(),
                        format
                    );
                    self.engine.submit(
                        submission_id,
                        BatchRequest {
                            links,
                            format: map_format(format),
                        },
                    );
                }
                Effect::ScheduleSuccessExpiry {
                    submission_id,
                    after,
                } => {
                    if let Some(previous) = self.success_timer.take() {
                        previous.cancel();
                    }
                    self.success_timer = Some(SuccessTimer::start(
                        submission_id,
                        after,
                        self.events.clone(),
                    ));
                }
                Effect::CancelSuccessExpiry { submission_id } => {
                    match self.success_timer.take() {
                        Some(timer) if timer.submission_id == submission_id => timer.cancel(),
                        other => self.success_timer = other,
                    }
                }
                Effect::ReportFailure {
                    submission_id,
                    failure,
                } => {
                    conv_error!(
                        "Error downloading files for submission {}: {}",
                        submission_id,
                        failure.detail
                    );
                    let _ = self
                        .events
                        .send(AppEvent::Msg(Msg::FailureReported { submission_id }));
                }
            }
        }
    }
}

/// Delivers `Msg::SuccessExpired` after a delay unless cancelled first.
struct SuccessTimer {
    submission_id: SubmissionId,
    cancel_tx: mpsc::Sender<()>,
}

impl SuccessTimer {
    fn start(submission_id: SubmissionId, after: Duration, events: mpsc::Sender<AppEvent>) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(after) {
                let _ = events.send(AppEvent::Msg(Msg::SuccessExpired { submission_id }));
            }
        });
        Self {
            submission_id,
            cancel_tx,
        }
    }

    fn cancel(self) {
        conv_debug!("Cancelling success timer for submission {}", self.submission_id);
        let _ = self.cancel_tx.send(());
    }
}

struct MsgSink {
    events: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let msg = match event {
            EngineEvent::Progress(progress) => Msg::TransferProgress {
                submission_id: progress.submission_id,
                bytes: progress.bytes,
            },
            EngineEvent::BatchCompleted {
                submission_id,
                result,
            } => match result {
                Ok(saved) => Msg::BatchSucceeded {
                    submission_id,
                    archive: SavedArchive {
                        path: saved.path,
                        bytes: saved.bytes,
                    },
                },
                Err(err) => Msg::BatchFailed {
                    submission_id,
                    failure: map_failure(&err),
                },
            },
        };
        let _ = self.events.send(AppEvent::Msg(msg));
    }
}

fn map_format(format: OutputFormat) -> ArchiveFormat {
    match format {
        OutputFormat::Mp3 => ArchiveFormat::Mp3,
        OutputFormat::Mp4 => ArchiveFormat::Mp4,
    }
}

fn map_failure(err: &SubmitError) -> SubmitFailure {
    let category = match err.kind {
        FailureKind::InvalidEndpoint => FailureCategory::InvalidEndpoint,
        FailureKind::Network => FailureCategory::Network,
        FailureKind::Timeout => FailureCategory::Timeout,
        FailureKind::HttpStatus(code) => FailureCategory::HttpStatus(code),
        FailureKind::TooLarge { .. } => FailureCategory::TooLarge,
        FailureKind::Storage => FailureCategory::Storage,
    };
    SubmitFailure {
        category,
        detail: err.to_string(),
    }
}
