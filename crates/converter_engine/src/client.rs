use std::sync::mpsc;
use std::time::Duration;

use bytes::BytesMut;
use converter_logging::{conv_debug, conv_info};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{
    ArchivePayload, BatchRequest, EngineEvent, FailureKind, ResponseMetadata, SubmissionId,
    SubmitError, TransferProgress,
};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";
pub const DOWNLOAD_PATH: &str = "download";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the conversion service; `download` is joined onto it.
    pub endpoint: String,
    /// `None` leaves the transport default in place.
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub max_bytes: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: None,
            request_timeout: None,
            max_bytes: None,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait BatchClient: Send + Sync {
    async fn submit(
        &self,
        submission_id: SubmissionId,
        request: &BatchRequest,
        sink: &dyn EventSink,
    ) -> Result<ArchivePayload, SubmitError>;
}

/// Resolve the `download` endpoint below `base`, keeping any path prefix.
pub fn download_url(base: &str) -> Result<Url, SubmitError> {
    let invalid = |message: String| SubmitError::new(FailureKind::InvalidEndpoint, message);

    let mut url = Url::parse(base.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(DOWNLOAD_PATH)
        .map_err(|err| invalid(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct ReqwestBatchClient {
    settings: ClientSettings,
}

impl ReqwestBatchClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))
    }

    fn check_size(&self, actual: u64) -> Result<(), SubmitError> {
        match self.settings.max_bytes {
            Some(max_bytes) if actual > max_bytes => Err(SubmitError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(actual),
                },
                "archive too large",
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl BatchClient for ReqwestBatchClient {
    async fn submit(
        &self,
        submission_id: SubmissionId,
        request: &BatchRequest,
        sink: &dyn EventSink,
    ) -> Result<ArchivePayload, SubmitError> {
        let url = download_url(&self.settings.endpoint)?;
        let client = self.build_client()?;

        conv_info!(
            "Submitting batch {} links={} format={:?} url={}",
            submission_id,
            request.links.len(),
            request.format,
            url
        );

        let response = client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            self.check_size(content_len)?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        conv_debug!(
            "Batch {} answered {} content_type={:?}",
            submission_id,
            status,
            content_type
        );

        sink.emit(EngineEvent::Progress(TransferProgress {
            submission_id,
            bytes: 0,
        }));

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            self.check_size(bytes.len() as u64 + chunk.len() as u64)?;
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Progress(TransferProgress {
                submission_id,
                bytes: bytes.len() as u64,
            }));
        }

        let metadata = ResponseMetadata {
            request_url: url.to_string(),
            status: status.as_u16(),
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(ArchivePayload {
            bytes: bytes.freeze(),
            metadata,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_download_onto_bare_host() {
        let url = download_url("http://localhost:5000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/download");
    }

    #[test]
    fn keeps_path_prefix() {
        let url = download_url("https://convert.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://convert.example.com/api/download");

        let url = download_url("https://convert.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://convert.example.com/api/download");
    }

    #[test]
    fn rejects_unusable_endpoints() {
        for endpoint in ["", "localhost:5000", "ftp://example.com", "not a url"] {
            let err = download_url(endpoint).unwrap_err();
            assert_eq!(err.kind, FailureKind::InvalidEndpoint, "endpoint {endpoint:?}");
        }
    }
}
