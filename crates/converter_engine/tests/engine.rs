use std::fs;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use converter_engine::{
    ArchiveFormat, BatchRequest, ChannelEventSink, ClientSettings, EngineConfig, EngineEvent,
    EngineHandle, FailureKind, SavedArchive, SubmitError, ARCHIVE_FILENAME,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn wait_for_completion(
    rx: &mpsc::Receiver<EngineEvent>,
) -> (u64, Result<SavedArchive, SubmitError>) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match rx.try_recv() {
            Ok(EngineEvent::BatchCompleted {
                submission_id,
                result,
            }) => return (submission_id, result),
            Ok(EngineEvent::Progress(_)) => continue,
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    panic!("engine did not complete in time");
}

fn engine_for(endpoint: String, output: &TempDir) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let config = EngineConfig {
        client: ClientSettings {
            endpoint,
            ..ClientSettings::default()
        },
        output_dir: output.path().to_path_buf(),
    };
    let engine = EngineHandle::new(config, Arc::new(ChannelEventSink::new(tx))).unwrap();
    (engine, rx)
}

fn request() -> BatchRequest {
    BatchRequest {
        links: vec![
            "https://youtube.com/a".to_string(),
            "https://youtube.com/b".to_string(),
        ],
        format: ArchiveFormat::Mp4,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_batch_writes_download_zip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let (engine, rx) = engine_for(server.uri(), &output);
    engine.submit(1, request());

    let (submission_id, result) = wait_for_completion(&rx).await;
    assert_eq!(submission_id, 1);
    let saved = result.expect("batch saved");
    assert_eq!(saved.path, output.path().join(ARCHIVE_FILENAME));
    assert_eq!(saved.bytes, 13);
    assert_eq!(fs::read(&saved.path).unwrap(), b"archive-bytes");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_batch_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let (engine, rx) = engine_for(server.uri(), &output);
    engine.submit(9, request());

    let (submission_id, result) = wait_for_completion(&rx).await;
    assert_eq!(submission_id, 9);
    assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(502));
    assert!(!output.path().join(ARCHIVE_FILENAME).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unwritable_output_is_a_storage_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file");
    fs::write(&blocker, "x").unwrap();

    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::new(
        EngineConfig {
            client: ClientSettings {
                endpoint: server.uri(),
                ..ClientSettings::default()
            },
            output_dir: blocker,
        },
        Arc::new(ChannelEventSink::new(tx)),
    )
    .unwrap();
    engine.submit(3, request());

    let (_, result) = wait_for_completion(&rx).await;
    assert_eq!(result.unwrap_err().kind, FailureKind::Storage);
}
