//! reqwestトランスポートの統合テスト
//!
//! 127.0.0.1 上の axum スタブに対して実際にマルチパート送信し、受け取ったフィールドを検証する。

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;
use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracelens::transport::ReqwestTransport;
use tracelens_common::{
    AnalysisSession, AnalysisTransport, FileMeta, LifecyclePhase, SubmitOutcome, UploadController,
    UploadError, ANALYZE_PATH, GENERIC_FAILURE_MESSAGE,
};

const REPORT_JSON: &str = r#"{
    "filename": "photo.png",
    "metadata": { "basic": { "format": "PNG", "size": { "width": 800, "height": 600 }, "file_size_bytes": 204800 } },
    "ai_detection": { "verdict": "human", "score": 0.12, "explanation": "Natural sensor noise" },
    "perceptual_hash": "a1b2c3d4e5f60718"
}"#;

/// スタブが受け取ったマルチパートのフィールド
#[derive(Debug, Clone, PartialEq)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    received: Arc<Mutex<Vec<ReceivedField>>>,
}

async fn analyze(
    State(state): State<StubState>,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

        state.received.lock().expect("ロック失敗").push(ReceivedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }

    tokio::time::sleep(state.delay).await;
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// 解析エンドポイントだけを持つスタブサーバーを起動する
async fn spawn_stub(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<ReceivedField>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status: StatusCode::from_u16(status).expect("ステータスが不正"),
        body,
        delay,
        received: received.clone(),
    };
    let app = Router::new()
        .route(ANALYZE_PATH, post(analyze))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind失敗");
    let addr = listener.local_addr().expect("アドレス取得失敗");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), received)
}

fn photo(size: usize) -> (FileMeta, Vec<u8>) {
    let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    (
        FileMeta::new("photo.png", size as u64, Some("image/png".into())),
        payload,
    )
}

#[tokio::test]
async fn test_upload_sends_multipart_and_reports_progress() {
    let (base, received) = spawn_stub(200, REPORT_JSON, Duration::ZERO).await;
    let transport = ReqwestTransport::new(&base, Duration::from_secs(10)).unwrap();
    let (meta, payload) = photo(200 * 1024);
    let sent = payload.clone();

    let mut events = Vec::new();
    let report = transport
        .upload(&meta, "image/png", payload, &mut |loaded: u64, total: u64| {
            events.push((loaded, total))
        })
        .await
        .expect("アップロード失敗");

    assert_eq!(report.filename, "photo.png");
    assert_eq!(report.dimensions_label().as_deref(), Some("800 × 600"));

    // 進捗は単調増加で、最後は全量
    assert!(!events.is_empty());
    assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(events.last(), Some(&(204_800, 204_800)));

    let received = received.lock().unwrap().clone();
    assert_eq!(
        received,
        vec![ReceivedField {
            name: "file".into(),
            file_name: Some("photo.png".into()),
            content_type: Some("image/png".into()),
            bytes: sent,
        }]
    );
}

#[tokio::test]
async fn test_controller_success_sets_report_and_full_progress() {
    let (base, _received) = spawn_stub(200, REPORT_JSON, Duration::ZERO).await;
    let controller = UploadController::new(ReqwestTransport::new(&base, Duration::from_secs(10)).unwrap());
    let store = RefCell::new(AnalysisSession::new());
    let (meta, payload) = photo(4096);

    let outcome = controller.submit(&store, meta, payload).await;

    assert_eq!(outcome, SubmitOutcome::Succeeded);
    let session = store.borrow();
    assert_eq!(session.phase(), LifecyclePhase::Succeeded);
    assert_eq!(session.progress(), 100);
    assert_eq!(session.report().map(|r| r.filename.as_str()), Some("photo.png"));
}

#[tokio::test]
async fn test_service_error_detail_is_shown() {
    let (base, _received) = spawn_stub(500, r#"{"detail":"corrupt image"}"#, Duration::ZERO).await;
    let controller = UploadController::new(ReqwestTransport::new(&base, Duration::from_secs(10)).unwrap());
    let store = RefCell::new(AnalysisSession::new());
    let (meta, payload) = photo(1024);

    let outcome = controller.submit(&store, meta, payload).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(UploadError::Service {
            status: 500,
            detail: Some("corrupt image".into()),
        })
    );
    let session = store.borrow();
    assert_eq!(session.phase(), LifecyclePhase::Failed);
    assert_eq!(session.error(), Some("corrupt image"));
    assert_eq!(session.progress(), 100);
    assert!(session.report().is_none());
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let (base, _received) = spawn_stub(200, "<html>gateway</html>", Duration::ZERO).await;
    let controller = UploadController::new(ReqwestTransport::new(&base, Duration::from_secs(10)).unwrap());
    let store = RefCell::new(AnalysisSession::new());
    let (meta, payload) = photo(1024);

    let outcome = controller.submit(&store, meta, payload).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(UploadError::MalformedResponse(_))
    ));
    assert_eq!(store.borrow().error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ReqwestTransport::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let controller = UploadController::new(transport);
    let store = RefCell::new(AnalysisSession::new());
    let (meta, payload) = photo(1024);

    let outcome = controller.submit(&store, meta, payload).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(UploadError::Transport(_))));
    assert_eq!(store.borrow().phase(), LifecyclePhase::Failed);
    assert_eq!(store.borrow().error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let (base, _received) = spawn_stub(200, REPORT_JSON, Duration::from_secs(5)).await;
    let transport = ReqwestTransport::new(&base, Duration::from_millis(300)).unwrap();
    let (meta, payload) = photo(1024);

    let result = transport
        .upload(&meta, "image/png", payload, &mut |_: u64, _: u64| {})
        .await;

    match result {
        Err(UploadError::Transport(message)) => assert!(message.contains("timed out")),
        other => panic!("タイムアウトになっていない: {:?}", other),
    }
}
