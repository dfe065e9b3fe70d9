#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tower::ServiceExt;
use tryon_api::config::ServerConfig;
use tryon_api::router::build_app_router;
use tryon_api::sessions::SessionStore;
use tryon_api::state::AppState;
use tryon_core::data_uri::DataUri;
use tryon_core::dispatch::ImageGenerator;
use tryon_core::encoder::Attachment;
use tryon_core::error::TryOnError;

/// Eight bytes of PNG signature, base64-encoded.
pub const PNG_BASE64: &str = "iVBORw0KGgo=";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Upload size limit used by the test configuration.
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024;

const BOUNDARY: &str = "tryon-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        upload_dir: upload_dir.to_path_buf(),
        session_idle_timeout_secs: 3600,
    }
}

/// One recorded generator call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub attachments: Vec<Attachment>,
    pub instruction: String,
}

/// Generator that answers with a fixed PNG, or fails on demand.
///
/// When gated, every call waits for a permit so tests can observe the
/// `submitting` phase.
pub struct FakeGenerator {
    fail: bool,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeGenerator {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(
        &self,
        attachments: &[Attachment],
        instruction: &str,
    ) -> Result<DataUri, TryOnError> {
        self.calls.lock().unwrap().push(RecordedCall {
            attachments: attachments.to_vec(),
            instruction: instruction.to_string(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail {
            return Err(TryOnError::GenerationCall("HTTP 500: upstream exploded".into()));
        }
        Ok(DataUri::new("image/png", PNG_BASE64))
    }
}

/// A router plus the handles tests inspect.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub generator: Arc<FakeGenerator>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Number of spooled upload files currently on disk.
    pub fn spooled_files(&self) -> usize {
        match std::fs::read_dir(self.upload_dir.path()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

/// Build the full application router with all middleware layers around the
/// given generator.
pub fn build_test_app(generator: FakeGenerator) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(upload_dir.path());
    let generator = Arc::new(generator);

    let state = AppState {
        config: Arc::new(config.clone()),
        generator: Arc::clone(&generator) as Arc<dyn ImageGenerator>,
        sessions: Arc::new(SessionStore::new()),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        generator,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_multipart(app: Router, method: Method, uri: &str, form: Multipart) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

// ---------------------------------------------------------------------------
// Multipart body builder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, name: &str) -> Self {
        self.file(name, &format!("{name}.png"), "image/png", PNG_BYTES)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// Create a session and return its ID.
pub async fn create_session(app: Router) -> String {
    let response = post_empty(app, "/api/v1/sessions").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

/// Upload a PNG into a session slot.
pub async fn upload_png(app: Router, session_id: &str, slot: &str) -> Response {
    send_multipart(
        app,
        Method::PUT,
        &format!("/api/v1/sessions/{session_id}/slots/{slot}"),
        Multipart::new().png("file"),
    )
    .await
}

/// Poll a session until it reaches `phase`, returning the final snapshot.
pub async fn wait_for_phase(app: Router, session_id: &str, phase: &str) -> serde_json::Value {
    for _ in 0..200 {
        let json = body_json(get(app.clone(), &format!("/api/v1/sessions/{session_id}")).await).await;
        if json["data"]["phase"] == phase {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {session_id} never reached phase '{phase}'");
}
