//! Integration tests for the Gemini generator against a local stub server.
//!
//! The stub mimics `POST /v1beta/models/{model}:generateContent`, records
//! what it received, and answers with a canned status and body.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tryon_core::dispatch::ImageGenerator;
use tryon_core::encoder::Attachment;
use tryon_core::error::TryOnError;
use tryon_gemini::config::GeminiConfig;
use tryon_gemini::generator::GeminiGenerator;

// ---------------------------------------------------------------------------
// Stub server
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Received {
    call: Option<String>,
    api_key: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    received: Arc<Mutex<Received>>,
}

async fn generate_content(
    State(stub): State<Stub>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut received = stub.received.lock().unwrap();
    received.call = Some(call);
    received.api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    received.body = Some(body);
    (stub.status, Json(stub.reply.clone()))
}

async fn spawn_stub(status: StatusCode, reply: Value) -> (SocketAddr, Arc<Mutex<Received>>) {
    let received = Arc::new(Mutex::new(Received::default()));
    let stub = Stub {
        status,
        reply,
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route("/v1beta/models/{call}", post(generate_content))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, received)
}

fn generator_for(addr: SocketAddr) -> GeminiGenerator {
    GeminiGenerator::new(GeminiConfig {
        api_key: "test-key".into(),
        model: "gemini-test".into(),
        api_url: format!("http://{addr}"),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn attachments() -> Vec<Attachment> {
    vec![
        Attachment {
            mime_type: "image/jpeg".into(),
            data: "bW9kZWw=".into(),
        },
        Attachment {
            mime_type: "image/png".into(),
            data: "dG9w".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Test: image part is returned as a data URI and the request is well formed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn returns_first_inline_image_as_data_uri() {
    let reply = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "text": "Sure." },
                    { "inlineData": { "mimeType": "image/png", "data": "aW1hZ2U=" } }
                ]
            }
        }]
    });
    let (addr, received) = spawn_stub(StatusCode::OK, reply).await;

    let image = generator_for(addr)
        .generate(&attachments(), "put the top on")
        .await
        .unwrap();

    assert_eq!(image.to_string(), "data:image/png;base64,aW1hZ2U=");

    let received = received.lock().unwrap();
    assert_eq!(received.call.as_deref(), Some("gemini-test:generateContent"));
    assert_eq!(received.api_key.as_deref(), Some("test-key"));

    let body = received.body.as_ref().unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], "dG9w");
    assert_eq!(parts[2]["text"], "put the top on");
    assert_eq!(
        body["generationConfig"]["responseModalities"],
        json!(["IMAGE", "TEXT"])
    );
}

// ---------------------------------------------------------------------------
// Test: text-only response is NoImageInResponse
// ---------------------------------------------------------------------------

#[tokio::test]
async fn text_only_response_is_no_image_error() {
    let reply = json!({
        "candidates": [{ "content": { "parts": [ { "text": "I cannot help with that." } ] } }]
    });
    let (addr, _) = spawn_stub(StatusCode::OK, reply).await;

    let result = generator_for(addr).generate(&attachments(), "x").await;
    assert_matches!(result, Err(TryOnError::NoImageInResponse));
}

// ---------------------------------------------------------------------------
// Test: inline parts with an empty payload are skipped
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_inline_part_is_skipped() {
    let reply = json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "" } },
                    { "inlineData": { "mimeType": "image/png", "data": "aW1hZ2U=" } }
                ]
            }
        }]
    });
    let (addr, _) = spawn_stub(StatusCode::OK, reply).await;

    let image = generator_for(addr)
        .generate(&attachments(), "x")
        .await
        .unwrap();
    assert_eq!(image.to_string(), "data:image/png;base64,aW1hZ2U=");
}

#[tokio::test]
async fn only_empty_inline_parts_is_no_image_error() {
    let reply = json!({
        "candidates": [{
            "content": {
                "parts": [ { "inlineData": { "mimeType": "image/png", "data": "" } } ]
            }
        }]
    });
    let (addr, _) = spawn_stub(StatusCode::OK, reply).await;

    let result = generator_for(addr).generate(&attachments(), "x").await;
    assert_matches!(result, Err(TryOnError::NoImageInResponse));
}

// ---------------------------------------------------------------------------
// Test: non-2xx status is a GenerationCall error carrying the status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_is_generation_call_error() {
    let reply = json!({ "error": { "code": 503, "message": "overloaded" } });
    let (addr, _) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE, reply).await;

    let result = generator_for(addr).generate(&attachments(), "x").await;
    assert_matches!(result, Err(TryOnError::GenerationCall(msg)) if msg.contains("503"));
}

// ---------------------------------------------------------------------------
// Test: unreachable service is a GenerationCall error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_service_is_generation_call_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = generator_for(addr).generate(&attachments(), "x").await;
    assert_matches!(result, Err(TryOnError::GenerationCall(_)));
}
