use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use voice_services::api::routes::{llm_router, tts_router, LlmState, TtsState};
use voice_services::llm::{GenerationService, MockGenerator};
use voice_services::tts::{SilentSynthesizer, TtsService};

const BOUNDARY: &str = "----voice-services-test";

fn tts_app(voices_dir: &Path) -> Router {
    let tts = TtsService::new(
        Box::new(SilentSynthesizer::new()),
        voices_dir.to_path_buf(),
    )
    .unwrap();
    tts_router(Arc::new(TtsState { tts }))
}

fn llm_app() -> Router {
    let llm = GenerationService::new(Box::new(MockGenerator::new()));
    llm_router(Arc::new(LlmState { llm }))
}

fn sine_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for i in 0..32_000 {
            let t = i as f32 / 16_000.0;
            let value = (t * 440.0 * 2.0 * std::f32::consts::PI).sin();
            writer.write_sample((value * 20000.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer
}

fn multipart_clone_body(name: &str, description: &str, audio: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{}\r\n",
            BOUNDARY, name
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{}\r\n",
            BOUNDARY, description
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"audioFile\"; \
             filename=\"reference.wav\"\r\nContent-Type: audio/wav\r\n\r\n",
            BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(audio);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn clone_request(name: &str, description: &str, audio: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/clone")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_clone_body(name, description, audio)))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let dir = tempfile::tempdir().unwrap();
    let response = tts_app(dir.path()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");

    let response = llm_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn voices_lists_builtins_first() {
    let dir = tempfile::tempdir().unwrap();
    let response = tts_app(dir.path()).oneshot(get("/voices")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let voices = json["voices"].as_array().unwrap();
    assert_eq!(voices.len(), 4);
    assert_eq!(voices[0]["id"], "default");
    assert_eq!(voices[0]["type"], "base");
}

#[tokio::test]
async fn tts_returns_wav_audio() {
    let dir = tempfile::tempdir().unwrap();
    let app = tts_app(dir.path());

    let response = app
        .oneshot(json_request(
            "POST",
            "/tts",
            serde_json::json!({"text": "hello world", "voice": "default"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "audio/wav"
    );
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"RIFF"));
}

#[tokio::test]
async fn tts_validates_input() {
    let dir = tempfile::tempdir().unwrap();
    let app = tts_app(dir.path());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/tts", serde_json::json!({"text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tts",
            serde_json::json!({"text": "hi", "voice": "no-such-voice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request(
            "POST",
            "/tts",
            serde_json::json!({"text": "hi", "format": "mp3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clone_lifecycle_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let app = tts_app(dir.path());

    // Register a new voice
    let response = app
        .clone()
        .oneshot(clone_request("Test Voice", "integration clone", &sine_wav()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["status"], "success");
    assert_eq!(created["type"], "custom");
    let id = created["id"].as_str().unwrap().to_string();

    // It shows up in the listing
    let response = app.clone().oneshot(get("/voices")).await.unwrap();
    let voices = body_json(response).await;
    assert_eq!(voices["voices"].as_array().unwrap().len(), 5);

    // It resolves through the clone route
    let response = app
        .clone()
        .oneshot(get(&format!("/clone/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "Test Voice");

    // It synthesizes
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tts",
            serde_json::json!({"text": "cloned speech", "voice": id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete it; it is gone afterwards
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/clone/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/clone/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clone_rejects_invalid_audio_without_residue() {
    let dir = tempfile::tempdir().unwrap();
    let app = tts_app(dir.path());

    let response = app
        .clone()
        .oneshot(clone_request("Broken", "", b"not audio"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_AUDIO");

    let response = app.oneshot(get("/voices")).await.unwrap();
    let voices = body_json(response).await;
    assert_eq!(voices["voices"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn clone_requires_audio_field() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nNo Audio\r\n--{}--\r\n",
        BOUNDARY, BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/clone")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = tts_app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn builtins_survive_delete_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let app = tts_app(dir.path());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/clone/default")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Built-in is untouched and clone route still refuses to serve it
    let response = app.clone().oneshot(get("/voices")).await.unwrap();
    let voices = body_json(response).await;
    assert!(voices["voices"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v["id"] == "default"));

    let response = app.oneshot(get("/clone/default")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_returns_text_and_usage() {
    let response = llm_app()
        .oneshot(json_request(
            "POST",
            "/generate",
            serde_json::json!({
                "messages": [{"role": "user", "content": "hello there"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["text"].as_str().unwrap().starts_with("Hello"));
    assert_eq!(json["finish_reason"], "stop");
    let usage = &json["usage"];
    assert_eq!(
        usage["total_tokens"].as_u64().unwrap(),
        usage["prompt_tokens"].as_u64().unwrap() + usage["completion_tokens"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn generate_requires_messages() {
    let response = llm_app()
        .oneshot(json_request(
            "POST",
            "/generate",
            serde_json::json!({"messages": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn models_lists_the_served_model() {
    let response = llm_app().oneshot(get("/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["object"], "model");
    assert_eq!(data[0]["id"], "mock-model");
}
