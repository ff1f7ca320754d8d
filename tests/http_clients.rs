mod common;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{sample_scene, test_config};
use scene_copilot::cli::GenerationMode;
use scene_copilot::config::Config;
use scene_copilot::errors::AssistError;
use scene_copilot::operator::Operators;
use scene_copilot::prompt;
use scene_copilot::provider::openai::ChatCompletions;
use scene_copilot::provider::stability::StabilityImages;
use scene_copilot::provider::{CompletionClient, ImageClient};
use scene_copilot::wire::ImageRequest;

fn texture_request() -> ImageRequest {
    ImageRequest { prompt: "weathered oak planks".into(), output_format: "jpeg".into() }
}

#[tokio::test]
async fn chat_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer k"))
        .and(body_string_contains("\"model\":\"test/model\""))
        .and(body_string_contains("Scene Overview:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "```json\n[]\n```" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletions::new(server.uri(), Some("k".into()), 0);
    let payload = prompt::build_direct("add a cube", "", &Config::default().op_allowlist);
    let out = client.complete("test/model", &payload).await.unwrap();
    assert_eq!(out.raw_text, "```json\n[]\n```");
}

#[tokio::test]
async fn chat_non_success_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = ChatCompletions::new(format!("{}/", server.uri()), Some("k".into()), 0);
    let err = client.complete("m", &prompt::build_steps("x")).await.unwrap_err();
    match err {
        AssistError::RemoteService(cause) => {
            assert!(cause.contains("500"));
            assert!(cause.contains("upstream exploded"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_without_key_fails_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let client = ChatCompletions::new(server.uri(), None, 0);
    let err = client.complete("m", &prompt::build_steps("x")).await.unwrap_err();
    assert!(matches!(err, AssistError::RemoteService(_)));
}

#[tokio::test]
async fn http_500_stops_at_operator_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "overloaded" } })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(dir.path());
    cfg.chat_api_base = server.uri();
    let chat = ChatCompletions::new(cfg.chat_api_base.clone(), cfg.chat_api_key.clone(), 0);
    let images = StabilityImages::new(format!("{}/image", server.uri()), 0);
    let ops = Operators::new(cfg, Box::new(chat), Box::new(images));

    let mut scene = sample_scene();
    let before = scene.clone();
    let report = ops.generate(&mut scene, "add a sphere", GenerationMode::Direct, |_| true).await;
    assert!(report.is_error());
    assert!(report.message.contains("500"));
    assert_eq!(scene.objects, before.objects);
}

#[tokio::test]
async fn image_200_returns_bytes_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/sd3"))
        .and(header("authorization", "Bearer img"))
        .and(header("accept", "image/*"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("weathered oak planks"))
        .and(body_string_contains("name=\"output_format\""))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(b"\xff\xd8\xff\xe0".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = StabilityImages::new(format!("{}/v2beta/stable-image/generate/sd3", server.uri()), 0);
    let image = client.generate(&texture_request(), Some("img")).await.unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(&image.bytes[..], b"\xff\xd8\xff\xe0");
}

#[tokio::test]
async fn image_error_payload_becomes_cause() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": "bad_request",
            "errors": ["prompt: cannot be blank"]
        })))
        .mount(&server)
        .await;

    let client = StabilityImages::new(server.uri(), 0);
    let err = client.generate(&texture_request(), Some("img")).await.unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("remote service error: image API error (400"));
    assert!(text.contains("prompt: cannot be blank"));
}

#[tokio::test]
async fn image_without_key_is_remote_error() {
    let client = StabilityImages::new("http://127.0.0.1:9/never".into(), 0);
    let err = client.generate(&texture_request(), None).await.unwrap_err();
    assert!(matches!(err, AssistError::RemoteService(_)));
}
