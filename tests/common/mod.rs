#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};

use scene_copilot::config::Config;
use scene_copilot::errors::AssistError;
use scene_copilot::provider::{CompletionClient, ImageClient};
use scene_copilot::scene::{ObjectKind, Scene};
use scene_copilot::wire::{CompletionText, GeneratedImage, ImageRequest, RequestPayload};

/// Completion client that replays a fixed reply and records what it was sent.
#[derive(Clone)]
pub struct ScriptedChat {
    reply: Result<String, String>,
    pub sent: Arc<Mutex<Vec<(String, RequestPayload)>>>,
}

impl ScriptedChat {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), sent: Arc::default() }
    }

    pub fn failing(cause: &str) -> Self {
        Self { reply: Err(cause.to_string()), sent: Arc::default() }
    }

    pub fn last_payload(&self) -> RequestPayload {
        self.sent.lock().unwrap().last().cloned().expect("no request sent").1
    }
}

#[async_trait]
impl CompletionClient for ScriptedChat {
    async fn complete(&self, model: &str, payload: &RequestPayload) -> Result<CompletionText, AssistError> {
        self.sent.lock().unwrap().push((model.to_string(), payload.clone()));
        match &self.reply {
            Ok(text) => Ok(CompletionText { raw_text: text.clone() }),
            Err(cause) => Err(AssistError::RemoteService(cause.clone())),
        }
    }
}

#[derive(Clone)]
pub struct FixedImage {
    ok: bool,
    pub keys: Arc<Mutex<Vec<Option<String>>>>,
}

impl FixedImage {
    pub fn ok() -> Self {
        Self { ok: true, keys: Arc::default() }
    }

    pub fn failing() -> Self {
        Self { ok: false, keys: Arc::default() }
    }
}

#[async_trait]
impl ImageClient for FixedImage {
    async fn generate(&self, _req: &ImageRequest, api_key: Option<&str>) -> Result<GeneratedImage, AssistError> {
        self.keys.lock().unwrap().push(api_key.map(str::to_string));
        if self.ok {
            Ok(GeneratedImage { bytes: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"), mime_type: "image/jpeg".into() })
        } else {
            Err(AssistError::RemoteService("{\"errors\":[\"invalid prompt\"]}".into()))
        }
    }
}

pub fn test_config(dir: &std::path::Path) -> Config {
    Config {
        chat_api_key: Some("test-key".into()),
        image_api_key: Some("config-image-key".into()),
        texture_dir: dir.join("textures").display().to_string(),
        artifact_root: dir.join("artifacts").display().to_string(),
        auto_approve: true,
        ..Config::default()
    }
}

/// Cube with a node-based material in its first slot, plus a light.
pub fn sample_scene() -> Scene {
    let mut scene = Scene::default();
    scene.add_object("Light", ObjectKind::Light, [4.076, 1.0, 5.904]);
    scene.add_object("Cube", ObjectKind::Mesh, [0.0, 0.0, 0.0]);
    let mat = scene.new_material("Material");
    scene.material_mut(&mat).unwrap().enable_nodes();
    scene.assign_material("Cube", &mat).unwrap();
    scene
}
