use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AssistError;
use crate::wire::{CompletionText, GeneratedImage, ImageRequest, RequestPayload};

pub mod openai;
pub mod stability;

/// Text completions. Implementations never touch the scene.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, payload: &RequestPayload) -> Result<CompletionText, AssistError>;
}

#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(&self, req: &ImageRequest, api_key: Option<&str>) -> Result<GeneratedImage, AssistError>;
}

pub type DynCompletion = Box<dyn CompletionClient>;
pub type DynImage = Box<dyn ImageClient>;

pub(crate) fn timeout_of(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub fn make_clients(cfg: &Config) -> (DynCompletion, DynImage) {
    let chat = openai::ChatCompletions::new(
        cfg.chat_api_base.clone(),
        cfg.chat_api_key.clone(),
        cfg.timeout_secs,
    );
    let images = stability::StabilityImages::new(cfg.image_endpoint.clone(), cfg.timeout_secs);
    (Box::new(chat), Box::new(images))
}
