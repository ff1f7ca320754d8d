use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

use crate::errors::AssistError;
use crate::wire::{GeneratedImage, ImageRequest};

/// Stability-style image generation: multipart form in, raw image bytes out.
pub struct StabilityImages {
    endpoint: String,
    client: Client,
    timeout: Option<Duration>,
}

impl StabilityImages {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            endpoint,
            client: Client::new(),
            timeout: super::timeout_of(timeout_secs),
        }
    }
}

#[async_trait]
impl super::ImageClient for StabilityImages {
    async fn generate(&self, req: &ImageRequest, api_key: Option<&str>) -> Result<GeneratedImage, AssistError> {
        let api_key = api_key.ok_or_else(|| AssistError::remote("image API key is not set (STABILITY_API_KEY)"))?;

        let form = Form::new()
            .text("prompt", req.prompt.clone())
            .text("output_format", req.output_format.clone());

        tracing::debug!(endpoint = %self.endpoint, "POST image generation");
        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "image/*")
            .multipart(form);
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let resp = builder.send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let cause = match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(payload) => payload.to_string(),
                Err(_) => body,
            };
            return Err(AssistError::remote(format!("image API error ({status}): {cause}")));
        }

        let mime_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| format!("image/{}", req.output_format));
        let bytes = resp.bytes().await?;
        tracing::debug!(bytes = bytes.len(), %mime_type, "image received");

        Ok(GeneratedImage { bytes, mime_type })
    }
}
