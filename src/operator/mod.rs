//! Operator boundary. Each operator runs one pipeline to completion against
//! the scene it is handed and always comes back with a one-line report;
//! failures are logged in full and never propagate past here.

use std::path::Path;

use crate::apply;
use crate::cli::GenerationMode;
use crate::config::Config;
use crate::context;
use crate::errors::AssistError;
use crate::extract;
use crate::log::{self, SaveFlags};
use crate::prompt;
use crate::provider::{DynCompletion, DynImage};
use crate::safety;
use crate::scene::Scene;
use crate::script::{self, ExecutionOutcome, Script};
use crate::wire::{ImageRequest, RequestPayload, Tx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorReport {
    pub level: ReportLevel,
    pub message: String,
}

impl OperatorReport {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: ReportLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ReportLevel::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.level == ReportLevel::Error
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

/// Log the full error and turn it into a status line.
fn report_failure(operator: &str, err: &AssistError) -> OperatorReport {
    tracing::error!(operator, error = %err, "operator failed");
    let message = match err {
        AssistError::RemoteService(cause) => format!("Remote service failed: {}", first_line(cause)),
        AssistError::Lookup(what) => what.clone(),
        AssistError::Execution(cause) => format!("Execution failed: {}", first_line(cause)),
    };
    OperatorReport::error(message)
}

pub struct Operators {
    cfg: Config,
    chat: DynCompletion,
    images: DynImage,
    tx: Tx,
    save: SaveFlags,
}

impl Operators {
    pub fn new(cfg: Config, chat: DynCompletion, images: DynImage) -> Self {
        Self { cfg, chat, images, tx: Tx::new(false), save: SaveFlags::default() }
    }

    pub fn with_artifacts(mut self, tx: Tx, save: SaveFlags) -> Self {
        self.tx = tx;
        self.save = save;
        self
    }

    fn record<Req: serde::Serialize, Resp: serde::Serialize>(&self, stage: &str, req: &Req, resp: &Resp) {
        match log::save_stage(Path::new(&self.cfg.artifact_root), &self.tx, stage, req, resp, self.save) {
            Ok(saved) => log::log_saved_paths(stage, &saved),
            Err(e) => tracing::warn!(stage, error = %e, "could not save artifacts"),
        }
    }

    async fn complete(&self, stage: &str, model: &str, payload: &RequestPayload) -> Result<String, AssistError> {
        let resp = self.chat.complete(model, payload).await?;
        tracing::debug!(stage, "model response:\n{}", resp.raw_text);
        self.record(stage, payload, &resp);
        Ok(resp.raw_text)
    }

    /// Complete, extract, validate, review, execute. `Ok(None)` means the
    /// review declined and the scene was left alone.
    async fn run_generated_script(
        &self,
        scene: &mut Scene,
        stage: &str,
        payload: RequestPayload,
        review: impl FnOnce(&Script) -> bool,
    ) -> Result<Option<ExecutionOutcome>, AssistError> {
        let raw = self.complete(stage, &self.cfg.codegen_model, &payload).await?;
        let extraction = extract::extract(&raw);
        if !extraction.is_fenced() {
            tracing::info!(stage, "no fenced block in response, using the whole text");
        }
        tracing::debug!(stage, "extracted code:\n{}", extraction.code());

        let script = Script::parse(extraction.code())?;
        safety::validate_script(&script, &self.cfg)?;
        if !review(&script) {
            return Ok(None);
        }
        script::execute(scene, &script).map(Some)
    }

    /// Natural-language scene edit, or a step breakdown in
    /// [`GenerationMode::StepByStep`].
    pub async fn generate(
        &self,
        scene: &mut Scene,
        prompt_text: &str,
        mode: GenerationMode,
        review: impl FnOnce(&Script) -> bool,
    ) -> OperatorReport {
        scene.props.prompt = prompt_text.to_string();
        scene.props.mode = mode;

        match mode {
            GenerationMode::StepByStep => {
                let payload = prompt::build_steps(prompt_text);
                match self.complete("steps", &self.cfg.reasoning_model, &payload).await {
                    Ok(text) => {
                        scene.props.reasoning = text.trim().to_string();
                        OperatorReport::info("Step-by-step reasoning generated.")
                    }
                    Err(e) => report_failure("generate", &e),
                }
            }
            GenerationMode::Direct => {
                let summary = context::scene_summary(&scene.objects);
                let payload = prompt::build_direct(prompt_text, &summary, &self.cfg.op_allowlist);
                match self.run_generated_script(scene, "direct", payload, review).await {
                    Ok(Some(outcome)) => {
                        tracing::info!(applied = outcome.applied, "scene script executed");
                        OperatorReport::info("Script executed successfully.")
                    }
                    Ok(None) => OperatorReport::info("Cancelled by user."),
                    Err(e) => report_failure("generate", &e),
                }
            }
        }
    }

    /// Generate a texture and build a material around it. `api_key`
    /// overrides the scene property, which overrides the config.
    pub async fn generate_material(&self, scene: &mut Scene, prompt_text: &str, api_key: Option<&str>) -> OperatorReport {
        scene.props.texture_prompt = prompt_text.to_string();
        let non_empty = |k: &&str| !k.trim().is_empty();
        let key = api_key
            .filter(non_empty)
            .or_else(|| scene.props.image_api_key.as_deref().filter(non_empty))
            .or_else(|| self.cfg.image_api_key.as_deref().filter(non_empty))
            .map(str::to_string);
        let req = ImageRequest {
            prompt: prompt_text.to_string(),
            output_format: self.cfg.image_output_format.clone(),
        };

        let image = match self.images.generate(&req, key.as_deref()).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(operator = "generate_material", error = %e, "error generating texture");
                return OperatorReport::error("Failed to generate image.");
            }
        };
        self.record(
            "texture",
            &req,
            &serde_json::json!({ "mime_type": image.mime_type, "bytes": image.bytes.len() }),
        );

        let path = match apply::persist_image(&image, Path::new(&self.cfg.texture_dir)) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(operator = "generate_material", error = %e, "could not write texture");
                return OperatorReport::error(format!("Failed to save image: {e}"));
            }
        };
        tracing::info!(
            path = %path.display(),
            size = %humansize::format_size(image.bytes.len(), humansize::DECIMAL),
            "texture saved"
        );

        match apply::create_image_material(scene, &path) {
            Ok(name) => OperatorReport::info(format!("Material '{name}' created")),
            Err(e) => report_failure("generate_material", &e),
        }
    }

    pub fn apply_to_object(&self, scene: &mut Scene) -> OperatorReport {
        match apply::apply_generated_material(scene) {
            Ok(name) => OperatorReport::info(format!("Applied '{name}' to selected object")),
            Err(e) => report_failure("apply_to_object", &e),
        }
    }

    pub async fn adjust_material(
        &self,
        scene: &mut Scene,
        prompt_text: &str,
        review: impl FnOnce(&Script) -> bool,
    ) -> OperatorReport {
        scene.props.adjust_prompt = prompt_text.to_string();
        let nodes = context::node_graph_summary(scene);
        let payload = prompt::build_adjust(prompt_text, &nodes, &self.cfg.op_allowlist);
        match self.run_generated_script(scene, "adjust", payload, review).await {
            Ok(Some(_)) => OperatorReport::info("Material adjusted with AI."),
            Ok(None) => OperatorReport::info("Cancelled by user."),
            Err(e) => report_failure("adjust_material", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_one_line() {
        let r = report_failure("t", &AssistError::remote("chat API error (500): line one\nline two"));
        assert!(r.is_error());
        assert_eq!(r.message, "Remote service failed: chat API error (500): line one");

        let r = report_failure("t", &AssistError::lookup("No mesh object selected"));
        assert_eq!(r.message, "No mesh object selected");
    }
}
