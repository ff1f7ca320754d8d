use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationMode {
    /// Generate a scene script from the prompt and scene context and run it.
    #[default]
    #[value(alias = "DIRECT")]
    Direct,
    /// Ask for a modeling-step breakdown only; nothing is executed.
    #[value(alias = "step", alias = "STEP_BY_STEP")]
    StepByStep,
}

#[derive(Parser, Debug)]
#[command(name = "scene_copilot", version, about = "Natural-language scene and material edits over a scene document")]
pub struct Args {
    /// Scene document to read and write back.
    #[arg(long, default_value = "scene.json")]
    pub scene: String,

    #[arg(long)]
    pub config: Option<String>,

    /// Run the operator but do not write the scene back.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Execute generated scripts without asking.
    #[arg(long, default_value_t = false)]
    pub auto_approve: bool,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Hide the spinner while waiting on remote services.
    #[arg(long = "no-progress", action = ArgAction::SetFalse)]
    pub progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn a natural-language instruction into scene edits.
    Generate {
        prompt: String,
        #[arg(long, value_enum, default_value_t = GenerationMode::Direct)]
        mode: GenerationMode,
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate a texture image and wrap it in a new material.
    Texture {
        prompt: String,
        /// Image API key; overrides the config and the scene property.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Assign the last generated material to the active mesh.
    ApplyMaterial,
    /// Adjust the active material's nodes from an instruction.
    AdjustMaterial {
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the context summaries sent to the model.
    Summary,
}
