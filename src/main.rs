use clap::Parser;
use std::path::Path;

use scene_copilot::cli::{self, Command, GenerationMode};
use scene_copilot::config::Config;
use scene_copilot::context;
use scene_copilot::log::SaveFlags;
use scene_copilot::operator::Operators;
use scene_copilot::provider;
use scene_copilot::scene::Scene;
use scene_copilot::script::Script;
use scene_copilot::ux;
use scene_copilot::wire::Tx;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let log_level = if args.debug { "scene_copilot=debug" } else { "scene_copilot=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = Config::load(args.config.as_deref().map(Path::new))?;
    if let Some(secs) = args.timeout_secs {
        cfg.timeout_secs = secs;
    }
    cfg.auto_approve |= args.auto_approve;
    match &args.command {
        Command::Generate { mode: GenerationMode::StepByStep, model: Some(m), .. } => {
            cfg.reasoning_model = m.clone()
        }
        Command::Generate { model: Some(m), .. } | Command::AdjustMaterial { model: Some(m), .. } => {
            cfg.codegen_model = m.clone()
        }
        _ => {}
    }

    let scene_path = Path::new(&args.scene);
    let mut scene = Scene::load(scene_path)?;

    let tx = Tx::new(args.dry_run);
    tracing::debug!(tx = %tx.id, scene = %scene_path.display(), "starting");

    let auto_approve = cfg.auto_approve;
    let (chat, images) = provider::make_clients(&cfg);
    let ops = Operators::new(cfg, chat, images).with_artifacts(
        tx,
        SaveFlags { request: args.save_request, response: args.save_response },
    );

    let show_progress = args.progress && !matches!(args.command, Command::Summary | Command::ApplyMaterial);
    let pb = ux::spinner("Waiting for the model...", show_progress);
    let review_pb = pb.clone();
    let review = move |script: &Script| {
        review_pb.suspend(|| {
            ux::show_script(script);
            auto_approve || ux::confirm("Execute this script?")
        })
    };

    let report = match args.command {
        Command::Generate { prompt, mode, .. } => {
            let report = ops.generate(&mut scene, &prompt, mode, review).await;
            pb.finish_and_clear();
            if mode == GenerationMode::StepByStep && !report.is_error() {
                ux::show_reasoning(&scene.props.reasoning);
            }
            report
        }
        Command::Texture { prompt, api_key } => {
            pb.set_message("Generating texture...");
            let report = ops.generate_material(&mut scene, &prompt, api_key.as_deref()).await;
            pb.finish_and_clear();
            report
        }
        Command::ApplyMaterial => {
            pb.finish_and_clear();
            ops.apply_to_object(&mut scene)
        }
        Command::AdjustMaterial { prompt, .. } => {
            let report = ops.adjust_material(&mut scene, &prompt, review).await;
            pb.finish_and_clear();
            report
        }
        Command::Summary => {
            pb.finish_and_clear();
            ux::show_summary("SCENE", &context::scene_summary(&scene.objects));
            ux::show_summary("ACTIVE MATERIAL NODES", &context::node_graph_summary(&scene));
            return Ok(());
        }
    };

    ux::print_report(&report);

    if args.dry_run {
        println!("(dry run: scene not written)");
    } else {
        scene.save(scene_path)?;
    }

    Ok(())
}
