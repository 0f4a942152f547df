use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenetrack::host::recording::RecordingHost;
use scenetrack::{Dispatcher, PlayerSettings, Preprocessor, SceneContext, SceneDef};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenetrack", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preprocess a scene and report animations in error.
    Check(CheckArgs),
    /// Draw one frame with in-memory collaborators and print the draw calls as JSON.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Player settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene time, in seconds or `m:ss[.fff]`.
    #[arg(long)]
    time: String,

    /// Player settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Serialize)]
struct Failure<'a> {
    id: u32,
    layer: &'a str,
    kind: &'static str,
    error: &'a scenetrack::AnimationError,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    animations: usize,
    failed: Vec<Failure<'a>>,
    rejected: usize,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse {what} JSON"))
}

fn read_settings(path: Option<&Path>) -> anyhow::Result<PlayerSettings> {
    let settings = match path {
        Some(p) => read_json(p, "settings")?,
        None => PlayerSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn load(
    scene_path: &Path,
    settings: PlayerSettings,
    rig: &mut RecordingHost,
) -> anyhow::Result<SceneContext> {
    let scene: SceneDef = read_json(scene_path, "scene")?;
    let mut ctx = SceneContext::new(settings);
    Preprocessor::new(&mut ctx)
        .load(scene, &mut rig.host())
        .context("preprocess scene")?;
    Ok(ctx)
}

fn parse_time(text: &str) -> anyhow::Result<f64> {
    if let Ok(seconds) = text.parse::<f64>() {
        return Ok(seconds);
    }
    Ok(scenetrack::parse_clock_time(text)?)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let settings = read_settings(args.settings.as_deref())?;
    let mut rig = RecordingHost::default();
    let ctx = load(&args.in_path, settings, &mut rig)?;

    let report = CheckReport {
        animations: ctx.animations().count(),
        failed: ctx
            .failed()
            .filter_map(|a| {
                a.error.as_ref().map(|error| Failure {
                    id: a.id,
                    layer: a.layer.as_str(),
                    kind: a.kind.name(),
                    error,
                })
            })
            .collect(),
        rejected: ctx.rejected().len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    let bad = report.failed.len() + report.rejected;
    if bad > 0 {
        anyhow::bail!("{bad} animation(s) in error");
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let time = parse_time(&args.time).with_context(|| format!("parse --time '{}'", args.time))?;
    let settings = read_settings(args.settings.as_deref())?;
    let mut rig = RecordingHost::at(time);
    let mut ctx = load(&args.in_path, settings, &mut rig)?;

    rig.renderer.clear();
    let stats = Dispatcher::new(&mut ctx).draw_frame(&mut rig.host());
    tracing::info!(
        drawn = stats.drawn,
        skipped = stats.skipped,
        failed = stats.failed,
        "frame drawn"
    );

    println!("{}", serde_json::to_string_pretty(&rig.renderer.calls)?);
    Ok(())
}
