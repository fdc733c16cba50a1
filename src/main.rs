use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use snapcanvas::replay::{self, PointerSample};
use snapcanvas::{BlobStore, CanvasConfig, CanvasController, FsBlobStore, HttpBlobStore, MemoryBlobStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "snapcanvas", version, about = "Replay pointer strokes onto a canvas and upload periodic snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a pointer script through a canvas controller, uploading snapshots
    Replay(ReplayArgs),
    /// Render a pointer script to a PNG without uploading anything
    Render(RenderArgs),
}

#[derive(Args)]
struct CanvasArgs {
    /// JSON-lines pointer script
    #[arg(long)]
    input: PathBuf,
    /// Surface width in pixels
    #[arg(long, default_value_t = 400)]
    width: u32,
    /// Surface height in pixels
    #[arg(long, default_value_t = 400)]
    height: u32,
    /// Stroke width in pixels
    #[arg(long, default_value_t = 4.0)]
    stroke_width: f32,
}

#[derive(Args)]
struct ReplayArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Minimum milliseconds between snapshots
    #[arg(long, default_value_t = 10_000)]
    interval_ms: u64,
    /// Store snapshots in this directory
    #[arg(long, conflicts_with_all = ["endpoint", "dry_run"])]
    out_dir: Option<PathBuf>,
    /// Upload snapshots to this HTTP blob endpoint
    #[arg(long, conflicts_with = "dry_run")]
    endpoint: Option<String>,
    /// Bearer token for the HTTP endpoint
    #[arg(long, env = "BLOB_READ_WRITE_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Keep snapshots in memory only
    #[arg(long)]
    dry_run: bool,
    /// Also write the final surface to this PNG file
    #[arg(long)]
    final_png: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Output PNG path
    #[arg(long)]
    output: PathBuf,
}

impl CanvasArgs {
    fn config(&self) -> CanvasConfig {
        CanvasConfig {
            viewport: snapcanvas::Viewport {
                width: self.width,
                height: self.height,
            },
            stroke_width: self.stroke_width,
            ..Default::default()
        }
    }

    fn samples(&self) -> anyhow::Result<Vec<PointerSample>> {
        let text = std::fs::read_to_string(&self.input)
            .with_context(|| format!("reading {}", self.input.display()))?;
        Ok(replay::parse_script(&text)?)
    }
}

async fn run_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let samples = args.canvas.samples()?;
    let config = CanvasConfig {
        snapshot_interval_ms: args.interval_ms,
        ..args.canvas.config()
    };

    let store: Arc<dyn BlobStore> = match (&args.out_dir, &args.endpoint, args.dry_run) {
        (Some(dir), None, false) => Arc::new(FsBlobStore::new(dir)),
        (None, Some(endpoint), false) => Arc::new(HttpBlobStore::new(endpoint, args.token.clone())?),
        (None, None, true) => Arc::new(MemoryBlobStore::new()),
        _ => bail!("choose exactly one of --out-dir, --endpoint or --dry-run"),
    };

    let start = samples.first().map(|s| s.t).unwrap_or(0);
    let mut controller = CanvasController::new(config, store, tokio::runtime::Handle::current(), start)?;
    let stats = controller.stats();

    let summary = replay::replay(&mut controller, &samples);
    if let Some(path) = &args.final_png {
        let png = controller.surface().to_png()?;
        std::fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
    }
    controller.on_teardown();
    stats.wait_idle().await;

    println!(
        "ticks={} segments={} scheduled_snapshots={} uploads_ok={} uploads_failed={}",
        summary.ticks,
        summary.segments,
        summary.snapshots,
        stats.succeeded(),
        stats.failed()
    );
    Ok(())
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let samples = args.canvas.samples()?;
    let surface = replay::render(&args.canvas.config(), &samples)?;
    let png = surface.to_png()?;
    std::fs::write(&args.output, png).with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Rendered {} ticks to {}", samples.len(), args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args).await,
        Command::Render(args) => run_render(args),
    }
}
