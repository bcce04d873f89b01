//! ClipMux export driver binary.
//!
//! The reference external caller: reads clip files, imports them into a
//! store, runs one export, and writes the output file.

use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmux_export::{ExportOrchestrator, ExporterConfig};
use cmux_media::{FfmpegEngine, FfprobeDuration, ResourceStore};
use cmux_timeline::{ClipSource, ClipStore};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ExporterConfig::from_env();
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: cmux <clip>...");
        eprintln!("  CMUX_ASPECT=shorts|landscape|square  CMUX_FIT=cover|contain");
        eprintln!("  CMUX_OUTRO_SECONDS=<f64>  CMUX_OUTPUT=<path>  LOG_FORMAT=json");
        std::process::exit(2);
    }

    if let Err(e) = run(config, paths).await {
        error!("export failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(config: ExporterConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp4".to_string());
        let media = tokio::fs::read(path).await?;
        sources.push(ClipSource::new(name, media));
    }

    let mut store = ClipStore::new();
    store
        .import(sources, &FfprobeDuration, config.default_outro_seconds)
        .await?;
    for warning in store.warnings() {
        warn!("{warning}");
    }

    let mut orchestrator = ExportOrchestrator::new(FfmpegEngine::new(), ResourceStore::in_temp()?);

    let mut progress = orchestrator.subscribe();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let update = progress.borrow_and_update().clone();
            info!("{} ({}%)", update.stage, update.percent);
        }
    });

    let report = orchestrator.export(&store, &config.options()).await?;

    if let Some(output) = orchestrator.output() {
        tokio::fs::copy(output.path(), &config.output).await?;
        info!(
            file = %config.output.display(),
            clips = report.clip_count,
            seconds = report.output_seconds,
            "wrote export"
        );
    }
    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(false))
            .with(env_filter)
            .init();
    }
}
