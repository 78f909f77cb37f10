use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cli::report::{self, ScanReport};
use cli::watch;
use freshness_core::config::{self, AppConfig};
use freshness_core::pipeline;
use freshness_core::session::ScanSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { files, mime, json } => run_scan(cfg, files, mime, json).await,
        Commands::Watch { dir, json } => run_watch(cfg, dir, json).await,
    }
}

#[derive(Parser)]
#[command(name = "freshness")]
#[command(about = "Produce freshness scanner", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one or more image files
    Scan {
        /// Image files (JPEG, PNG or WebP, up to 5 MiB)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Declared MIME type; derived from the file name when omitted
        #[arg(long)]
        mime: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch a folder and scan images as they arrive
    Watch {
        /// Folder to watch
        dir: PathBuf,
        /// Output one JSON object per scan
        #[arg(long)]
        json: bool,
    },
}

async fn run_scan(
    cfg: AppConfig,
    files: Vec<PathBuf>,
    mime: Option<String>,
    json: bool,
) -> Result<()> {
    let detector = pipeline::build_detector(&cfg)?;
    let mut session = ScanSession::new();

    let mut reports: Vec<ScanReport> = Vec::with_capacity(files.len());
    for path in &files {
        let r = report::scan_file(&detector, &mut session, path, mime.as_deref()).await;
        if !json {
            println!("{}", r.render_text());
        }
        reports.push(r);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} file(s) could not be scanned", failed, reports.len());
    }
    Ok(())
}

async fn run_watch(cfg: AppConfig, dir: PathBuf, json: bool) -> Result<()> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }
    let detector = pipeline::build_detector(&cfg)?;
    let emit = |r: &ScanReport| {
        if json {
            match serde_json::to_string(r) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("could not encode report: {}", e),
            }
        } else {
            println!("{}", r.render_text());
        }
    };
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    watch::watch_dir(&cfg, &detector, &dir, emit, ctrl_c).await
}
