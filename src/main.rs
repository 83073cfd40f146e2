use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard::config::PollerConfig;
use taskboard::dashboard::{app, Dashboard};
use taskboard::poller::Poller;
use taskboard::shutdown::install_shutdown_handler;
use taskboard::source::HttpSource;

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Live terminal dashboard for a job queue's /data endpoint")]
struct Args {
    /// Base URL of the job queue server
    #[arg(long, short = 'u', default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Path of the snapshot endpoint
    #[arg(long, default_value = "/data")]
    path: String,

    /// Milliseconds between refreshes
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Per-request timeout in milliseconds (transport default when unset)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Skip a refresh while the previous request is still in flight
    #[arg(long)]
    skip_overlapping: bool,

    /// Log each refresh instead of drawing the terminal UI
    #[arg(long)]
    headless: bool,

    /// Write logs to this file while the terminal UI is active
    #[arg(long, conflicts_with = "headless")]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal UI owns stdout, so logs either go to a file or nowhere.
    if args.headless {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else if let Some(path) = &args.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init();
    }
    Ok(())
}

fn build_config(args: &Args) -> PollerConfig {
    let mut config = PollerConfig::new(args.url.clone())
        .with_data_path(args.path.clone())
        .with_interval_ms(args.interval_ms)
        .with_skip_overlapping(args.skip_overlapping);
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_request_timeout_ms(timeout_ms);
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = build_config(&args);
    config.validate()?;

    let source = HttpSource::new(&config)?;
    tracing::info!(
        endpoint = %source.endpoint(),
        headless = args.headless,
        "Starting taskboard"
    );

    let poller = Poller::new(source, Dashboard::new().shared(), config);
    let shutdown = install_shutdown_handler();

    if args.headless {
        poller.run(shutdown).await;
    } else {
        app::run(poller, shutdown).await?;
    }

    Ok(())
}
