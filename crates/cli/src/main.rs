mod discover;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dictaphone_core::{
    build_http_client, load_config, validate_config, Config, FsObjectStore, HttpJobService,
    HttpResultFetcher, ItemOutcome, JobService, MailBackend, Mailer, ObjectStore, OutboxMailer,
    PipelineCoordinator, PipelineServices, ResultFetcher, StorageBackend, TracingReporter,
    TranscriptionBackend,
};

/// Transcribe dictaphone recordings and email the transcripts.
#[derive(Debug, Parser)]
#[command(name = "dictaphone", version, about)]
struct Cli {
    /// Configuration file (defaults to $DICTAPHONE_CONFIG, then config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of recordings processed at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Only process the first N recordings found
    #[arg(short, long)]
    limit: Option<usize>,

    /// Keep recordings under their original name after sending
    #[arg(short = 'N', long)]
    no_rename: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("DICTAPHONE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    if let Some(concurrency) = cli.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if cli.no_rename {
        config.pipeline.rename_after_send = false;
    }
    validate_config(&config).context("Configuration validation failed")?;

    let mut items = discover::discover(&config.source)?;
    if let Some(limit) = cli.limit {
        items.truncate(limit);
    }
    if items.is_empty() {
        info!("No recordings found under {:?}", config.source.root);
        return Ok(());
    }
    info!("Found {} recording(s)", items.len());

    let services = build_services(&config)?;
    let coordinator = PipelineCoordinator::new(config.pipeline.clone(), services);
    let report = coordinator.run(items).await;

    for summary in &report.items {
        match &summary.outcome {
            ItemOutcome::Delivered => println!("{}: sent", summary.id),
            ItemOutcome::DeliveredWithoutTranscript { job_status } => {
                println!("{}: sent without transcript (job {})", summary.id, job_status)
            }
            ItemOutcome::Failed { failed_at, error } => {
                println!("{}: failed while {}: {}", summary.id, failed_at, error)
            }
        }
    }
    println!(
        "{} of {} recording(s) sent, {} failed",
        report.delivered(),
        report.total(),
        report.failed()
    );

    Ok(())
}

/// Creates every service once; all items share them.
fn build_services(config: &Config) -> Result<PipelineServices> {
    let object_store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::Filesystem => {
            let fs_config = config
                .storage
                .filesystem
                .as_ref()
                .context("storage.filesystem section missing")?;
            info!("Staging recordings in {:?}", fs_config.root);
            Arc::new(FsObjectStore::new(fs_config, &config.storage.bucket))
        }
    };

    let (jobs, fetcher): (Arc<dyn JobService>, Arc<dyn ResultFetcher>) =
        match config.transcription.backend {
            TranscriptionBackend::Http => {
                let http_config = config
                    .transcription
                    .http
                    .clone()
                    .context("transcription.http section missing")?;
                info!("Using transcription service at {}", http_config.url);
                let client = build_http_client(http_config.timeout_secs)?;
                (
                    Arc::new(HttpJobService::with_client(http_config, client.clone())),
                    Arc::new(HttpResultFetcher::with_client(client)),
                )
            }
        };

    let mailer: Arc<dyn Mailer> = match config.mail.backend {
        MailBackend::Outbox => {
            let outbox = config
                .mail
                .outbox
                .as_ref()
                .context("mail.outbox section missing")?;
            info!("Writing mail to outbox {:?}", outbox.dir);
            Arc::new(OutboxMailer::new(config.mail.from.clone(), outbox))
        }
    };

    info!(
        object_store = object_store.name(),
        jobs = jobs.name(),
        mailer = mailer.name(),
        "Services ready"
    );

    Ok(PipelineServices {
        object_store,
        jobs,
        fetcher,
        mailer,
        reporter: Arc::new(TracingReporter),
    })
}
