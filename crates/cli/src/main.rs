use crate::{commands::Commands, error::CliError};
use clap::Parser;
use connectors::{
    history::PgLoadHistory,
    kube::Kubectl,
    store::{S3Config, S3Store},
};
use engine_config::{env::EnvManager, settings::Settings};
use engine_runtime::{
    error::IngestError,
    orchestrator::{Orchestrator, OrchestratorParams},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};

mod commands;
mod error;
mod shutdown;

#[derive(Parser)]
#[command(name = "stevedore", version = "0.1.0", about = "Unattended ingestion orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { env_file } => {
            let settings = load_settings(env_file)?;
            run_loop(settings).await?;
        }
    }

    Ok(())
}

fn load_settings(env_file: Option<String>) -> Result<Settings, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(&path)?;
    }

    Ok(Settings::resolve(&env)?)
}

async fn run_loop(settings: Settings) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    shutdown::register_handlers(cancel.clone());

    let store = Arc::new(
        S3Store::new(S3Config {
            bucket: settings.bucket.clone(),
            region: settings.s3_region.clone(),
            endpoint: settings.s3_endpoint.clone(),
        })
        .await,
    );

    let mut kube = Kubectl::new(settings.kube_token.clone());
    if let Some(context) = &settings.kube_context {
        kube = kube.with_context(context.clone());
    }
    if let Some(namespace) = &settings.kube_namespace {
        kube = kube.with_namespace(namespace.clone());
    }

    let history = Arc::new(PgLoadHistory::connect(&settings.history_url).await?);

    let orchestrator = Orchestrator::new(OrchestratorParams {
        store,
        orchestrator: Arc::new(kube),
        history,
        pending_prefix: settings.pending_prefix.clone(),
        poll_interval: settings.poll_interval,
        cancel,
    });

    info!(bucket = %settings.bucket, "Starting ingestion loop");

    match orchestrator.run().await {
        Err(IngestError::ShutdownRequested) => {
            info!("Shutdown complete");
            Ok(())
        }
        other => other.map_err(CliError::from),
    }
}
