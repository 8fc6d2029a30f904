use std::process::ExitCode;

use clap::Parser;
use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use reindex_worker::{
    configuration::get_configuration, startup::Application,
    use_cases::reindex_collection::ReindexCollectionRequest,
};
use tracing::{error, info};

/// Recomputes missing embeddings for the points of a Qdrant collection
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Name of the Qdrant collection to reindex
    #[arg(long)]
    collection: String,

    /// Number of points per embedding/upsert batch
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(1..))]
    batch: u32,

    /// Maximum number of points to scan, 0 scanning the whole collection
    #[arg(long, default_value_t = 0)]
    limit: u32,

    /// Computes embeddings but skips the writes
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_subscriber =
        get_tracing_subscriber("reindex_worker".into(), "info".into(), std::io::stdout);
    init_tracing_subscriber(tracing_subscriber);

    // Panics if the configuration can't be read
    let configuration = get_configuration().expect("Failed to read configuration.");

    let application = match Application::build(configuration, &cli.collection) {
        Ok(application) => application,
        Err(error) => {
            error!("Failed to build application: {:?}", error);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Scanning collection '{}' (batch={}, limit={}, dry={})",
        cli.collection, cli.batch, cli.limit, cli.dry_run
    );
    let request = ReindexCollectionRequest {
        batch_size: cli.batch,
        limit: cli.limit,
        dry_run: cli.dry_run,
    };

    match application.run(request).await {
        Ok(summary) => {
            info!(
                "Reindex run complete: {} scanned, {} pending, {} upserted over {} batches",
                summary.scanned, summary.pending, summary.upserted, summary.batches
            );
            info!("👋 Bye!");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Reindex run failed: {:?}", error);
            ExitCode::FAILURE
        }
    }
}
