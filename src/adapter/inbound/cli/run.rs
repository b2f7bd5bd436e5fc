//! Handler for the `run` command.

use tokio::signal;
use tracing::{error, info};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::application::stream::ConnectionState;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    if let Some(database) = &args.database {
        config.persistence.database = database.display().to_string();
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || output::is_json() {
        config.logging.format = "json".into();
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Feed", &config.feed.url);
    output::field("Database", &config.persistence.database);
    output::field("Regions", config.regions()?.len());
    output::field("Batch size", config.ingest.batch_size);
    output::field("Flush threshold", config.persistence.flush_threshold);

    config.init_logging();
    info!("vesselwatch starting");

    let handle = bootstrap::start(&config).await?;
    let mut state = handle.state();

    tokio::select! {
        _ = signal::ctrl_c() => info!("Shutdown signal received"),
        _ = state.wait_for(|s| *s == ConnectionState::Stopped) => {
            error!("Stream client stopped unexpectedly");
        }
    }

    let status = handle.status();
    info!(
        vessels = status.vessels,
        accepted = status.ingest.accepted,
        malformed = status.ingest.malformed,
        reconnects = status.stream.reconnects,
        lost_records = status.durability.lost_records,
        "Final ingest status"
    );

    let report = handle.stop().await?;
    output::success(&format!("Stopped, {} records flushed on exit", report.records));
    Ok(())
}
