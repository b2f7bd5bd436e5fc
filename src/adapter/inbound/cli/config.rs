//! Handler for the `config` command group.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load_unvalidated(path)?;

    output::section("Feed");
    output::field("URL", &config.feed.url);
    output::field(
        "API key",
        if config.feed.api_key.is_empty() { "(not set)" } else { "(set)" },
    );
    output::field("Bounding boxes", config.bounding_boxes()?.len());

    output::section("Connection");
    output::field("Reconnect min", format!("{} ms", config.reconnection.min_delay_ms));
    output::field("Reconnect max", format!("{} ms", config.reconnection.max_delay_ms));
    output::field("Keepalive", format!("{} s", config.keepalive.interval_secs));
    output::field("Pong timeout", format!("{} s", config.keepalive.timeout_secs));

    output::section("Ingest");
    output::field("Queue capacity", config.ingest.queue_capacity);
    output::field("Batch size", config.ingest.batch_size);
    output::field(
        "Tracking cap",
        config
            .ingest
            .max_tracked_vessels
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
    );

    output::section("Persistence");
    output::field("Database", &config.persistence.database);
    output::field("Flush threshold", config.persistence.flush_threshold);
    output::field("Flush interval", format!("{} s", config.persistence.flush_interval_secs));
    output::field("Max attempts", config.persistence.max_attempts);

    output::section("Regions");
    for region in config.regions()? {
        let b = region.bounds;
        output::field(
            &region.name,
            format!("[{}, {}] .. [{}, {}]", b.south, b.west, b.north, b.east),
        );
    }
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    Config::load(path)?;
    output::success(&format!("{} is valid", path.display()));
    Ok(())
}
