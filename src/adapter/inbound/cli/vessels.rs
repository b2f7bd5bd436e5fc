//! Handler for the `vessels` command.

use crate::adapter::inbound::cli::command::VesselsArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::stats::VesselStatistics;
use crate::domain::vessel::VesselRecord;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::VesselStore;

/// Execute the vessels command.
pub fn execute(args: &VesselsArgs) -> Result<()> {
    let mut config = Config::load_unvalidated(&args.config)?;
    if let Some(database) = &args.database {
        config.persistence.database = database.display().to_string();
    }

    let store = bootstrap::open_store(&config.persistence)?;
    let mut records = store.get_all()?;
    let stats = summarize(&records);

    output::section("Stored Vessels");
    output::field("Database", &config.persistence.database);
    output::field("Total", stats.total);
    output::field("Tankers", stats.tankers());
    output::field("Cargo", stats.cargo());
    output::field(
        "Last update",
        stats
            .last_update
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339()),
    );

    if !stats.by_type.is_empty() {
        output::section("By Ship Type");
        for (code, count) in &stats.by_type {
            output::field(&code.to_string(), count);
        }
    }

    if args.limit > 0 && !records.is_empty() {
        records.sort_by(|a, b| b.last_update.cmp(&a.last_update));
        output::section("Recently Updated");
        for record in records.iter().take(args.limit) {
            output::field(&record.id.to_string(), describe(record));
        }
    }

    Ok(())
}

fn summarize(records: &[VesselRecord]) -> VesselStatistics {
    let mut stats = VesselStatistics::default();
    for record in records {
        stats.record(record.ship_type, record.last_update);
    }
    stats
}

fn describe(record: &VesselRecord) -> String {
    let position = record
        .position()
        .map_or_else(|| "no position".to_string(), |(lat, lon)| format!("{lat:.4}, {lon:.4}"));
    let kind = record
        .kind()
        .map_or("Unknown", |kind| kind.category());
    format!("{} ({kind}) {position}", record.display_name())
}
