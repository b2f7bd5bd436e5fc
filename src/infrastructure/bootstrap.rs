//! Composition root: builds concrete adapters from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::aisstream::{AisStreamConnection, AisStreamDecoder};
use crate::adapter::outbound::sqlite::database::connection::enable_wal;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteVesselStore};
use crate::error::Result;
use crate::infrastructure::config::persistence::PersistenceConfig;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::pipeline::{Pipeline, PipelineHandle};
use crate::port::outbound::feed::FeedConnection;
use crate::port::outbound::store::VesselStore;

/// Open the SQLite store, applying pending migrations.
///
/// # Errors
/// Returns an error when the database cannot be opened or migrated.
pub fn open_store(config: &PersistenceConfig) -> Result<Arc<SqliteVesselStore>> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    enable_wal(&pool)?;
    info!(database = %config.database, "Database initialized");
    Ok(Arc::new(SqliteVesselStore::new(pool)))
}

/// The live feed connection for `config`.
#[must_use]
pub fn feed_connection(config: &Config) -> Box<dyn FeedConnection> {
    Box::new(AisStreamConnection::new(config.feed.url.clone()))
}

/// Start the full pipeline against the live feed and the configured database.
///
/// # Errors
/// Returns an error when the database cannot be opened or the first feed
/// connection fails.
pub async fn start(config: &Config) -> Result<PipelineHandle> {
    let store: Arc<dyn VesselStore> = {
        let config = config.persistence.clone();
        tokio::task::spawn_blocking(move || open_store(&config))
            .await
            .map_err(|e| crate::error::Error::Connection(e.to_string()))??
    };
    Pipeline::new(config.clone())
        .start(feed_connection(config), store, Arc::new(AisStreamDecoder))
        .await
}
