//! SQLite vessel store implementation.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use tracing::{debug, warn};

use crate::adapter::outbound::sqlite::database::connection::{configure_sqlite_connection, DbPool};
use crate::adapter::outbound::sqlite::database::model::VesselRow;
use crate::adapter::outbound::sqlite::database::schema::vessels;
use crate::domain::{id::VesselId, vessel::VesselRecord};
use crate::error::{Error, Result};
use crate::port::outbound::store::VesselStore;

/// SQLite-backed vessel store.
///
/// Implements the [`VesselStore`] trait. Batches are upserted with
/// `INSERT OR REPLACE` inside a single transaction, so N records cost one
/// commit.
pub struct SqliteVesselStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteVesselStore {
    /// Create a new SQLite vessel store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        if let Err(e) = configure_sqlite_connection(&mut conn) {
            warn!(error = %e, "Failed to configure SQLite connection");
        }
        Ok(conn)
    }
}

impl VesselStore for SqliteVesselStore {
    fn save_batch(&self, records: &[VesselRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows: Vec<VesselRow> = records.iter().map(VesselRow::from).collect();
        let mut conn = self.conn()?;

        let written = conn
            .transaction(|conn| {
                let mut written = 0;
                for row in &rows {
                    written += diesel::replace_into(vessels::table)
                        .values(row)
                        .execute(conn)?;
                }
                Ok::<usize, diesel::result::Error>(written)
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        debug!(records = rows.len(), "Committed vessel batch");
        Ok(written)
    }

    fn get(&self, id: VesselId) -> Result<Option<VesselRecord>> {
        let mut conn = self.conn()?;
        let row: Option<VesselRow> = vessels::table
            .find(i64::from(id))
            .select(VesselRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(VesselRecord::try_from).transpose()
    }

    fn get_all(&self) -> Result<Vec<VesselRecord>> {
        let mut conn = self.conn()?;
        let rows: Vec<VesselRow> = vessels::table
            .order(vessels::mmsi.asc())
            .select(VesselRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(VesselRecord::try_from).collect()
    }

    fn count(&self) -> Result<usize> {
        let mut conn = self.conn()?;
        let count: i64 = vessels::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
