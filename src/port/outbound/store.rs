//! Durable vessel storage port.

use crate::domain::{id::VesselId, vessel::VesselRecord};
use crate::error::Result;

/// Storage for vessel snapshots, keyed by vessel id.
///
/// Calls are blocking; async callers run them on the blocking pool.
pub trait VesselStore: Send + Sync + 'static {
    /// Upsert every record in one transaction. Returns the number written.
    ///
    /// Either all records become durable or none do.
    fn save_batch(&self, records: &[VesselRecord]) -> Result<usize>;

    /// Latest stored snapshot for `id`.
    fn get(&self, id: VesselId) -> Result<Option<VesselRecord>>;

    /// Every stored snapshot.
    fn get_all(&self) -> Result<Vec<VesselRecord>>;

    /// Number of stored vessels.
    fn count(&self) -> Result<usize> {
        self.get_all().map(|records| records.len())
    }
}
