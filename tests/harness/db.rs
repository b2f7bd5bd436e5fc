use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use vesselwatch::adapter::outbound::sqlite::SqliteVesselStore;
use vesselwatch::infrastructure::bootstrap;
use vesselwatch::infrastructure::config::persistence::PersistenceConfig;

/// Temporary SQLite database for integration tests, removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("vessels.db");
        Self { dir, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig {
            database: self.path.display().to_string(),
            ..PersistenceConfig::default()
        }
    }

    /// Open a fresh store on the database, running migrations.
    pub fn open(&self) -> Arc<SqliteVesselStore> {
        bootstrap::open_store(&self.persistence()).expect("open sqlite store")
    }
}
