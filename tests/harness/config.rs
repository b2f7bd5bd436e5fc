use std::fs;
use std::path::{Path, PathBuf};

use vesselwatch::infrastructure::config::settings::Config;

/// Smallest configuration that passes validation.
pub const MINIMAL_TOML: &str = r#"
[feed]
api_key = "test-key"
"#;

/// A validated config for pipeline tests: fast flushes, the built-in regions.
pub fn pipeline_config() -> Config {
    let mut config = Config::parse_toml(MINIMAL_TOML).expect("minimal config");
    config.ingest.batch_size = 8;
    config.ingest.queue_capacity = 64;
    config.persistence.flush_threshold = 4;
    config.persistence.flush_interval_secs = 1;
    config.persistence.retry_delay_ms = 1;
    config
}

/// Write `contents` to `name` inside `dir`.
pub fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp config");
    path
}
