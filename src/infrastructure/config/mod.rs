//! Infrastructure configuration modules.

pub mod feed;
pub mod ingest;
pub mod logging;
pub mod persistence;
pub mod region;
pub mod settings;

pub use settings::Config;
