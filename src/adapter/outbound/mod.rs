//! Outbound adapters (driven side).

pub mod aisstream;
pub mod sqlite;
