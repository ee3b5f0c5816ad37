//! Opportunity feeds and team-code normalization

pub mod snapshot;
pub mod teams;

pub use snapshot::{parse_snapshot, SnapshotFeed, SnapshotRecord};
