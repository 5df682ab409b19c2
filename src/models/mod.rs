//! Data models for statistics snapshots, profile headers and entity references

mod entity;
mod snapshot;

// Re-export all public types
pub use entity::{EntityRef, ProfileHeader};
pub use snapshot::{CycleWindow, NodeRecord, Rating, RatingTally, SectionRecord, Snapshot};
