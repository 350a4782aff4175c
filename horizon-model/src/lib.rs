//! Core data model definitions shared across Horizon crates.
#![allow(missing_docs)]

pub mod taxonomy;

// Intentionally curated re-exports for downstream consumers.
pub use taxonomy::{Family, Group, ImageRecord, Subgroup};
