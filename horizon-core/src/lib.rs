//! Core services for the Horizon catalog backend: the taxonomy-scoped
//! query layer over PostgreSQL, the access-gate decision types and
//! validator client, and the folder-ingestion pipeline.

pub mod db;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod repository;
pub mod service;

pub use error::{CoreError, Result};
pub use service::CatalogService;
