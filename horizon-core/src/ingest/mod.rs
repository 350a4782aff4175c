//! Folder ingestion: synchronize the taxonomy tables and image rows
//! with a directory tree of `family/group/subgroup/image` files.
//!
//! The run is a pipeline of steps — enumerate the tree, ensure
//! thumbnails, diff against the store, apply everything in one
//! transaction. Per-file problems are collected into the report and
//! never abort the run; only store failures do.

use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{CoreError, Result};

pub mod apply;
pub mod thumbs;
pub mod walk;

pub use walk::{DiscoveredImage, NO_THUMBNAIL_FAMILY, STORED_PREFIX};

/// One file or directory the pipeline could not process.
#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub upserted: usize,
    pub deleted: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrates one ingestion run against a static image root.
pub struct IngestPipeline {
    pool: PgPool,
    root: PathBuf,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl IngestPipeline {
    pub fn new(pool: PgPool, root: PathBuf) -> Self {
        Self { pool, root }
    }

    pub async fn run(&self) -> Result<IngestReport> {
        let root = self.root.clone();

        // Directory walking and image resizing are blocking work.
        let (ready, failures) = tokio::task::spawn_blocking(move || {
            let mut failures = Vec::new();
            let discovered = walk::enumerate_tree(&root, &mut failures);
            let ready = thumbs::ensure_thumbnails(discovered, &mut failures);
            (ready, failures)
        })
        .await
        .map_err(|e| CoreError::internal(format!("ingest worker task failed: {e}")))?;

        let existing = apply::load_existing(&self.pool).await?;
        let delete_ids = apply::compute_delete_set(&existing, |stored| {
            disk_path_for(&self.root, stored).exists()
        });

        let (upserted, deleted) = apply::apply(&self.pool, &ready, &delete_ids).await?;

        for failure in &failures {
            warn!(path = %failure.path.display(), reason = %failure.reason, "ingest skipped entry");
        }
        info!(
            upserted,
            deleted,
            failed = failures.len(),
            root = %self.root.display(),
            "ingestion run complete"
        );

        Ok(IngestReport {
            upserted,
            deleted,
            failures,
        })
    }
}

/// Resolve a stored relative path (`static/images/...`) to its on-disk
/// location under the configured root.
pub fn disk_path_for(root: &Path, stored: &str) -> PathBuf {
    let rel = stored
        .strip_prefix(STORED_PREFIX)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(stored);
    root.join(rel)
}
