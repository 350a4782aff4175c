//! Catalog service: input validation and the display-time usage
//! increment, layered over the repository port.

use std::sync::Arc;

use tracing::{debug, warn};

use horizon_model::ImageRecord;

use crate::{
    error::{CoreError, Result},
    repository::ImageRepository,
};

/// Number of images the least-used endpoint returns when the caller
/// does not ask for a specific count.
pub const DEFAULT_LEAST_USED_COUNT: i64 = 6;

pub struct CatalogService {
    repo: Arc<dyn ImageRepository>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ImageRepository>) -> Self {
        Self { repo }
    }

    /// Images under an exact family/group/subgroup chain.
    ///
    /// The returned records carry a usage count incremented in memory
    /// only; the stored counter is untouched. The persisted increment
    /// lives solely in [`Self::increase_usage`] and the two are kept
    /// deliberately separate.
    pub async fn images_by_taxonomy(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
    ) -> Result<Vec<ImageRecord>> {
        if family.trim().is_empty() || group.trim().is_empty() || subgroup.trim().is_empty() {
            warn!(family, group, subgroup, "rejecting empty taxonomy segment");
            return Err(CoreError::validation(
                "family, group and subgroup must not be empty",
            ));
        }

        let mut images = self
            .repo
            .images_by_family_group_subgroup(family, group, subgroup)
            .await?;

        for image in &mut images {
            image.usage_count += 1;
        }

        Ok(images)
    }

    /// Keyword search within a family. An empty or whitespace-only
    /// keyword is an empty result, not an error and not a full listing.
    pub async fn search(&self, keyword: &str, family: &str) -> Result<Vec<ImageRecord>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            debug!(family, "empty search keyword, returning no results");
            return Ok(Vec::new());
        }

        self.repo.search_images(keyword, family).await
    }

    pub async fn image_by_number(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
        number: &str,
    ) -> Result<ImageRecord> {
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::validation(format!(
                "image number must be numeric, got `{number}`"
            )));
        }

        self.repo
            .find_image_by_number(family, group, subgroup, number)
            .await
    }

    pub async fn least_used(&self, family: &str, limit: i64) -> Result<Vec<ImageRecord>> {
        if family.trim().is_empty() {
            return Err(CoreError::validation("family must not be empty"));
        }
        if limit < 0 {
            return Err(CoreError::validation(format!(
                "count must be non-negative, got {limit}"
            )));
        }

        self.repo.least_used_images(family, limit).await
    }

    /// Persist exactly one usage increment for the image with this
    /// thumbnail path.
    pub async fn increase_usage(&self, thumb_path: &str) -> Result<()> {
        if thumb_path.trim().is_empty() {
            return Err(CoreError::validation("thumbnail path must not be empty"));
        }

        self.repo.increase_usage_count(thumb_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockImageRepository;

    fn record(name: &str, usage_count: i32) -> ImageRecord {
        ImageRecord {
            id: 1,
            subgroup_id: 1,
            name: name.to_string(),
            file_path: format!("static/images/{name}.jpg"),
            thumb_path: format!("static/images/{name}_thumb.jpg"),
            usage_count,
            meta_tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn taxonomy_lookup_increments_results_in_memory_only() {
        let mut repo = MockImageRepository::new();
        repo.expect_images_by_family_group_subgroup()
            .withf(|f, g, s| (f, g, s) == ("Fabrics", "Silk", "Plain"))
            .times(1)
            .returning(|_, _, _| Ok(vec![record("a", 0), record("b", 41)]));

        let service = CatalogService::new(Arc::new(repo));
        let images = service
            .images_by_taxonomy("Fabrics", "Silk", "Plain")
            .await
            .expect("lookup succeeds");

        assert_eq!(images[0].usage_count, 1);
        assert_eq!(images[1].usage_count, 42);
    }

    #[tokio::test]
    async fn empty_taxonomy_segment_is_a_validation_error() {
        let mut repo = MockImageRepository::new();
        repo.expect_images_by_family_group_subgroup().never();

        let service = CatalogService::new(Arc::new(repo));
        let err = service
            .images_by_taxonomy("Fabrics", " ", "Plain")
            .await
            .expect_err("blank group must fail");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_keyword_short_circuits_without_querying() {
        let mut repo = MockImageRepository::new();
        repo.expect_search_images().never();

        let service = CatalogService::new(Arc::new(repo));
        let images = service.search("   \t", "Fabrics").await.expect("empty ok");
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn keyword_is_trimmed_before_the_query() {
        let mut repo = MockImageRepository::new();
        repo.expect_search_images()
            .withf(|keyword, family| keyword == "silk" && family == "Fabrics")
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = CatalogService::new(Arc::new(repo));
        service.search("  silk  ", "Fabrics").await.expect("search ok");
    }

    #[tokio::test]
    async fn non_numeric_image_number_is_rejected() {
        let mut repo = MockImageRepository::new();
        repo.expect_find_image_by_number().never();

        let service = CatalogService::new(Arc::new(repo));
        let err = service
            .image_by_number("Fabrics", "Silk", "Plain", "12a")
            .await
            .expect_err("non-numeric number must fail");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn least_used_requires_a_family() {
        let mut repo = MockImageRepository::new();
        repo.expect_least_used_images().never();

        let service = CatalogService::new(Arc::new(repo));
        let err = service
            .least_used("", DEFAULT_LEAST_USED_COUNT)
            .await
            .expect_err("empty family must fail");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn increase_usage_passes_the_path_through() {
        let mut repo = MockImageRepository::new();
        repo.expect_increase_usage_count()
            .withf(|path| path == "static/images/Fabrics/Silk/Plain/a_thumb.jpg")
            .times(1)
            .returning(|_| Ok(()));

        let service = CatalogService::new(Arc::new(repo));
        service
            .increase_usage("static/images/Fabrics/Silk/Plain/a_thumb.jpg")
            .await
            .expect("increment ok");
    }
}
