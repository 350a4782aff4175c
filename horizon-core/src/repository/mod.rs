//! Repository port for taxonomy-scoped image lookups.

use async_trait::async_trait;
use horizon_model::ImageRecord;

use crate::error::Result;

pub mod postgres;

pub use postgres::PostgresImageRepository;

/// Taxonomy-scoped reads and writes against the image store.
///
/// Callers never see SQL; `NotFound` covers every no-matching-row
/// outcome and `Store` wraps the driver errors.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// All images under the subgroup resolved by exact
    /// family/group/subgroup names. `NotFound` when the chain does not
    /// resolve.
    async fn images_by_family_group_subgroup(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
    ) -> Result<Vec<ImageRecord>>;

    /// Keyword search within a family. The keyword is matched
    /// case-insensitively against the `family_keyword` name pattern or
    /// any meta tag. Subgroups containing "Wide" are excluded, and the
    /// "Textures" family is restricted to its "Color" subgroup.
    async fn search_images(&self, keyword: &str, family: &str) -> Result<Vec<ImageRecord>>;

    /// The single image whose name matches
    /// `family_group_subgroup_*<number>` under the subgroup resolved by
    /// name alone (subgroup names are assumed unique across families).
    async fn find_image_by_number(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
        number: &str,
    ) -> Result<ImageRecord>;

    /// Up to `limit` images in the family, ascending by usage count,
    /// with the same subgroup exclusions as [`Self::search_images`].
    async fn least_used_images(&self, family: &str, limit: i64) -> Result<Vec<ImageRecord>>;

    /// Persist a single usage increment for the image with this
    /// thumbnail path. Each call is a distinct increment.
    async fn increase_usage_count(&self, thumb_path: &str) -> Result<()>;
}
