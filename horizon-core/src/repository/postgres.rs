//! PostgreSQL implementation of the repository port.
//!
//! Queries use the runtime-checked `sqlx::query_as` form with
//! [`ImageRecord`] as the row type; `meta_tags` is coalesced so rows
//! predating the array default still decode.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error};

use horizon_model::ImageRecord;

use crate::error::{CoreError, Result};

use super::ImageRepository;

const IMAGE_COLUMNS: &str = "i.id, i.subgroup_id, i.name, i.file_path, i.thumb_path, \
     i.usage_count, COALESCE(i.meta_tags, '{}') AS meta_tags";

#[derive(Clone, Debug)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn subgroup_id_by_chain(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
    ) -> Result<i32> {
        let id: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT s.id
            FROM subgroups s
            JOIN groups g ON s.group_id = g.id
            JOIN families f ON g.family_id = f.id
            WHERE f.name = $1 AND g.name = $2 AND s.name = $3
            "#,
        )
        .bind(family)
        .bind(group)
        .bind(subgroup)
        .fetch_optional(&self.pool)
        .await?;

        id.map(|(id,)| id).ok_or_else(|| {
            CoreError::not_found(format!("no subgroup {family}/{group}/{subgroup}"))
        })
    }

    // Subgroup names are treated as globally unique here; a collision
    // across families resolves to an arbitrary one of them.
    async fn subgroup_id_by_name(&self, subgroup: &str) -> Result<i32> {
        let id: Option<(i32,)> = sqlx::query_as("SELECT id FROM subgroups WHERE name = $1")
            .bind(subgroup)
            .fetch_optional(&self.pool)
            .await?;

        id.map(|(id,)| id)
            .ok_or_else(|| CoreError::not_found(format!("no subgroup named {subgroup}")))
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn images_by_family_group_subgroup(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
    ) -> Result<Vec<ImageRecord>> {
        let subgroup_id = self.subgroup_id_by_chain(family, group, subgroup).await?;

        let images = sqlx::query_as::<_, ImageRecord>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images i WHERE i.subgroup_id = $1 ORDER BY i.name"
        ))
        .bind(subgroup_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            family,
            group,
            subgroup,
            count = images.len(),
            "resolved images by taxonomy chain"
        );
        Ok(images)
    }

    async fn search_images(&self, keyword: &str, family: &str) -> Result<Vec<ImageRecord>> {
        let pattern = format!("%{keyword}%");

        let images = sqlx::query_as::<_, ImageRecord>(&format!(
            r#"
            SELECT {IMAGE_COLUMNS}
            FROM images i
            JOIN subgroups s ON i.subgroup_id = s.id
            JOIN groups g ON s.group_id = g.id
            JOIN families f ON g.family_id = f.id
            WHERE (
                i.name ILIKE f.name || '_' || $1
                OR EXISTS (
                    SELECT 1 FROM unnest(i.meta_tags) AS tag WHERE tag ILIKE $1
                )
            )
            AND f.name = $2
            AND s.name NOT ILIKE '%Wide%'
            AND (f.name != 'Textures' OR s.name = 'Color')
            "#
        ))
        .bind(&pattern)
        .bind(family)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(keyword, family, error = %e, "search query failed");
            CoreError::Store(e)
        })?;

        Ok(images)
    }

    async fn find_image_by_number(
        &self,
        family: &str,
        group: &str,
        subgroup: &str,
        number: &str,
    ) -> Result<ImageRecord> {
        let subgroup_id = self.subgroup_id_by_name(subgroup).await?;
        let name_pattern = format!("{family}_{group}_{subgroup}_%{number}");

        let image = sqlx::query_as::<_, ImageRecord>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images i WHERE i.subgroup_id = $1 AND i.name LIKE $2"
        ))
        .bind(subgroup_id)
        .bind(&name_pattern)
        .fetch_optional(&self.pool)
        .await?;

        image.ok_or_else(|| {
            CoreError::not_found(format!(
                "no image matching {name_pattern} in subgroup {subgroup}"
            ))
        })
    }

    async fn least_used_images(&self, family: &str, limit: i64) -> Result<Vec<ImageRecord>> {
        let images = sqlx::query_as::<_, ImageRecord>(&format!(
            r#"
            SELECT {IMAGE_COLUMNS}
            FROM images i
            JOIN subgroups s ON i.subgroup_id = s.id
            JOIN groups g ON s.group_id = g.id
            JOIN families f ON g.family_id = f.id
            WHERE f.name = $1
              AND s.name NOT ILIKE '%Wide%'
              AND (f.name != 'Textures' OR s.name = 'Color')
            ORDER BY i.usage_count ASC
            LIMIT $2
            "#
        ))
        .bind(family)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn increase_usage_count(&self, thumb_path: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE images SET usage_count = usage_count + 1 WHERE thumb_path = $1")
                .bind(thumb_path)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!(
                "no image with thumbnail path {thumb_path}"
            )));
        }
        Ok(())
    }
}
