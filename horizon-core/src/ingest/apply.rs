//! Store reconciliation: the diff and apply pipeline steps.

use std::collections::BTreeSet;

use sqlx::PgPool;
use tracing::debug;

use crate::error::Result;

use super::DiscoveredImage;

/// The slice of an image row the diff step needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredImage {
    pub id: i32,
    pub file_path: String,
}

pub async fn load_existing(pool: &PgPool) -> Result<Vec<StoredImage>> {
    let rows = sqlx::query_as::<_, StoredImage>("SELECT id, file_path FROM images")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Rows whose backing file no longer exists on disk are deleted during
/// reconciliation. Pure over an existence predicate so the policy is
/// testable without a filesystem.
pub fn compute_delete_set(
    existing: &[StoredImage],
    file_exists: impl Fn(&str) -> bool,
) -> Vec<i32> {
    existing
        .iter()
        .filter(|row| !file_exists(&row.file_path))
        .map(|row| row.id)
        .collect()
}

/// Apply the computed sets in a single transaction: delete orphaned
/// rows first, then upsert taxonomy rows and images keyed by their
/// natural names. Returns `(upserted, deleted)` counts.
///
/// The delete must precede the upserts: a file replaced under the same
/// stem but a new extension orphans its old row while the upsert targets
/// the same `(subgroup_id, name)` key, and deleting last would destroy
/// the row the upsert just rewrote.
pub async fn apply(
    pool: &PgPool,
    discovered: &[DiscoveredImage],
    delete_ids: &[i32],
) -> Result<(usize, usize)> {
    let mut tx = pool.begin().await?;

    let mut deleted = 0usize;
    if !delete_ids.is_empty() {
        debug!(count = delete_ids.len(), "deleting rows without backing files");
        let result = sqlx::query("DELETE FROM images WHERE id = ANY($1)")
            .bind(delete_ids.to_vec())
            .execute(&mut *tx)
            .await?;
        deleted = result.rows_affected() as usize;
    }

    // Each taxonomy row once, regardless of how many images share it.
    let families: BTreeSet<&str> = discovered.iter().map(|d| d.family.as_str()).collect();
    let groups: BTreeSet<(&str, &str)> = discovered
        .iter()
        .map(|d| (d.family.as_str(), d.group.as_str()))
        .collect();
    let subgroups: BTreeSet<(&str, &str, &str)> = discovered
        .iter()
        .map(|d| (d.family.as_str(), d.group.as_str(), d.subgroup.as_str()))
        .collect();

    for family in families {
        sqlx::query("INSERT INTO families (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(family)
            .execute(&mut *tx)
            .await?;
    }

    for (family, group) in groups {
        sqlx::query(
            r#"
            INSERT INTO groups (name, family_id)
            VALUES ($1, (SELECT id FROM families WHERE name = $2))
            ON CONFLICT (family_id, name) DO NOTHING
            "#,
        )
        .bind(group)
        .bind(family)
        .execute(&mut *tx)
        .await?;
    }

    for (family, group, subgroup) in subgroups {
        sqlx::query(
            r#"
            INSERT INTO subgroups (name, group_id)
            VALUES ($1, (SELECT g.id FROM groups g
                         WHERE g.name = $2
                           AND g.family_id = (SELECT id FROM families WHERE name = $3)))
            ON CONFLICT (group_id, name) DO NOTHING
            "#,
        )
        .bind(subgroup)
        .bind(group)
        .bind(family)
        .execute(&mut *tx)
        .await?;
    }

    for image in discovered {
        sqlx::query(
            r#"
            INSERT INTO images (name, file_path, thumb_path, subgroup_id)
            VALUES ($1, $2, $3, (SELECT s.id FROM subgroups s
                                 JOIN groups g ON s.group_id = g.id
                                 WHERE s.name = $4
                                   AND g.name = $5
                                   AND g.family_id = (SELECT id FROM families WHERE name = $6)
                                 LIMIT 1))
            ON CONFLICT (subgroup_id, name)
            DO UPDATE SET file_path = EXCLUDED.file_path, thumb_path = EXCLUDED.thumb_path
            "#,
        )
        .bind(&image.name)
        .bind(&image.file_path)
        .bind(&image.thumb_path)
        .bind(&image.subgroup)
        .bind(&image.group)
        .bind(&image.family)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok((discovered.len(), deleted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: i32, path: &str) -> StoredImage {
        StoredImage {
            id,
            file_path: path.to_string(),
        }
    }

    #[test]
    fn only_rows_without_backing_files_are_deleted() {
        let existing = vec![
            stored(1, "static/images/Fabrics/Silk/Plain/a.jpg"),
            stored(2, "static/images/Fabrics/Silk/Plain/gone.jpg"),
            stored(3, "static/images/Frames/Wood/Oak/b.png"),
        ];

        let delete = compute_delete_set(&existing, |path| !path.contains("gone"));
        assert_eq!(delete, vec![2]);
    }

    #[test]
    fn empty_store_yields_no_deletions() {
        assert!(compute_delete_set(&[], |_| false).is_empty());
    }

    #[test]
    fn all_rows_deleted_when_disk_is_empty() {
        let existing = vec![stored(5, "a"), stored(9, "b")];
        assert_eq!(compute_delete_set(&existing, |_| false), vec![5, 9]);
    }
}
