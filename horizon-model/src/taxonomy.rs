//! The three-level taxonomy classifying catalog images, plus the image
//! record itself.
//!
//! Every `Group`, `Subgroup` and `ImageRecord` resolves to exactly one
//! ancestor chain up to a `Family`; the database enforces the per-parent
//! name uniqueness these types assume.

/// Root of the taxonomy. Family names are globally unique.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Family {
    pub id: i32,
    pub name: String,
}

/// Second taxonomy level. Unique per `(family_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Group {
    pub id: i32,
    pub family_id: i32,
    pub name: String,
}

/// Third taxonomy level. Unique per `(group_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Subgroup {
    pub id: i32,
    pub group_id: i32,
    pub name: String,
}

/// A catalog image and its thumbnail, unique per `(subgroup_id, name)`.
///
/// `usage_count` is monotonically non-decreasing; only the explicit
/// increase-usage operation persists an increment. `thumb_path` equals
/// `file_path` for families that carry no distinct thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ImageRecord {
    pub id: i32,
    pub subgroup_id: i32,
    pub name: String,
    pub file_path: String,
    pub thumb_path: String,
    pub usage_count: i32,
    pub meta_tags: Vec<String>,
}
