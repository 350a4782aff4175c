//! Catalog handlers: thin adapters from HTTP input to the catalog
//! service, rewriting stored relative paths to absolute URLs on the way
//! out.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use horizon_core::service::DEFAULT_LEAST_USED_COUNT;
use horizon_model::ImageRecord;

use crate::{errors::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub family: String,
}

#[derive(Debug, Deserialize)]
pub struct LeastUsedParams {
    pub family: Option<String>,
    pub count: Option<i64>,
}

/// Response shape of the by-number lookup: just the absolute file path.
#[derive(Debug, Serialize)]
pub struct ImagePathResponse {
    pub file_path: String,
}

pub async fn images_by_taxonomy_handler(
    State(state): State<AppState>,
    Path((family, group, subgroup)): Path<(String, String, String)>,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    let mut images = state
        .catalog
        .images_by_taxonomy(&family, &group, &subgroup)
        .await?;

    rewrite_paths(&mut images, &state.config.server.base_url);
    Ok(Json(images))
}

pub async fn search_images_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    let mut images = state.catalog.search(&params.keyword, &params.family).await?;

    rewrite_paths(&mut images, &state.config.server.base_url);
    Ok(Json(images))
}

pub async fn image_by_number_handler(
    State(state): State<AppState>,
    Path((family, group, subgroup, number)): Path<(String, String, String, String)>,
) -> Result<Json<ImagePathResponse>, AppError> {
    let image = state
        .catalog
        .image_by_number(&family, &group, &subgroup, &number)
        .await?;

    Ok(Json(ImagePathResponse {
        file_path: absolute_url(&state.config.server.base_url, &image.file_path),
    }))
}

pub async fn least_used_images_handler(
    State(state): State<AppState>,
    Query(params): Query<LeastUsedParams>,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    let family = params
        .family
        .ok_or_else(|| AppError::bad_request("family parameter is required"))?;
    let count = params.count.unwrap_or(DEFAULT_LEAST_USED_COUNT);

    debug!(family, count, "fetching least used images");
    let mut images = state.catalog.least_used(&family, count).await?;

    rewrite_paths(&mut images, &state.config.server.base_url);
    Ok(Json(images))
}

pub async fn increase_usage_handler(
    State(state): State<AppState>,
    Path(thumb_path): Path<String>,
) -> Result<&'static str, AppError> {
    state.catalog.increase_usage(&thumb_path).await?;
    Ok("Usage count increased")
}

fn rewrite_paths(images: &mut [ImageRecord], base_url: &str) {
    for image in images {
        image.file_path = absolute_url(base_url, &image.file_path);
        image.thumb_path = absolute_url(base_url, &image.thumb_path);
    }
}

fn absolute_url(base_url: &str, stored_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = stored_path.trim_start_matches('/');
    format!("{base}/{path}")
}
