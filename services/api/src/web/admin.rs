//! services/api/src/web/admin.rs
//!
//! Admin handlers for the category/feed taxonomy and the manual cleanup
//! trigger. All routes here sit behind the `require_admin_key` middleware.

use crate::cleanup;
use crate::newspaper::dates;
use crate::web::rest::port_error_response;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use myrsspress_core::domain::{Category, CuratedFeed, Locale};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// Payload Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub locale: Locale,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    pub category_id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub locale: Option<Locale>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: u64,
    pub batches: u32,
}

fn validation_error(message: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.to_string())
}

//=========================================================================================
// Category Handlers
//=========================================================================================

pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let categories = state
        .db
        .list_categories(query.locale, query.include_inactive)
        .await
        .map_err(port_error_response)?;
    Ok(Json(categories))
}

pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err(validation_error("category name is required"));
    }
    let now = Utc::now();
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        locale: payload.locale,
        keywords: normalize_keywords(payload.keywords),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state
        .db
        .create_category(&category)
        .await
        .map_err(port_error_response)?;
    info!(id = %category.id, "created category");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err(validation_error("category name is required"));
    }
    let mut category = state
        .db
        .get_category(&id)
        .await
        .map_err(port_error_response)?;
    category.name = payload.name.trim().to_string();
    category.locale = payload.locale;
    category.keywords = normalize_keywords(payload.keywords);
    category.updated_at = Utc::now();
    state
        .db
        .update_category(&category)
        .await
        .map_err(port_error_response)?;
    Ok(Json(category))
}

pub async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .deactivate_category(&id)
        .await
        .map_err(port_error_response)?;
    info!(id = %id, "deactivated category");
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Curated Feed Handlers
//=========================================================================================

pub async fn list_feeds_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let feeds = state
        .db
        .list_feeds(query.category_id.as_deref(), query.include_inactive)
        .await
        .map_err(port_error_response)?;
    Ok(Json(feeds))
}

pub async fn create_feed_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.url.trim().is_empty() {
        return Err(validation_error("feed url is required"));
    }
    // Category must exist before a feed can reference it.
    state
        .db
        .get_category(&payload.category_id)
        .await
        .map_err(port_error_response)?;

    let now = Utc::now();
    let feed = CuratedFeed {
        id: Uuid::new_v4().to_string(),
        category_id: payload.category_id,
        url: payload.url.trim().to_string(),
        title: payload.title.trim().to_string(),
        priority: payload.priority,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state
        .db
        .create_feed(&feed)
        .await
        .map_err(port_error_response)?;
    info!(id = %feed.id, "created curated feed");
    Ok((StatusCode::CREATED, Json(feed)))
}

pub async fn update_feed_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<FeedPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.url.trim().is_empty() {
        return Err(validation_error("feed url is required"));
    }
    let mut feed = state.db.get_feed(&id).await.map_err(port_error_response)?;
    feed.category_id = payload.category_id;
    feed.url = payload.url.trim().to_string();
    feed.title = payload.title.trim().to_string();
    feed.priority = payload.priority;
    feed.updated_at = Utc::now();
    state
        .db
        .update_feed(&feed)
        .await
        .map_err(port_error_response)?;
    Ok(Json(feed))
}

pub async fn delete_feed_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .deactivate_feed(&id)
        .await
        .map_err(port_error_response)?;
    info!(id = %id, "deactivated curated feed");
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Cleanup Trigger
//=========================================================================================

/// Runs the edition retention sweep immediately.
pub async fn trigger_cleanup_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let stats = cleanup::sweep_expired_editions(state.db.as_ref(), dates::today())
        .await
        .map_err(port_error_response)?;
    Ok(Json(CleanupResponse {
        deleted: stats.deleted,
        batches: stats.batches,
    }))
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
