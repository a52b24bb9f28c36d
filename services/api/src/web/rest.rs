//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the public REST API endpoints and the
//! master definition for the OpenAPI specification.

use crate::newspaper::dates;
use crate::newspaper::{GenerateError, GenerateRequest};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use futures::future::join_all;
use myrsspress_core::domain::{Article, FeedSuggestion, Locale, Newspaper};
use myrsspress_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        suggest_feeds_handler,
        create_newspaper_handler,
    ),
    components(
        schemas(SuggestFeedsRequest, SuggestFeedsResponse, SuggestedFeed, CreateNewspaperRequest)
    ),
    tags(
        (name = "MyRSSPress API", description = "API endpoints for the AI-assisted RSS newspaper builder.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Request payload for feed suggestion.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestFeedsRequest {
    pub theme: String,
    #[schema(value_type = Option<String>, example = "en")]
    pub locale: Option<Locale>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFeed {
    pub url: String,
    pub title: String,
}

/// The response payload for feed suggestion: curated feeds first, then AI
/// suggestions, plus a proposed newspaper name.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestFeedsResponse {
    pub name: String,
    pub feeds: Vec<SuggestedFeed>,
    pub category_id: Option<String>,
}

/// Request payload for newspaper generation.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewspaperRequest {
    pub name: Option<String>,
    pub owner_name: String,
    pub theme: String,
    pub feed_urls: Vec<String>,
    #[schema(value_type = Option<String>, example = "en")]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub is_public: bool,
    pub category_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<Locale>,
}

#[derive(Deserialize)]
pub struct DefaultFeedsQuery {
    pub locale: Option<Locale>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultFeedsResponse {
    pub articles: Vec<Article>,
}

const MAX_THEME_LENGTH: usize = 100;
const MAX_SUGGESTIONS: usize = 10;
const MAX_DEFAULT_ARTICLES: usize = 30;
const DEFAULT_FEED_COUNT: i64 = 5;
const PUBLIC_LIST_LIMIT: i64 = 50;

//=========================================================================================
// Error Mapping
//=========================================================================================

pub(crate) fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Unexpected(msg) => {
            error!("request failed: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn generate_error_response(e: GenerateError) -> (StatusCode, String) {
    match e {
        GenerateError::NoArticles => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        GenerateError::DateOutOfRange(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        GenerateError::Port(port) => port_error_response(port),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Suggest RSS feeds and a newspaper name for a theme.
///
/// Curated feeds for a matching category come first, followed by AI
/// suggestions. AI failures degrade to the curated set alone.
#[utoipa::path(
    post,
    path = "/api/suggest-feeds",
    request_body = SuggestFeedsRequest,
    responses(
        (status = 200, description = "Suggestions for the theme", body = SuggestFeedsResponse),
        (status = 400, description = "Theme is empty or too long"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn suggest_feeds_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SuggestFeedsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let theme = payload.theme.trim();
    if theme.is_empty() || theme.chars().count() > MAX_THEME_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("theme must be 1-{} characters", MAX_THEME_LENGTH),
        ));
    }
    let locale = payload.locale.unwrap_or(Locale::En);

    // A matching category contributes its curated feeds ahead of anything
    // the AI proposes.
    let category = match state.category_cache.match_theme(theme, locale).await {
        Ok(category) => category,
        Err(e) => {
            warn!("category lookup degraded: {}", e);
            None
        }
    };
    let mut feeds: Vec<SuggestedFeed> = Vec::new();
    if let Some(category) = &category {
        let curated = state
            .db
            .list_feeds(Some(&category.id), false)
            .await
            .map_err(port_error_response)?;
        feeds.extend(curated.into_iter().map(|f| SuggestedFeed {
            url: f.url,
            title: f.title,
        }));
    }

    match state.suggest_adapter.suggest_feeds(theme, locale).await {
        Ok(suggested) => {
            for FeedSuggestion { url, title } in suggested {
                if feeds.len() >= MAX_SUGGESTIONS {
                    break;
                }
                if !feeds.iter().any(|f| f.url == url) {
                    feeds.push(SuggestedFeed { url, title });
                }
            }
        }
        Err(e) => warn!("feed suggestion degraded to curated set: {}", e),
    }
    feeds.truncate(MAX_SUGGESTIONS);

    let name = match state.suggest_adapter.suggest_name(theme, locale).await {
        Ok(name) => name,
        Err(e) => {
            warn!("name suggestion degraded to fallback: {}", e);
            match locale {
                Locale::En => format!("The {} Times", theme),
                Locale::Ja => format!("{}新聞", theme),
            }
        }
    };

    Ok(Json(SuggestFeedsResponse {
        name,
        feeds,
        category_id: category.map(|c| c.id),
    }))
}

/// Articles from the locale's top-priority curated feeds, newest first.
pub async fn default_feeds_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DefaultFeedsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let locale = query.locale.unwrap_or(Locale::En);
    let feeds = state
        .db
        .list_feeds_for_locale(locale, DEFAULT_FEED_COUNT)
        .await
        .map_err(port_error_response)?;

    let fetches = join_all(feeds.iter().map(|feed| state.fetcher.fetch(&feed.url))).await;
    let mut articles: Vec<Article> = fetches
        .into_iter()
        .filter_map(|result| match result {
            Ok(feed) => Some(feed.articles),
            Err(e) => {
                warn!("default feed skipped: {}", e);
                None
            }
        })
        .flatten()
        .collect();

    if let Some(date) = query.date {
        articles.retain(|a| a.published_at.is_some_and(|ts| dates::on_day(ts, date)));
    }
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles.truncate(MAX_DEFAULT_ARTICLES);

    Ok(Json(DefaultFeedsResponse { articles }))
}

/// Generate a newspaper from a theme and a set of feed URLs.
#[utoipa::path(
    post,
    path = "/api/newspapers",
    request_body = CreateNewspaperRequest,
    responses(
        (status = 201, description = "Newspaper generated and stored"),
        (status = 400, description = "Invalid request payload"),
        (status = 422, description = "No articles could be fetched")
    )
)]
pub async fn create_newspaper_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateNewspaperRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let theme = payload.theme.trim();
    if theme.is_empty() || theme.chars().count() > MAX_THEME_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("theme must be 1-{} characters", MAX_THEME_LENGTH),
        ));
    }
    if payload.feed_urls.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least one feed url is required".to_string(),
        ));
    }
    if payload.owner_name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "owner name is required".to_string()));
    }

    let request = GenerateRequest {
        name: payload.name,
        owner_name: payload.owner_name,
        theme: theme.to_string(),
        feed_urls: payload.feed_urls,
        locale: payload.locale.unwrap_or(Locale::En),
        is_public: payload.is_public,
        category_id: payload.category_id,
    };
    let newspaper = state
        .generator
        .generate(request)
        .await
        .map_err(generate_error_response)?;
    Ok((StatusCode::CREATED, Json(newspaper)))
}

/// Fetch a newspaper by id, counting the view.
pub async fn get_newspaper_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Newspaper>, (StatusCode, String)> {
    let mut newspaper = state
        .db
        .get_newspaper(&id)
        .await
        .map_err(port_error_response)?;
    newspaper.view_count = state
        .db
        .increment_view_count(&id)
        .await
        .map_err(port_error_response)?;
    Ok(Json(newspaper))
}

/// Fetch (or generate on first request) a historical edition.
pub async fn get_edition_handler(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<Newspaper>, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "date must be formatted YYYY-MM-DD".to_string(),
        )
    })?;
    let edition = state
        .generator
        .generate_edition(&id, date, dates::today())
        .await
        .map_err(generate_error_response)?;
    Ok(Json(edition))
}

/// List public newspapers, most viewed first.
pub async fn list_public_newspapers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocaleQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let newspapers = state
        .db
        .list_public_newspapers(query.locale, PUBLIC_LIST_LIMIT)
        .await
        .map_err(port_error_response)?;
    Ok(Json(newspapers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn port_errors_map_to_status_codes() {
        let (status, body) = port_error_response(PortError::NotFound("Newspaper n1".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Newspaper n1");

        // Internal details never leak to the client.
        let (status, body) = port_error_response(PortError::Unexpected("db down".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }

    #[test]
    fn generate_errors_map_to_status_codes() {
        let (status, _) = generate_error_response(GenerateError::NoArticles);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let stale = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let (status, _) = generate_error_response(GenerateError::DateOutOfRange(stale));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = generate_error_response(GenerateError::Port(PortError::NotFound(
            "Newspaper n1".to_string(),
        )));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
