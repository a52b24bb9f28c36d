//! crates/myrsspress_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases,
//! feed endpoints, or LLM APIs.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Article, Category, CuratedFeed, FeedSuggestion, FeedUsage, FetchedFeed, Locale, Newspaper,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Newspapers ---
    /// Inserts or replaces a newspaper record. Historical editions are keyed
    /// by (id, edition_date); the base record has no edition date.
    async fn save_newspaper(&self, newspaper: &Newspaper) -> PortResult<()>;

    async fn get_newspaper(&self, id: &str) -> PortResult<Newspaper>;

    async fn get_edition(&self, id: &str, date: NaiveDate) -> PortResult<Option<Newspaper>>;

    /// Increments the view counter and returns the new value.
    async fn increment_view_count(&self, id: &str) -> PortResult<i64>;

    async fn list_public_newspapers(
        &self,
        locale: Option<Locale>,
        limit: i64,
    ) -> PortResult<Vec<Newspaper>>;

    /// Returns up to `limit` (id, edition_date) keys of editions dated
    /// strictly before `cutoff`, for the retention sweep.
    async fn list_editions_older_than(
        &self,
        cutoff: NaiveDate,
        limit: i64,
    ) -> PortResult<Vec<(String, NaiveDate)>>;

    /// Deletes the given edition keys and returns how many rows went away.
    async fn delete_editions(&self, keys: &[(String, NaiveDate)]) -> PortResult<u64>;

    // --- Category Taxonomy ---
    async fn create_category(&self, category: &Category) -> PortResult<()>;

    async fn get_category(&self, id: &str) -> PortResult<Category>;

    async fn list_categories(
        &self,
        locale: Option<Locale>,
        include_inactive: bool,
    ) -> PortResult<Vec<Category>>;

    async fn update_category(&self, category: &Category) -> PortResult<()>;

    /// Soft delete: flips `is_active` off, never removes the row.
    async fn deactivate_category(&self, id: &str) -> PortResult<()>;

    // --- Curated Feeds ---
    async fn create_feed(&self, feed: &CuratedFeed) -> PortResult<()>;

    async fn get_feed(&self, id: &str) -> PortResult<CuratedFeed>;

    async fn list_feeds(
        &self,
        category_id: Option<&str>,
        include_inactive: bool,
    ) -> PortResult<Vec<CuratedFeed>>;

    /// Top-priority active feeds across all categories of a locale; this is
    /// the "default feed" set used to fill out thin newspapers.
    async fn list_feeds_for_locale(&self, locale: Locale, limit: i64)
        -> PortResult<Vec<CuratedFeed>>;

    async fn update_feed(&self, feed: &CuratedFeed) -> PortResult<()>;

    async fn deactivate_feed(&self, id: &str) -> PortResult<()>;

    async fn feed_exists(&self, category_id: &str, url: &str) -> PortResult<bool>;

    // --- Feed Usage ---
    /// Records one use of a feed for a category and returns the updated
    /// aggregate statistics.
    async fn record_feed_use(
        &self,
        feed_url: &str,
        category_id: &str,
        success: bool,
        article_count: i64,
    ) -> PortResult<FeedUsage>;

    async fn get_feed_usage(
        &self,
        feed_url: &str,
        category_id: &str,
    ) -> PortResult<Option<FeedUsage>>;
}

#[async_trait]
pub trait FeedFetchService: Send + Sync {
    /// Fetches and parses one feed URL into articles.
    async fn fetch(&self, url: &str) -> PortResult<FetchedFeed>;
}

#[async_trait]
pub trait FeedSuggestionService: Send + Sync {
    /// Suggests RSS feeds matching a free-form theme.
    async fn suggest_feeds(&self, theme: &str, locale: Locale) -> PortResult<Vec<FeedSuggestion>>;

    /// Proposes a newspaper name for a theme.
    async fn suggest_name(&self, theme: &str, locale: Locale) -> PortResult<String>;
}

#[async_trait]
pub trait ArticleCurationService: Send + Sync {
    /// Assigns a 0-100 importance score to each article, in input order.
    async fn score_articles(
        &self,
        theme: &str,
        locale: Locale,
        articles: &[Article],
    ) -> PortResult<Vec<u8>>;

    /// Detects the dominant language of a set of articles.
    async fn detect_locale(&self, articles: &[Article]) -> PortResult<Locale>;
}

#[async_trait]
pub trait EditorialService: Send + Sync {
    /// Generates a short front-page summary for the newspaper.
    async fn generate_summary(&self, articles: &[Article], locale: Locale) -> PortResult<String>;

    /// Generates an editorial column for the newspaper.
    async fn generate_editorial(
        &self,
        theme: &str,
        articles: &[Article],
        locale: Locale,
    ) -> PortResult<String>;
}
