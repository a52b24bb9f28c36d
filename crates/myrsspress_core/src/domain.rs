//! crates/myrsspress_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The locales a newspaper or category can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ja,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single article pulled from an RSS feed.
///
/// Articles are ephemeral: they are recomputed per generation request and
/// persisted only as a snapshot inside a [`Newspaper`] record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    /// URL of the feed this article came from.
    pub source_url: String,
    /// Title of the feed this article came from.
    pub source_title: String,
    /// AI-assigned importance score, 0-100. None when scoring degraded.
    pub importance: Option<u8>,
}

/// A named, persisted collection of articles generated from a set of feed
/// URLs for a given theme, and optionally for a specific edition date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newspaper {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub theme: String,
    pub feed_urls: Vec<String>,
    pub articles: Option<Vec<Article>>,
    pub locale: Locale,
    pub view_count: i64,
    pub is_public: bool,
    pub summary: Option<String>,
    pub editorial: Option<String>,
    /// Set on historical editions; None on the base record.
    pub edition_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// An admin-curated category mapping a theme keyword list to curated feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub locale: Locale,
    pub keywords: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A curated RSS feed belonging to a category, ordered by priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedFeed {
    pub id: String,
    pub category_id: String,
    pub url: String,
    pub title: String,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usage statistics for one feed within one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUsage {
    pub feed_url: String,
    pub category_id: String,
    pub use_count: i64,
    pub success_count: i64,
    /// Total number of articles the feed has yielded across all uses.
    pub article_total: i64,
    pub last_used_at: DateTime<Utc>,
}

impl FeedUsage {
    pub fn success_rate(&self) -> f64 {
        if self.use_count == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.use_count as f64
    }

    pub fn avg_articles(&self) -> f64 {
        if self.use_count == 0 {
            return 0.0;
        }
        self.article_total as f64 / self.use_count as f64
    }

    /// A feed qualifies for promotion into the curated table only once it
    /// has at least one recorded use, a 100% success rate, and an average
    /// yield of at least one article.
    pub fn qualifies_for_promotion(&self) -> bool {
        self.use_count >= 1 && self.success_rate() >= 1.0 && self.avg_articles() >= 1.0
    }
}

/// The result of fetching and parsing one RSS feed.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub url: String,
    pub title: String,
    pub articles: Vec<Article>,
}

/// A feed proposed to the user for a theme, either curated or AI-suggested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSuggestion {
    pub url: String,
    pub title: String,
}
