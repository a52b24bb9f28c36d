//! services/api/src/category/cache.rs
//!
//! In-memory cache over the category table plus the theme-matching rule
//! used by feed suggestion. Categories change rarely; a short TTL keeps
//! the hot path off the database.

use myrsspress_core::domain::{Category, Locale};
use myrsspress_core::ports::{DatabaseService, PortResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

pub const CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheSlot {
    categories: Vec<Category>,
    refreshed_at: Instant,
}

/// TTL cache of active categories. A failed refresh serves the stale copy
/// rather than failing the caller.
pub struct CategoryCache {
    db: Arc<dyn DatabaseService>,
    ttl: Duration,
    slot: RwLock<Option<CacheSlot>>,
}

impl CategoryCache {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self::with_ttl(db, CACHE_TTL)
    }

    pub fn with_ttl(db: Arc<dyn DatabaseService>, ttl: Duration) -> Self {
        Self {
            db,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the active categories, refreshing from the database when the
    /// cached copy is missing or stale.
    pub async fn categories(&self) -> PortResult<Vec<Category>> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.refreshed_at.elapsed() < self.ttl {
                    return Ok(cached.categories.clone());
                }
            }
        }
        self.refresh().await
    }

    /// Forces a refresh. On failure, falls back to whatever is cached.
    pub async fn refresh(&self) -> PortResult<Vec<Category>> {
        match self.db.list_categories(None, false).await {
            Ok(categories) => {
                let mut slot = self.slot.write().await;
                *slot = Some(CacheSlot {
                    categories: categories.clone(),
                    refreshed_at: Instant::now(),
                });
                Ok(categories)
            }
            Err(e) => {
                let slot = self.slot.read().await;
                match slot.as_ref() {
                    Some(cached) => {
                        warn!("category refresh failed, serving stale copy: {}", e);
                        Ok(cached.categories.clone())
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Finds the category whose keywords match a user theme, if any.
    pub async fn match_theme(&self, theme: &str, locale: Locale) -> PortResult<Option<Category>> {
        let categories = self.categories().await?;
        Ok(match_theme(&categories, theme, locale))
    }
}

/// Case-insensitive keyword matching: a category matches when the theme
/// contains one of its keywords or a keyword contains the theme. Only
/// categories in the requested locale are considered.
pub fn match_theme(categories: &[Category], theme: &str, locale: Locale) -> Option<Category> {
    let needle = theme.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    categories
        .iter()
        .filter(|c| c.locale == locale && c.is_active)
        .find(|c| {
            c.keywords.iter().any(|k| {
                let k = k.to_lowercase();
                !k.is_empty() && (needle.contains(&k) || k.contains(&needle))
            })
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::tests::{category, setup_adapter};

    fn sample() -> Vec<Category> {
        vec![
            category("tech-en", Locale::En, &["technology", "programming", "ai"]),
            category("sports-en", Locale::En, &["sports", "football"]),
            category("tech-ja", Locale::Ja, &["テクノロジー", "技術"]),
        ]
    }

    #[test]
    fn matches_keyword_inside_theme() {
        let hit = match_theme(&sample(), "AI and machine learning", Locale::En).unwrap();
        assert_eq!(hit.id, "tech-en");
    }

    #[test]
    fn matches_theme_inside_keyword() {
        // "tech" is a substring of the "technology" keyword.
        let hit = match_theme(&sample(), "Tech", Locale::En).unwrap();
        assert_eq!(hit.id, "tech-en");
    }

    #[test]
    fn respects_locale() {
        assert!(match_theme(&sample(), "技術", Locale::Ja).is_some());
        assert!(match_theme(&sample(), "技術", Locale::En).is_none());
    }

    #[test]
    fn ignores_inactive_and_blank() {
        let mut categories = sample();
        categories[0].is_active = false;
        assert!(match_theme(&categories, "technology", Locale::En).is_none());
        assert!(match_theme(&categories, "   ", Locale::En).is_none());
    }

    #[tokio::test]
    async fn cache_serves_and_matches_from_database() {
        let db = std::sync::Arc::new(setup_adapter().await);
        db.create_category(&category("tech", Locale::En, &["technology"]))
            .await
            .unwrap();

        let cache = CategoryCache::new(db.clone());
        let hit = cache.match_theme("technology news", Locale::En).await.unwrap();
        assert_eq!(hit.unwrap().id, "tech");

        // Within the TTL, new rows are not visible until a forced refresh.
        db.create_category(&category("sports", Locale::En, &["sports"]))
            .await
            .unwrap();
        assert!(cache
            .match_theme("sports", Locale::En)
            .await
            .unwrap()
            .is_none());
        cache.refresh().await.unwrap();
        assert!(cache
            .match_theme("sports", Locale::En)
            .await
            .unwrap()
            .is_some());
    }
}
