//! services/api/src/category/promotion.rs
//!
//! Automatic promotion of user-supplied feeds into the curated set once
//! their usage record proves them reliable.

use myrsspress_core::domain::{CuratedFeed, FeedUsage};
use myrsspress_core::ports::{DatabaseService, PortResult};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Promoted feeds rank below hand-curated ones.
pub const PROMOTED_PRIORITY: i32 = 100;

/// Promotes a feed into its category's curated set when its usage record
/// qualifies and it is not already curated. Returns whether a promotion
/// happened.
pub async fn maybe_promote(
    db: &dyn DatabaseService,
    usage: &FeedUsage,
    feed_title: &str,
) -> PortResult<bool> {
    if !usage.qualifies_for_promotion() {
        return Ok(false);
    }
    if db.feed_exists(&usage.category_id, &usage.feed_url).await? {
        return Ok(false);
    }
    let now = Utc::now();
    let feed = CuratedFeed {
        id: Uuid::new_v4().to_string(),
        category_id: usage.category_id.clone(),
        url: usage.feed_url.clone(),
        title: if feed_title.is_empty() {
            usage.feed_url.clone()
        } else {
            feed_title.to_string()
        },
        priority: PROMOTED_PRIORITY,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.create_feed(&feed).await?;
    info!(url = %usage.feed_url, category = %usage.category_id, "promoted feed");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::tests::{category, setup_adapter};
    use myrsspress_core::domain::Locale;

    #[tokio::test]
    async fn qualifying_feed_is_promoted_once() {
        let db = setup_adapter().await;
        db.create_category(&category("tech", Locale::En, &["technology"]))
            .await
            .unwrap();

        let usage = db
            .record_feed_use("https://good.example/feed.xml", "tech", true, 12)
            .await
            .unwrap();
        assert!(maybe_promote(&db, &usage, "Good Feed").await.unwrap());
        assert!(db
            .feed_exists("tech", "https://good.example/feed.xml")
            .await
            .unwrap());

        // Already curated, nothing to do.
        assert!(!maybe_promote(&db, &usage, "Good Feed").await.unwrap());
    }

    #[tokio::test]
    async fn unreliable_feed_is_not_promoted() {
        let db = setup_adapter().await;
        db.create_category(&category("tech", Locale::En, &["technology"]))
            .await
            .unwrap();

        // One success, one failure: success rate drops below 100%.
        db.record_feed_use("https://flaky.example/feed.xml", "tech", true, 5)
            .await
            .unwrap();
        let usage = db
            .record_feed_use("https://flaky.example/feed.xml", "tech", false, 0)
            .await
            .unwrap();
        assert!(!maybe_promote(&db, &usage, "Flaky").await.unwrap());

        // Succeeds but never yields articles.
        let empty = db
            .record_feed_use("https://empty.example/feed.xml", "tech", true, 0)
            .await
            .unwrap();
        assert!(!maybe_promote(&db, &empty, "Empty").await.unwrap());
    }
}
