//! services/api/src/cleanup.rs
//!
//! Retention sweep: historical editions older than the retention window
//! are deleted in small batches. Base newspapers are never touched.

use chrono::NaiveDate;
use myrsspress_core::ports::{DatabaseService, PortResult};
use tracing::info;

use crate::newspaper::dates;

/// Deletions happen in small batches to keep individual statements short.
pub const DELETE_BATCH_SIZE: i64 = 25;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub deleted: u64,
    pub batches: u32,
}

/// Deletes every edition strictly older than the retention cutoff for
/// `today`. Idempotent: a second run over the same data deletes nothing.
pub async fn sweep_expired_editions(
    db: &dyn DatabaseService,
    today: NaiveDate,
) -> PortResult<SweepStats> {
    let cutoff = dates::retention_cutoff(today);
    let mut stats = SweepStats::default();
    loop {
        let page = db.list_editions_older_than(cutoff, DELETE_BATCH_SIZE).await?;
        if page.is_empty() {
            break;
        }
        stats.deleted += db.delete_editions(&page).await?;
        stats.batches += 1;
    }
    if stats.deleted > 0 {
        info!(deleted = stats.deleted, cutoff = %cutoff, "swept expired editions");
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::tests::{newspaper, setup_adapter};
    use chrono::Duration;

    #[tokio::test]
    async fn old_editions_are_deleted_in_batches() {
        let db = setup_adapter().await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

        db.save_newspaper(&newspaper("n1", None)).await.unwrap();
        for i in 0..60 {
            let date = today - Duration::days(30 + i);
            db.save_newspaper(&newspaper("n1", Some(date))).await.unwrap();
        }

        let stats = sweep_expired_editions(&db, today).await.unwrap();
        assert_eq!(stats.deleted, 60);
        assert_eq!(stats.batches, 3);

        // Base record survives; rerun is a no-op.
        assert!(db.get_newspaper("n1").await.is_ok());
        let again = sweep_expired_editions(&db, today).await.unwrap();
        assert_eq!(again.deleted, 0);
    }

    #[tokio::test]
    async fn editions_at_the_cutoff_survive() {
        let db = setup_adapter().await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let cutoff = dates::retention_cutoff(today);

        db.save_newspaper(&newspaper("n1", None)).await.unwrap();
        db.save_newspaper(&newspaper("n1", Some(cutoff))).await.unwrap();
        db.save_newspaper(&newspaper("n1", Some(cutoff - Duration::days(1))))
            .await
            .unwrap();

        let stats = sweep_expired_editions(&db, today).await.unwrap();
        assert_eq!(stats.deleted, 1);
        assert!(db.get_edition("n1", cutoff).await.unwrap().is_some());
    }
}
