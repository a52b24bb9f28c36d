//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the core crate. It
//! handles all interactions with the SQLite database using `sqlx`.
//!
//! Article lists and feed-url lists are stored as JSON snapshot columns.
//! Historical editions share the newspapers table, keyed by (id, edition)
//! where the base record carries an empty edition string.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use myrsspress_core::domain::{Article, Category, CuratedFeed, FeedUsage, Locale, Newspaper};
use myrsspress_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter` from an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the database URL from configuration.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn edition_key(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NewspaperRecord {
    id: String,
    edition: String,
    name: String,
    owner_name: String,
    theme: String,
    locale: String,
    feed_urls: String,
    articles: Option<String>,
    view_count: i64,
    is_public: bool,
    summary: Option<String>,
    editorial: Option<String>,
    created_at: DateTime<Utc>,
}

impl NewspaperRecord {
    fn to_domain(self) -> PortResult<Newspaper> {
        let locale = Locale::parse(&self.locale)
            .ok_or_else(|| unexpected(format!("bad locale in row: {}", self.locale)))?;
        let feed_urls: Vec<String> = serde_json::from_str(&self.feed_urls).map_err(unexpected)?;
        let articles: Option<Vec<Article>> = match self.articles {
            Some(json) => Some(serde_json::from_str(&json).map_err(unexpected)?),
            None => None,
        };
        let edition_date = if self.edition.is_empty() {
            None
        } else {
            Some(
                self.edition
                    .parse::<NaiveDate>()
                    .map_err(|e| unexpected(format!("bad edition date in row: {}", e)))?,
            )
        };
        Ok(Newspaper {
            id: self.id,
            name: self.name,
            owner_name: self.owner_name,
            theme: self.theme,
            feed_urls,
            articles,
            locale,
            view_count: self.view_count,
            is_public: self.is_public,
            summary: self.summary,
            editorial: self.editorial,
            edition_date,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: String,
    name: String,
    locale: String,
    keywords: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRecord {
    fn to_domain(self) -> PortResult<Category> {
        let locale = Locale::parse(&self.locale)
            .ok_or_else(|| unexpected(format!("bad locale in row: {}", self.locale)))?;
        let keywords: Vec<String> = serde_json::from_str(&self.keywords).map_err(unexpected)?;
        Ok(Category {
            id: self.id,
            name: self.name,
            locale,
            keywords,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct FeedRecord {
    id: String,
    category_id: String,
    url: String,
    title: String,
    priority: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeedRecord {
    fn to_domain(self) -> CuratedFeed {
        CuratedFeed {
            id: self.id,
            category_id: self.category_id,
            url: self.url,
            title: self.title,
            priority: self.priority as i32,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UsageRecord {
    feed_url: String,
    category_id: String,
    use_count: i64,
    success_count: i64,
    article_total: i64,
    last_used_at: DateTime<Utc>,
}

impl UsageRecord {
    fn to_domain(self) -> FeedUsage {
        FeedUsage {
            feed_url: self.feed_url,
            category_id: self.category_id,
            use_count: self.use_count,
            success_count: self.success_count,
            article_total: self.article_total,
            last_used_at: self.last_used_at,
        }
    }
}

const NEWSPAPER_COLUMNS: &str = "id, edition, name, owner_name, theme, locale, feed_urls, \
     articles, view_count, is_public, summary, editorial, created_at";
const CATEGORY_COLUMNS: &str = "id, name, locale, keywords, is_active, created_at, updated_at";
const FEED_COLUMNS: &str =
    "id, category_id, url, title, priority, is_active, created_at, updated_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn save_newspaper(&self, newspaper: &Newspaper) -> PortResult<()> {
        let feed_urls = serde_json::to_string(&newspaper.feed_urls).map_err(unexpected)?;
        let articles = match &newspaper.articles {
            Some(list) => Some(serde_json::to_string(list).map_err(unexpected)?),
            None => None,
        };
        sqlx::query(
            "INSERT OR REPLACE INTO newspapers \
             (id, edition, name, owner_name, theme, locale, feed_urls, articles, \
              view_count, is_public, summary, editorial, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&newspaper.id)
        .bind(edition_key(newspaper.edition_date))
        .bind(&newspaper.name)
        .bind(&newspaper.owner_name)
        .bind(&newspaper.theme)
        .bind(newspaper.locale.as_str())
        .bind(feed_urls)
        .bind(articles)
        .bind(newspaper.view_count)
        .bind(newspaper.is_public)
        .bind(&newspaper.summary)
        .bind(&newspaper.editorial)
        .bind(newspaper.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_newspaper(&self, id: &str) -> PortResult<Newspaper> {
        let sql = format!(
            "SELECT {NEWSPAPER_COLUMNS} FROM newspapers WHERE id = ? AND edition = ''"
        );
        let record = sqlx::query_as::<_, NewspaperRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Newspaper {} not found", id)))?;
        record.to_domain()
    }

    async fn get_edition(&self, id: &str, date: NaiveDate) -> PortResult<Option<Newspaper>> {
        let sql =
            format!("SELECT {NEWSPAPER_COLUMNS} FROM newspapers WHERE id = ? AND edition = ?");
        let record = sqlx::query_as::<_, NewspaperRecord>(&sql)
            .bind(id)
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        record.map(NewspaperRecord::to_domain).transpose()
    }

    async fn increment_view_count(&self, id: &str) -> PortResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE newspapers SET view_count = view_count + 1 \
             WHERE id = ? AND edition = '' RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        count.ok_or_else(|| PortError::NotFound(format!("Newspaper {} not found", id)))
    }

    async fn list_public_newspapers(
        &self,
        locale: Option<Locale>,
        limit: i64,
    ) -> PortResult<Vec<Newspaper>> {
        let records = match locale {
            Some(locale) => {
                let sql = format!(
                    "SELECT {NEWSPAPER_COLUMNS} FROM newspapers \
                     WHERE is_public = 1 AND edition = '' AND locale = ? \
                     ORDER BY view_count DESC LIMIT ?"
                );
                sqlx::query_as::<_, NewspaperRecord>(&sql)
                    .bind(locale.as_str())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {NEWSPAPER_COLUMNS} FROM newspapers \
                     WHERE is_public = 1 AND edition = '' \
                     ORDER BY view_count DESC LIMIT ?"
                );
                sqlx::query_as::<_, NewspaperRecord>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(unexpected)?;
        records.into_iter().map(NewspaperRecord::to_domain).collect()
    }

    async fn list_editions_older_than(
        &self,
        cutoff: NaiveDate,
        limit: i64,
    ) -> PortResult<Vec<(String, NaiveDate)>> {
        // ISO dates compare correctly as strings.
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, edition FROM newspapers \
             WHERE edition <> '' AND edition < ? ORDER BY edition LIMIT ?",
        )
        .bind(cutoff.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        rows.into_iter()
            .map(|(id, edition)| {
                edition
                    .parse::<NaiveDate>()
                    .map(|date| (id, date))
                    .map_err(unexpected)
            })
            .collect()
    }

    async fn delete_editions(&self, keys: &[(String, NaiveDate)]) -> PortResult<u64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let mut deleted = 0u64;
        for (id, date) in keys {
            let result = sqlx::query("DELETE FROM newspapers WHERE id = ? AND edition = ?")
                .bind(id)
                .bind(date.to_string())
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            deleted += result.rows_affected();
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(deleted)
    }

    async fn create_category(&self, category: &Category) -> PortResult<()> {
        let keywords = serde_json::to_string(&category.keywords).map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO categories (id, name, locale, keywords, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.locale.as_str())
        .bind(keywords)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_category(&self, id: &str) -> PortResult<Category> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?");
        let record = sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Category {} not found", id)))?;
        record.to_domain()
    }

    async fn list_categories(
        &self,
        locale: Option<Locale>,
        include_inactive: bool,
    ) -> PortResult<Vec<Category>> {
        let mut sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE 1 = 1");
        if locale.is_some() {
            sql.push_str(" AND locale = ?");
        }
        if !include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY name");

        let mut query = sqlx::query_as::<_, CategoryRecord>(&sql);
        if let Some(locale) = locale {
            query = query.bind(locale.as_str());
        }
        let records = query.fetch_all(&self.pool).await.map_err(unexpected)?;
        records.into_iter().map(CategoryRecord::to_domain).collect()
    }

    async fn update_category(&self, category: &Category) -> PortResult<()> {
        let keywords = serde_json::to_string(&category.keywords).map_err(unexpected)?;
        let result = sqlx::query(
            "UPDATE categories SET name = ?, locale = ?, keywords = ?, is_active = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&category.name)
        .bind(category.locale.as_str())
        .bind(keywords)
        .bind(category.is_active)
        .bind(Utc::now())
        .bind(&category.id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Category {} not found",
                category.id
            )));
        }
        Ok(())
    }

    async fn deactivate_category(&self, id: &str) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE categories SET is_active = 0, updated_at = ? WHERE id = ?")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    async fn create_feed(&self, feed: &CuratedFeed) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO feeds (id, category_id, url, title, priority, is_active, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&feed.id)
        .bind(&feed.category_id)
        .bind(&feed.url)
        .bind(&feed.title)
        .bind(feed.priority as i64)
        .bind(feed.is_active)
        .bind(feed.created_at)
        .bind(feed.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_feed(&self, id: &str) -> PortResult<CuratedFeed> {
        let sql = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?");
        let record = sqlx::query_as::<_, FeedRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Feed {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn list_feeds(
        &self,
        category_id: Option<&str>,
        include_inactive: bool,
    ) -> PortResult<Vec<CuratedFeed>> {
        let mut sql = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE 1 = 1");
        if category_id.is_some() {
            sql.push_str(" AND category_id = ?");
        }
        if !include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY priority, created_at");

        let mut query = sqlx::query_as::<_, FeedRecord>(&sql);
        if let Some(category_id) = category_id {
            query = query.bind(category_id);
        }
        let records = query.fetch_all(&self.pool).await.map_err(unexpected)?;
        Ok(records.into_iter().map(FeedRecord::to_domain).collect())
    }

    async fn list_feeds_for_locale(
        &self,
        locale: Locale,
        limit: i64,
    ) -> PortResult<Vec<CuratedFeed>> {
        let sql = format!(
            "SELECT f.id, f.category_id, f.url, f.title, f.priority, f.is_active, \
             f.created_at, f.updated_at \
             FROM feeds f JOIN categories c ON f.category_id = c.id \
             WHERE c.locale = ? AND f.is_active = 1 AND c.is_active = 1 \
             ORDER BY f.priority, f.created_at LIMIT ?"
        );
        let records = sqlx::query_as::<_, FeedRecord>(&sql)
            .bind(locale.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(FeedRecord::to_domain).collect())
    }

    async fn update_feed(&self, feed: &CuratedFeed) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE feeds SET category_id = ?, url = ?, title = ?, priority = ?, \
             is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&feed.category_id)
        .bind(&feed.url)
        .bind(&feed.title)
        .bind(feed.priority as i64)
        .bind(feed.is_active)
        .bind(Utc::now())
        .bind(&feed.id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Feed {} not found", feed.id)));
        }
        Ok(())
    }

    async fn deactivate_feed(&self, id: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE feeds SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Feed {} not found", id)));
        }
        Ok(())
    }

    async fn feed_exists(&self, category_id: &str, url: &str) -> PortResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM feeds WHERE category_id = ? AND url = ?")
                .bind(category_id)
                .bind(url)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count > 0)
    }

    async fn record_feed_use(
        &self,
        feed_url: &str,
        category_id: &str,
        success: bool,
        article_count: i64,
    ) -> PortResult<FeedUsage> {
        let record = sqlx::query_as::<_, UsageRecord>(
            "INSERT INTO feed_usage \
             (feed_url, category_id, use_count, success_count, article_total, last_used_at) \
             VALUES (?, ?, 1, ?, ?, ?) \
             ON CONFLICT(feed_url, category_id) DO UPDATE SET \
               use_count = use_count + 1, \
               success_count = success_count + excluded.success_count, \
               article_total = article_total + excluded.article_total, \
               last_used_at = excluded.last_used_at \
             RETURNING feed_url, category_id, use_count, success_count, article_total, \
               last_used_at",
        )
        .bind(feed_url)
        .bind(category_id)
        .bind(i64::from(success))
        .bind(article_count)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_feed_usage(
        &self,
        feed_url: &str,
        category_id: &str,
    ) -> PortResult<Option<FeedUsage>> {
        let record = sqlx::query_as::<_, UsageRecord>(
            "SELECT feed_url, category_id, use_count, success_count, article_total, \
             last_used_at FROM feed_usage WHERE feed_url = ? AND category_id = ?",
        )
        .bind(feed_url)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UsageRecord::to_domain))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) async fn setup_adapter() -> DbAdapter {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let adapter = DbAdapter::new(pool);
        adapter.run_migrations().await.unwrap();
        adapter
    }

    pub(crate) fn newspaper(id: &str, edition_date: Option<NaiveDate>) -> Newspaper {
        Newspaper {
            id: id.to_string(),
            name: "The Rust Times".to_string(),
            owner_name: "alice".to_string(),
            theme: "rust".to_string(),
            feed_urls: vec!["https://example.com/feed.xml".to_string()],
            articles: Some(vec![Article {
                title: "Borrow checker news".to_string(),
                description: Some("desc".to_string()),
                link: "https://example.com/1".to_string(),
                published_at: Some(Utc::now()),
                image_url: None,
                source_url: "https://example.com/feed.xml".to_string(),
                source_title: "Example".to_string(),
                importance: Some(80),
            }]),
            locale: Locale::En,
            view_count: 0,
            is_public: false,
            summary: None,
            editorial: None,
            edition_date,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn category(id: &str, locale: Locale, keywords: &[&str]) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            locale,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn feed(id: &str, category_id: &str, url: &str, priority: i32) -> CuratedFeed {
        CuratedFeed {
            id: id.to_string(),
            category_id: category_id.to_string(),
            url: url.to_string(),
            title: id.to_string(),
            priority,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn newspaper_round_trip() {
        let db = setup_adapter().await;
        db.save_newspaper(&newspaper("n1", None)).await.unwrap();

        let loaded = db.get_newspaper("n1").await.unwrap();
        assert_eq!(loaded.name, "The Rust Times");
        assert_eq!(loaded.articles.as_ref().unwrap().len(), 1);
        assert_eq!(loaded.articles.unwrap()[0].importance, Some(80));
        assert!(loaded.edition_date.is_none());

        assert!(matches!(
            db.get_newspaper("missing").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn editions_are_keyed_separately() {
        let db = setup_adapter().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        db.save_newspaper(&newspaper("n1", None)).await.unwrap();
        db.save_newspaper(&newspaper("n1", Some(date))).await.unwrap();

        let edition = db.get_edition("n1", date).await.unwrap().unwrap();
        assert_eq!(edition.edition_date, Some(date));

        let other = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        assert!(db.get_edition("n1", other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn view_count_increments() {
        let db = setup_adapter().await;
        db.save_newspaper(&newspaper("n1", None)).await.unwrap();
        assert_eq!(db.increment_view_count("n1").await.unwrap(), 1);
        assert_eq!(db.increment_view_count("n1").await.unwrap(), 2);
        assert!(matches!(
            db.increment_view_count("missing").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn public_listing_orders_by_views() {
        let db = setup_adapter().await;
        let mut a = newspaper("a", None);
        a.is_public = true;
        a.view_count = 5;
        let mut b = newspaper("b", None);
        b.is_public = true;
        b.view_count = 9;
        let private = newspaper("c", None);
        for n in [&a, &b, &private] {
            db.save_newspaper(n).await.unwrap();
        }

        let listed = db.list_public_newspapers(None, 10).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let ja = db.list_public_newspapers(Some(Locale::Ja), 10).await.unwrap();
        assert!(ja.is_empty());
    }

    #[tokio::test]
    async fn category_soft_delete_filters_listing() {
        let db = setup_adapter().await;
        db.create_category(&category("tech", Locale::En, &["tech"]))
            .await
            .unwrap();
        db.create_category(&category("sports", Locale::En, &["sports"]))
            .await
            .unwrap();
        db.deactivate_category("sports").await.unwrap();

        let active = db.list_categories(Some(Locale::En), false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "tech");

        let all = db.list_categories(Some(Locale::En), true).await.unwrap();
        assert_eq!(all.len(), 2);

        // The row survives soft delete.
        let sports = db.get_category("sports").await.unwrap();
        assert!(!sports.is_active);
    }

    #[tokio::test]
    async fn feeds_order_by_priority_and_join_locale() {
        let db = setup_adapter().await;
        db.create_category(&category("tech", Locale::En, &["tech"]))
            .await
            .unwrap();
        db.create_feed(&feed("f2", "tech", "https://b.example/feed", 2))
            .await
            .unwrap();
        db.create_feed(&feed("f1", "tech", "https://a.example/feed", 1))
            .await
            .unwrap();

        let listed = db.list_feeds(Some("tech"), false).await.unwrap();
        assert_eq!(listed[0].id, "f1");

        let defaults = db.list_feeds_for_locale(Locale::En, 5).await.unwrap();
        assert_eq!(defaults.len(), 2);
        assert!(db.list_feeds_for_locale(Locale::Ja, 5).await.unwrap().is_empty());

        assert!(db.feed_exists("tech", "https://a.example/feed").await.unwrap());
        assert!(!db.feed_exists("tech", "https://c.example/feed").await.unwrap());
    }

    #[tokio::test]
    async fn feed_usage_aggregates() {
        let db = setup_adapter().await;
        let url = "https://a.example/feed";
        let first = db.record_feed_use(url, "tech", true, 7).await.unwrap();
        assert_eq!(first.use_count, 1);

        let second = db.record_feed_use(url, "tech", false, 0).await.unwrap();
        assert_eq!(second.use_count, 2);
        assert_eq!(second.success_count, 1);
        assert_eq!(second.article_total, 7);
        assert!(!second.qualifies_for_promotion());

        assert!(db.get_feed_usage(url, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn old_editions_are_listed_and_deleted() {
        let db = setup_adapter().await;
        let old = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let recent = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        db.save_newspaper(&newspaper("n1", Some(old))).await.unwrap();
        db.save_newspaper(&newspaper("n1", Some(recent))).await.unwrap();

        let cutoff = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let keys = db.list_editions_older_than(cutoff, 100).await.unwrap();
        assert_eq!(keys, vec![("n1".to_string(), old)]);

        assert_eq!(db.delete_editions(&keys).await.unwrap(), 1);
        assert!(db
            .list_editions_older_than(cutoff, 100)
            .await
            .unwrap()
            .is_empty());
        // Deleting the same keys again is a no-op.
        assert_eq!(db.delete_editions(&keys).await.unwrap(), 0);
    }
}
