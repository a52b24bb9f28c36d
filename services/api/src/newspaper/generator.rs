//! services/api/src/newspaper/generator.rs
//!
//! The newspaper generation pipeline: fetch articles from the requested
//! feeds, balance them across sources, let the AI score and trim them, add
//! editorial content, and persist the result.
//!
//! AI failures degrade gracefully (unscored articles, no summary); fetching
//! nothing at all is the one hard error.

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use myrsspress_core::domain::{Article, FetchedFeed, Locale, Newspaper};
use myrsspress_core::ports::{
    ArticleCurationService, DatabaseService, EditorialService, FeedFetchService, PortError,
    PortResult,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::category::promotion;
use crate::newspaper::balance::{balance_articles, BALANCE_TARGET};
use crate::newspaper::dates;

/// Final article count bounds for a generated newspaper.
pub const MIN_ARTICLES: usize = 8;
pub const MAX_ARTICLES: usize = 15;

/// Articles scoring below this are dropped, subject to the MIN_ARTICLES
/// floor.
pub const SCORE_THRESHOLD: u8 = 40;

/// How many default feeds back-fill a thin edition.
const DEFAULT_FEED_COUNT: i64 = 5;

/// Errors surfaced by the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no articles could be fetched from the requested feeds")]
    NoArticles,
    #[error("edition date {0} is outside the allowed window")]
    DateOutOfRange(NaiveDate),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// A request to generate and persist a new newspaper.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub name: Option<String>,
    pub owner_name: String,
    pub theme: String,
    pub feed_urls: Vec<String>,
    pub locale: Locale,
    pub is_public: bool,
    /// When the theme resolved to a category, usage statistics are recorded
    /// against it.
    pub category_id: Option<String>,
}

/// Orchestrates the generation pipeline over the injected ports.
#[derive(Clone)]
pub struct NewspaperGenerator {
    db: Arc<dyn DatabaseService>,
    fetcher: Arc<dyn FeedFetchService>,
    curation: Arc<dyn ArticleCurationService>,
    editorial: Arc<dyn EditorialService>,
}

impl NewspaperGenerator {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        fetcher: Arc<dyn FeedFetchService>,
        curation: Arc<dyn ArticleCurationService>,
        editorial: Arc<dyn EditorialService>,
    ) -> Self {
        Self {
            db,
            fetcher,
            curation,
            editorial,
        }
    }

    /// Generates a fresh newspaper and persists it as the base record.
    pub async fn generate(&self, request: GenerateRequest) -> Result<Newspaper, GenerateError> {
        let fetches = self.fetch_all(&request.feed_urls).await;
        if let Some(category_id) = &request.category_id {
            self.record_usage(category_id, &fetches).await;
        }

        let per_feed: Vec<Vec<Article>> = fetches
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .map(|feed| feed.articles)
            .collect();

        let balanced = balance_articles(per_feed, BALANCE_TARGET);
        if balanced.is_empty() {
            return Err(GenerateError::NoArticles);
        }

        let articles = self
            .score_and_select(&request.theme, request.locale, balanced)
            .await;

        let summary = match self.editorial.generate_summary(&articles, request.locale).await {
            Ok(text) if valid_summary(&text) => Some(text),
            Ok(text) => {
                warn!(chars = text.chars().count(), "discarding out-of-contract summary");
                None
            }
            Err(e) => {
                warn!("summary generation degraded: {}", e);
                None
            }
        };
        let editorial = match self
            .editorial
            .generate_editorial(&request.theme, &articles, request.locale)
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("editorial generation degraded: {}", e);
                None
            }
        };
        let locale = match self.curation.detect_locale(&articles).await {
            Ok(locale) => locale,
            Err(e) => {
                warn!("language detection degraded: {}", e);
                request.locale
            }
        };

        let name = request.name.unwrap_or_else(|| match locale {
            Locale::En => format!("The {} Times", request.theme),
            Locale::Ja => format!("{}新聞", request.theme),
        });

        let newspaper = Newspaper {
            id: Uuid::new_v4().to_string(),
            name,
            owner_name: request.owner_name,
            theme: request.theme,
            feed_urls: request.feed_urls,
            articles: Some(articles),
            locale,
            view_count: 0,
            is_public: request.is_public,
            summary,
            editorial,
            edition_date: None,
            created_at: Utc::now(),
        };
        self.db.save_newspaper(&newspaper).await?;
        info!(id = %newspaper.id, "generated newspaper");
        Ok(newspaper)
    }

    /// Generates (or returns the cached) historical edition of a newspaper
    /// for a target date.
    pub async fn generate_edition(
        &self,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Newspaper, GenerateError> {
        if !dates::edition_date_in_window(date, today) {
            return Err(GenerateError::DateOutOfRange(date));
        }

        // Idempotent caching: one edition per (id, date).
        if let Some(cached) = self.db.get_edition(id, date).await? {
            return Ok(cached);
        }

        let base = self.db.get_newspaper(id).await?;
        let fetches = self.fetch_all(&base.feed_urls).await;
        let mut pool: Vec<Article> = fetches
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .flat_map(|feed| feed.articles)
            .collect();

        // Fill out thin editions from the locale's default feeds.
        match self.default_feed_articles(base.locale).await {
            Ok(extra) => pool.extend(extra),
            Err(e) => warn!("default feed fetch degraded: {}", e),
        }

        // First pass: only the target day. If that is too thin, widen to the
        // seven days leading up to it.
        let mut candidates: Vec<Article> = pool
            .iter()
            .filter(|a| a.published_at.is_some_and(|ts| dates::on_day(ts, date)))
            .cloned()
            .collect();
        if candidates.len() < MIN_ARTICLES {
            candidates = pool
                .into_iter()
                .filter(|a| {
                    a.published_at
                        .is_some_and(|ts| dates::in_widened_window(ts, date))
                })
                .collect();
        }
        if candidates.is_empty() {
            return Err(GenerateError::NoArticles);
        }

        let per_feed = group_by_feed(candidates);
        let balanced = balance_articles(per_feed, BALANCE_TARGET);
        let articles = self
            .score_and_select(&base.theme, base.locale, balanced)
            .await;
        let locale = match self.curation.detect_locale(&articles).await {
            Ok(locale) => locale,
            Err(e) => {
                warn!("language detection degraded: {}", e);
                base.locale
            }
        };

        let edition = Newspaper {
            id: base.id,
            name: base.name,
            owner_name: base.owner_name,
            theme: base.theme,
            feed_urls: base.feed_urls,
            articles: Some(articles),
            locale,
            view_count: 0,
            is_public: base.is_public,
            summary: None,
            editorial: None,
            edition_date: Some(date),
            created_at: Utc::now(),
        };
        self.db.save_newspaper(&edition).await?;
        info!(id = %edition.id, date = %date, "generated historical edition");
        Ok(edition)
    }

    /// Fetches every feed, isolating per-feed failures.
    async fn fetch_all(&self, urls: &[String]) -> Vec<(String, PortResult<FetchedFeed>)> {
        let futures = urls.iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let result = fetcher.fetch(url).await;
                if let Err(e) = &result {
                    warn!(url = %url, "feed skipped: {}", e);
                }
                (url.clone(), result)
            }
        });
        join_all(futures).await
    }

    async fn default_feed_articles(&self, locale: Locale) -> PortResult<Vec<Article>> {
        let feeds = self
            .db
            .list_feeds_for_locale(locale, DEFAULT_FEED_COUNT)
            .await?;
        let urls: Vec<String> = feeds.into_iter().map(|f| f.url).collect();
        let fetched = self.fetch_all(&urls).await;
        Ok(fetched
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .flat_map(|feed| feed.articles)
            .collect())
    }

    /// Scores the balanced candidates and keeps the best 8-15. Scoring
    /// failures degrade to the balanced (recency-interleaved) order.
    async fn score_and_select(
        &self,
        theme: &str,
        locale: Locale,
        balanced: Vec<Article>,
    ) -> Vec<Article> {
        let scores = match self.curation.score_articles(theme, locale, &balanced).await {
            Ok(scores) if scores.len() == balanced.len() => Some(scores),
            Ok(scores) => {
                warn!(
                    got = scores.len(),
                    want = balanced.len(),
                    "scorer returned wrong arity; keeping articles unscored"
                );
                None
            }
            Err(e) => {
                warn!("importance scoring degraded: {}", e);
                None
            }
        };
        select_articles(balanced, scores)
    }

    /// Records one use per requested feed and promotes feeds whose record
    /// has become good enough. Failures here never fail the request.
    async fn record_usage(&self, category_id: &str, fetches: &[(String, PortResult<FetchedFeed>)]) {
        for (url, result) in fetches {
            let (success, count, title) = match result {
                Ok(feed) => (true, feed.articles.len() as i64, feed.title.as_str()),
                Err(_) => (false, 0, ""),
            };
            match self.db.record_feed_use(url, category_id, success, count).await {
                Ok(usage) => {
                    if let Err(e) = promotion::maybe_promote(self.db.as_ref(), &usage, title).await
                    {
                        warn!(url = %url, "feed promotion failed: {}", e);
                    }
                }
                Err(e) => warn!(url = %url, "usage recording failed: {}", e),
            }
        }
    }
}

/// Applies scores and keeps the top 8-15 above the relevance threshold.
/// Without scores, falls back to the first MAX_ARTICLES candidates.
fn select_articles(mut articles: Vec<Article>, scores: Option<Vec<u8>>) -> Vec<Article> {
    match scores {
        Some(scores) => {
            for (article, score) in articles.iter_mut().zip(&scores) {
                article.importance = Some(*score);
            }
            articles.sort_by(|a, b| b.importance.cmp(&a.importance));
            let above = articles
                .iter()
                .filter(|a| a.importance.unwrap_or(0) >= SCORE_THRESHOLD)
                .count();
            // The floor wins over the threshold: better a thin section than
            // an empty page.
            let keep = above.clamp(MIN_ARTICLES, MAX_ARTICLES).min(articles.len());
            articles.truncate(keep);
        }
        None => articles.truncate(MAX_ARTICLES),
    }
    articles
}

/// A summary is publishable only between 100 and 200 characters on at most
/// three lines.
pub fn valid_summary(text: &str) -> bool {
    let chars = text.chars().count();
    (100..=200).contains(&chars) && text.lines().count() <= 3
}

fn group_by_feed(articles: Vec<Article>) -> Vec<Vec<Article>> {
    let mut groups: Vec<(String, Vec<Article>)> = Vec::new();
    for article in articles {
        match groups.iter_mut().find(|(url, _)| *url == article.source_url) {
            Some((_, list)) => list.push(article),
            None => groups.push((article.source_url.clone(), vec![article])),
        }
    }
    groups.into_iter().map(|(_, list)| list).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::tests::setup_adapter;
    use crate::adapters::MockAi;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFetcher {
        feeds: HashMap<String, FetchedFeed>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(feeds: Vec<FetchedFeed>) -> Self {
            Self {
                feeds: feeds.into_iter().map(|f| (f.url.clone(), f)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedFetchService for StubFetcher {
        async fn fetch(&self, url: &str) -> PortResult<FetchedFeed> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.feeds
                .get(url)
                .cloned()
                .ok_or_else(|| PortError::Unexpected(format!("unreachable feed: {}", url)))
        }
    }

    fn article(source: &str, i: usize, published_at: DateTime<Utc>) -> Article {
        Article {
            title: format!("{source} article {i}"),
            description: Some("body".to_string()),
            link: format!("https://{source}.example/{i}"),
            published_at: Some(published_at),
            image_url: None,
            source_url: format!("https://{source}.example/feed.xml"),
            source_title: source.to_string(),
            importance: None,
        }
    }

    fn feed_of(source: &str, count: usize) -> FetchedFeed {
        FetchedFeed {
            url: format!("https://{source}.example/feed.xml"),
            title: source.to_string(),
            articles: (0..count)
                .map(|i| article(source, i, Utc::now() - Duration::hours(i as i64)))
                .collect(),
        }
    }

    async fn generator_with(feeds: Vec<FetchedFeed>) -> (NewspaperGenerator, Arc<StubFetcher>) {
        let db = Arc::new(setup_adapter().await);
        let fetcher = Arc::new(StubFetcher::new(feeds));
        let ai = Arc::new(MockAi::new());
        let generator = NewspaperGenerator::new(db, fetcher.clone(), ai.clone(), ai);
        (generator, fetcher)
    }

    fn request(urls: Vec<String>) -> GenerateRequest {
        GenerateRequest {
            name: None,
            owner_name: "alice".to_string(),
            theme: "technology".to_string(),
            feed_urls: urls,
            locale: Locale::En,
            is_public: false,
            category_id: None,
        }
    }

    #[test]
    fn selection_respects_floor_and_cap() {
        let articles: Vec<Article> = (0..24)
            .map(|i| article("a", i, Utc::now() - Duration::hours(i as i64)))
            .collect();

        // Scores spread 0..=95: plenty above threshold, capped at 15.
        let scores: Vec<u8> = (0..24).map(|i| 95u8.saturating_sub(i * 4)).collect();
        let selected = select_articles(articles.clone(), Some(scores));
        assert_eq!(selected.len(), MAX_ARTICLES);
        assert!(selected.iter().all(|a| a.importance.is_some()));
        // Sorted best first.
        assert!(selected.windows(2).all(|w| w[0].importance >= w[1].importance));

        // Everything below threshold: the floor still keeps 8.
        let low: Vec<u8> = vec![5; 24];
        assert_eq!(select_articles(articles.clone(), Some(low)).len(), MIN_ARTICLES);

        // No scores at all: plain truncation.
        let unscored = select_articles(articles, None);
        assert_eq!(unscored.len(), MAX_ARTICLES);
        assert!(unscored.iter().all(|a| a.importance.is_none()));
    }

    #[test]
    fn summary_contract() {
        assert!(!valid_summary("too short"));
        assert!(valid_summary(&"x".repeat(150)));
        assert!(!valid_summary(&"x".repeat(99)));
        assert!(!valid_summary(&"x".repeat(201)));
        let four_lines = format!("{}\nb\nc\nd", "a".repeat(120));
        assert!(!valid_summary(&four_lines));
    }

    #[tokio::test]
    async fn generate_builds_and_persists_a_newspaper() {
        let (generator, _) = generator_with(vec![feed_of("big", 20), feed_of("small", 4)]).await;
        let urls = vec![
            "https://big.example/feed.xml".to_string(),
            "https://small.example/feed.xml".to_string(),
        ];
        let paper = generator.generate(request(urls)).await.unwrap();

        let count = paper.articles.as_ref().unwrap().len();
        assert!((MIN_ARTICLES..=MAX_ARTICLES).contains(&count));
        assert!(paper.summary.is_some());
        assert!(paper.editorial.is_some());
        assert_eq!(paper.name, "The technology Times");

        // Round-trips through the database.
        let loaded = generator.db.get_newspaper(&paper.id).await.unwrap();
        assert_eq!(loaded.articles.unwrap().len(), count);
    }

    #[tokio::test]
    async fn generate_fails_hard_when_nothing_fetches() {
        let (generator, _) = generator_with(vec![]).await;
        let result = generator
            .generate(request(vec!["https://down.example/feed.xml".to_string()]))
            .await;
        assert!(matches!(result, Err(GenerateError::NoArticles)));
    }

    #[tokio::test]
    async fn one_broken_feed_does_not_break_generation() {
        let (generator, _) = generator_with(vec![feed_of("up", 12)]).await;
        let urls = vec![
            "https://up.example/feed.xml".to_string(),
            "https://down.example/feed.xml".to_string(),
        ];
        let paper = generator.generate(request(urls)).await.unwrap();
        assert!(paper.articles.unwrap().len() >= MIN_ARTICLES);
    }

    #[tokio::test]
    async fn usage_is_recorded_and_good_feeds_promoted() {
        let (generator, _) = generator_with(vec![feed_of("up", 12)]).await;
        let db = Arc::clone(&generator.db);
        db.create_category(
            &crate::adapters::db::tests::category("tech", Locale::En, &["technology"]),
        )
        .await
        .unwrap();

        let mut req = request(vec![
            "https://up.example/feed.xml".to_string(),
            "https://down.example/feed.xml".to_string(),
        ]);
        req.category_id = Some("tech".to_string());
        generator.generate(req).await.unwrap();

        let good = db
            .get_feed_usage("https://up.example/feed.xml", "tech")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(good.use_count, 1);
        assert!(good.qualifies_for_promotion());
        assert!(db
            .feed_exists("tech", "https://up.example/feed.xml")
            .await
            .unwrap());

        let bad = db
            .get_feed_usage("https://down.example/feed.xml", "tech")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bad.success_count, 0);
        assert!(!db
            .feed_exists("tech", "https://down.example/feed.xml")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn edition_date_window_is_enforced() {
        let (generator, _) = generator_with(vec![]).await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let stale = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let result = generator.generate_edition("n1", stale, today).await;
        assert!(matches!(result, Err(GenerateError::DateOutOfRange(_))));
    }

    #[tokio::test]
    async fn edition_is_generated_once_and_then_cached() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();

        // Ten articles on the target day (Tokyo time).
        let target_noon = Utc.with_ymd_and_hms(2026, 8, 27, 3, 0, 0).unwrap();
        let feed = FetchedFeed {
            url: "https://up.example/feed.xml".to_string(),
            title: "up".to_string(),
            articles: (0..10)
                .map(|i| article("up", i, target_noon + Duration::minutes(i as i64)))
                .collect(),
        };

        let (generator, fetcher) = generator_with(vec![feed]).await;
        let mut base = crate::adapters::db::tests::newspaper("n1", None);
        base.feed_urls = vec!["https://up.example/feed.xml".to_string()];
        generator.db.save_newspaper(&base).await.unwrap();

        let first = generator.generate_edition("n1", target, today).await.unwrap();
        assert_eq!(first.edition_date, Some(target));
        assert!(first.articles.as_ref().unwrap().len() >= MIN_ARTICLES);
        let calls_after_first = fetcher.call_count();
        assert!(calls_after_first >= 1);

        // Second request hits the cache; the fetcher is not consulted again.
        let second = generator.generate_edition("n1", target, today).await.unwrap();
        assert_eq!(second.edition_date, Some(target));
        assert_eq!(fetcher.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn thin_target_day_widens_to_previous_week() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();

        // Three articles on the target day, nine spread over the prior week.
        let target_noon = Utc.with_ymd_and_hms(2026, 8, 27, 3, 0, 0).unwrap();
        let mut articles: Vec<Article> = (0..3)
            .map(|i| article("up", i, target_noon + Duration::minutes(i as i64)))
            .collect();
        articles.extend(
            (0..9).map(|i| article("up", 100 + i, target_noon - Duration::days(1 + i as i64 % 6))),
        );
        let feed = FetchedFeed {
            url: "https://up.example/feed.xml".to_string(),
            title: "up".to_string(),
            articles,
        };

        let (generator, _) = generator_with(vec![feed]).await;
        let mut base = crate::adapters::db::tests::newspaper("n1", None);
        base.feed_urls = vec!["https://up.example/feed.xml".to_string()];
        generator.db.save_newspaper(&base).await.unwrap();

        let edition = generator.generate_edition("n1", target, today).await.unwrap();
        assert!(edition.articles.unwrap().len() >= MIN_ARTICLES);
    }

    #[tokio::test]
    async fn edition_with_no_articles_is_a_hard_error() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();

        // Feed resolves but everything is months old.
        let ancient = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let feed = FetchedFeed {
            url: "https://up.example/feed.xml".to_string(),
            title: "up".to_string(),
            articles: (0..5).map(|i| article("up", i, ancient)).collect(),
        };

        let (generator, _) = generator_with(vec![feed]).await;
        let mut base = crate::adapters::db::tests::newspaper("n1", None);
        base.feed_urls = vec!["https://up.example/feed.xml".to_string()];
        generator.db.save_newspaper(&base).await.unwrap();

        let result = generator.generate_edition("n1", target, today).await;
        assert!(matches!(result, Err(GenerateError::NoArticles)));
    }
}
