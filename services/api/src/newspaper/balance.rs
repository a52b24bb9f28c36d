//! services/api/src/newspaper/balance.rs
//!
//! Proportional rebalancing of article counts across source feeds.
//!
//! A prolific feed must not crowd out the others: articles are drawn
//! round-robin, newest first, so every feed with material contributes before
//! any feed contributes twice.

use myrsspress_core::domain::Article;

/// How many balanced candidates are handed to the scorer.
pub const BALANCE_TARGET: usize = 24;

/// Interleaves the per-feed article lists into one balanced candidate list of
/// at most `target` articles. Each feed's own articles are taken newest
/// first.
pub fn balance_articles(mut per_feed: Vec<Vec<Article>>, target: usize) -> Vec<Article> {
    for feed in &mut per_feed {
        feed.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }

    let mut balanced = Vec::with_capacity(target.min(per_feed.iter().map(Vec::len).sum()));
    let mut index = 0;
    while balanced.len() < target {
        let mut took_any = false;
        for feed in &per_feed {
            if let Some(article) = feed.get(index) {
                balanced.push(article.clone());
                took_any = true;
                if balanced.len() == target {
                    break;
                }
            }
        }
        if !took_any {
            break;
        }
        index += 1;
    }
    balanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn articles(source: &str, count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                title: format!("{source}-{i}"),
                description: None,
                link: format!("https://{source}.example/{i}"),
                published_at: Some(Utc::now() - Duration::hours(i as i64)),
                image_url: None,
                source_url: format!("https://{source}.example/feed.xml"),
                source_title: source.to_string(),
                importance: None,
            })
            .collect()
    }

    fn count_from(balanced: &[Article], source: &str) -> usize {
        balanced.iter().filter(|a| a.source_title == source).count()
    }

    #[test]
    fn no_feed_dominates_while_others_have_articles() {
        let balanced = balance_articles(
            vec![articles("big", 20), articles("small", 3), articles("tiny", 1)],
            9,
        );
        assert_eq!(balanced.len(), 9);
        assert_eq!(count_from(&balanced, "small"), 3);
        assert_eq!(count_from(&balanced, "tiny"), 1);
        // The big feed only fills what the others cannot.
        assert_eq!(count_from(&balanced, "big"), 5);
    }

    #[test]
    fn equal_feeds_split_evenly() {
        let balanced = balance_articles(vec![articles("a", 10), articles("b", 10)], 10);
        assert_eq!(count_from(&balanced, "a"), 5);
        assert_eq!(count_from(&balanced, "b"), 5);
    }

    #[test]
    fn stops_when_supply_runs_out() {
        let balanced = balance_articles(vec![articles("a", 2), articles("b", 1)], 24);
        assert_eq!(balanced.len(), 3);
    }

    #[test]
    fn newest_articles_are_taken_first() {
        let balanced = balance_articles(vec![articles("a", 5)], 2);
        assert_eq!(balanced[0].title, "a-0");
        assert_eq!(balanced[1].title, "a-1");
    }

    #[test]
    fn handles_empty_input() {
        assert!(balance_articles(vec![], 10).is_empty());
        assert!(balance_articles(vec![vec![], vec![]], 10).is_empty());
    }
}
