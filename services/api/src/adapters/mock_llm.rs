//! services/api/src/adapters/mock_llm.rs
//!
//! A deterministic stand-in for all AI ports, used when `MOCK_AI` is set or
//! no API key is configured, and by the test suite. Outputs depend only on
//! the inputs, never on the network.

use async_trait::async_trait;
use myrsspress_core::domain::{Article, FeedSuggestion, Locale};
use myrsspress_core::ports::{
    ArticleCurationService, EditorialService, FeedSuggestionService, PortResult,
};

/// Deterministic AI adapter.
#[derive(Clone, Default)]
pub struct MockAi;

impl MockAi {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FeedSuggestionService for MockAi {
    async fn suggest_feeds(&self, _theme: &str, locale: Locale) -> PortResult<Vec<FeedSuggestion>> {
        let feeds = match locale {
            Locale::En => vec![
                FeedSuggestion {
                    url: "https://feeds.bbci.co.uk/news/rss.xml".to_string(),
                    title: "BBC News".to_string(),
                },
                FeedSuggestion {
                    url: "https://www.theguardian.com/world/rss".to_string(),
                    title: "The Guardian — World".to_string(),
                },
            ],
            Locale::Ja => vec![
                FeedSuggestion {
                    url: "https://www3.nhk.or.jp/rss/news/cat0.xml".to_string(),
                    title: "NHKニュース".to_string(),
                },
                FeedSuggestion {
                    url: "https://news.yahoo.co.jp/rss/topics/top-picks.xml".to_string(),
                    title: "Yahoo!ニュース".to_string(),
                },
            ],
        };
        Ok(feeds)
    }

    async fn suggest_name(&self, theme: &str, locale: Locale) -> PortResult<String> {
        Ok(match locale {
            Locale::En => format!("The {} Times", theme),
            Locale::Ja => format!("{}新聞", theme),
        })
    }
}

#[async_trait]
impl ArticleCurationService for MockAi {
    /// Scores purely by recency: newer articles score higher.
    async fn score_articles(
        &self,
        _theme: &str,
        _locale: Locale,
        articles: &[Article],
    ) -> PortResult<Vec<u8>> {
        let mut order: Vec<usize> = (0..articles.len()).collect();
        order.sort_by(|&a, &b| articles[b].published_at.cmp(&articles[a].published_at));

        let mut scores = vec![0u8; articles.len()];
        for (rank, idx) in order.into_iter().enumerate() {
            scores[idx] = 95u8.saturating_sub((rank as u8).saturating_mul(3)).max(10);
        }
        Ok(scores)
    }

    /// Classifies the batch as Japanese when a third of headline characters
    /// are non-ASCII, English otherwise.
    async fn detect_locale(&self, articles: &[Article]) -> PortResult<Locale> {
        let (total, non_ascii) = articles
            .iter()
            .flat_map(|a| a.title.chars())
            .fold((0usize, 0usize), |(t, n), c| {
                (t + 1, n + usize::from(!c.is_ascii()))
            });
        if total > 0 && non_ascii * 3 >= total {
            Ok(Locale::Ja)
        } else {
            Ok(Locale::En)
        }
    }
}

#[async_trait]
impl EditorialService for MockAi {
    async fn generate_summary(&self, articles: &[Article], locale: Locale) -> PortResult<String> {
        let lead = articles.first().map(|a| a.title.as_str()).unwrap_or("");
        let base = match locale {
            Locale::En => format!(
                "Today's edition brings together the most important stories from your \
                 selected feeds, leading with: {}.",
                lead
            ),
            Locale::Ja => format!(
                "本日の紙面は、選択されたフィードから特に重要なニュースをまとめてお届けします。\
                 トップ記事は「{}」です。続報にもご注目ください。",
                lead
            ),
        };
        // Shape into the 100-200 character contract.
        let mut summary: String = base.chars().take(200).collect();
        while summary.chars().count() < 100 {
            summary.push('…');
        }
        Ok(summary)
    }

    async fn generate_editorial(
        &self,
        theme: &str,
        articles: &[Article],
        locale: Locale,
    ) -> PortResult<String> {
        Ok(match locale {
            Locale::En => format!(
                "This edition gathers {} stories on \"{}\". Taken together they sketch where \
                 the conversation is heading, and which voices are shaping it.\n\nAs always, \
                 the value of a personal newspaper is in the juxtaposition: read the small \
                 stories next to the big ones.",
                articles.len(),
                theme
            ),
            Locale::Ja => format!(
                "本日の紙面には「{}」に関する{}本の記事を掲載しました。並べて読むことで、\
                 いま議論がどこへ向かっているのかが見えてきます。\n\n小さなニュースを大きな\
                 ニュースと並べて読めるのが、自分だけの新聞の良さです。",
                theme,
                articles.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article(title: &str, age_hours: i64) -> Article {
        Article {
            title: title.to_string(),
            description: None,
            link: format!("https://example.com/{}", title),
            published_at: Some(Utc::now() - Duration::hours(age_hours)),
            image_url: None,
            source_url: "https://example.com/feed.xml".to_string(),
            source_title: "Example".to_string(),
            importance: None,
        }
    }

    #[tokio::test]
    async fn scores_follow_recency() {
        let articles = vec![article("old", 48), article("new", 1), article("mid", 12)];
        let scores = MockAi::new()
            .score_articles("tech", Locale::En, &articles)
            .await
            .unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[1] > scores[2] && scores[2] > scores[0]);
    }

    #[tokio::test]
    async fn detects_japanese_headlines() {
        let ja = vec![article("経済ニュースまとめ", 1), article("新製品発表", 2)];
        let en = vec![article("Market roundup", 1)];
        let ai = MockAi::new();
        assert_eq!(ai.detect_locale(&ja).await.unwrap(), Locale::Ja);
        assert_eq!(ai.detect_locale(&en).await.unwrap(), Locale::En);
    }

    #[tokio::test]
    async fn mock_summary_fits_contract() {
        let ai = MockAi::new();
        for locale in [Locale::En, Locale::Ja] {
            let summary = ai
                .generate_summary(&[article("A headline", 1)], locale)
                .await
                .unwrap();
            let chars = summary.chars().count();
            assert!((100..=200).contains(&chars), "len {}", chars);
            assert!(summary.lines().count() <= 3);
        }
    }
}
