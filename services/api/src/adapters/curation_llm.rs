//! services/api/src/adapters/curation_llm.rs
//!
//! This module contains the adapter for the article-curation LLM: importance
//! scoring and language detection. It implements the
//! `ArticleCurationService` port from the core crate.
//!
//! The response contract is the `scores` array form: one integer per input
//! article, in input order. Relevance filtering is a threshold over these
//! scores applied by the generation pipeline.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use myrsspress_core::domain::{Article, Locale};
use myrsspress_core::ports::{ArticleCurationService, PortError, PortResult};
use serde::Deserialize;

use crate::adapters::extract::parse_model_json;

const SCORE_SYSTEM: &str = "You are a newspaper editor scoring candidate articles for a \
themed newspaper. Score each article from 0 (irrelevant, stale, or clickbait) to 100 \
(essential front-page material) for relevance to the theme plus newsworthiness. Respond \
with ONLY a JSON object of the form {\"scores\": [n, n, ...]} containing exactly one \
integer per article, in the same order as the input.";

const LANGUAGE_SYSTEM: &str = "You detect the dominant language of a batch of article \
headlines. Respond with ONLY a JSON object of the form {\"language\": \"en\"} using a \
two-letter ISO 639-1 code.";

#[derive(Deserialize)]
struct ScoreResponse {
    scores: Vec<i64>,
}

#[derive(Deserialize)]
struct LanguageResponse {
    language: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ArticleCurationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCurationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCurationAdapter {
    /// Creates a new `OpenAiCurationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn chat(&self, system: &str, user: String, max_tokens: u32) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.1)
            .max_tokens(max_tokens)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("curation LLM returned no text content".to_string())
            })
    }
}

/// Renders the numbered article list shared by both prompts.
fn article_listing(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let desc = a
                .description
                .as_deref()
                .map(|d| d.chars().take(200).collect::<String>())
                .unwrap_or_default();
            format!("{}. {} — {}", i + 1, a.title, desc)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//=========================================================================================
// `ArticleCurationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArticleCurationService for OpenAiCurationAdapter {
    async fn score_articles(
        &self,
        theme: &str,
        locale: Locale,
        articles: &[Article],
    ) -> PortResult<Vec<u8>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let user = format!(
            "Theme: {theme}\nLocale: {locale}\nArticles ({count}):\n{listing}",
            count = articles.len(),
            listing = article_listing(articles),
        );
        let text = self.chat(SCORE_SYSTEM, user, 800).await?;

        let parsed: ScoreResponse = parse_model_json(&text).ok_or_else(|| {
            PortError::Unexpected("scoring LLM response contained no JSON".to_string())
        })?;

        if parsed.scores.len() != articles.len() {
            return Err(PortError::Unexpected(format!(
                "scoring LLM returned {} scores for {} articles",
                parsed.scores.len(),
                articles.len()
            )));
        }

        Ok(parsed
            .scores
            .into_iter()
            .map(|s| s.clamp(0, 100) as u8)
            .collect())
    }

    async fn detect_locale(&self, articles: &[Article]) -> PortResult<Locale> {
        let headlines = articles
            .iter()
            .take(10)
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let text = self.chat(LANGUAGE_SYSTEM, headlines, 30).await?;

        let parsed: LanguageResponse = parse_model_json(&text).ok_or_else(|| {
            PortError::Unexpected("language LLM response contained no JSON".to_string())
        })?;

        Locale::parse(&parsed.language).ok_or_else(|| {
            PortError::Unexpected(format!("unsupported language: {}", parsed.language))
        })
    }
}
