//! services/api/src/adapters/suggest_llm.rs
//!
//! This module contains the adapter for the feed-suggestion LLM.
//! It implements the `FeedSuggestionService` port from the core crate.

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
use myrsspress_core::domain::{FeedSuggestion, Locale};
use myrsspress_core::ports::{FeedSuggestionService, PortError, PortResult};
use serde::Deserialize;

use crate::adapters::extract::parse_model_json;

const SUGGEST_SYSTEM: &str = "You are an RSS curation assistant. Given a newspaper theme, \
suggest real, well-known, publicly accessible RSS feed URLs that cover the theme. Prefer \
major publications with stable feed endpoints. Respond with ONLY a JSON object of the form \
{\"feeds\": [{\"url\": \"...\", \"title\": \"...\"}]} with at most 10 entries. Do not invent \
URLs you are not confident exist.";

const NAME_SYSTEM: &str = "You are a newspaper naming assistant. Given a theme, propose one \
short, evocative newspaper name (maximum 5 words). Respond with ONLY the name, no quotes, \
no explanation.";

#[derive(Deserialize)]
struct SuggestResponse {
    feeds: Vec<FeedSuggestion>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `FeedSuggestionService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSuggestAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSuggestAdapter {
    /// Creates a new `OpenAiSuggestAdapter`.
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
            .temperature(0.2)
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
                PortError::Unexpected("suggestion LLM returned no text content".to_string())
            })
    }
}

//=========================================================================================
// `FeedSuggestionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FeedSuggestionService for OpenAiSuggestAdapter {
    async fn suggest_feeds(&self, theme: &str, locale: Locale) -> PortResult<Vec<FeedSuggestion>> {
        let user = match locale {
            Locale::En => format!("Theme: {theme}\nLanguage of publications: English"),
            Locale::Ja => format!("テーマ: {theme}\n出版物の言語: 日本語"),
        };
        let text = self.chat(SUGGEST_SYSTEM, user, 600).await?;

        let parsed: SuggestResponse = parse_model_json(&text).ok_or_else(|| {
            PortError::Unexpected("suggestion LLM response contained no JSON".to_string())
        })?;

        // The model occasionally pads with blank entries; drop them.
        Ok(parsed
            .feeds
            .into_iter()
            .filter(|f| !f.url.trim().is_empty())
            .take(10)
            .collect())
    }

    async fn suggest_name(&self, theme: &str, locale: Locale) -> PortResult<String> {
        let user = match locale {
            Locale::En => format!("Theme: {theme}\nThe name must be in English."),
            Locale::Ja => format!("テーマ: {theme}\n新聞名は日本語で。"),
        };
        let text = self.chat(NAME_SYSTEM, user, 30).await?;

        let name = text.trim().trim_matches('"').trim().to_string();
        if name.is_empty() {
            return Err(PortError::Unexpected(
                "name LLM returned an empty name".to_string(),
            ));
        }
        Ok(name)
    }
}
