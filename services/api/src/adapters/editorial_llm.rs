//! services/api/src/adapters/editorial_llm.rs
//!
//! This module contains the adapter for the editorial LLM: the front-page
//! summary and the editorial column. It implements the `EditorialService`
//! port from the core crate.

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
use myrsspress_core::ports::{EditorialService, PortError, PortResult};

const SUMMARY_SYSTEM: &str = "You are a newspaper front-page editor. Summarize today's \
edition from the given headlines in 100 to 200 characters, at most 3 lines. Respond with \
ONLY the summary text, no quotes, no headline list.";

const EDITORIAL_SYSTEM: &str = "You are a newspaper columnist. Write a short editorial \
column (2-3 paragraphs) reflecting on the given articles in the context of the \
newspaper's theme. Respond with ONLY the column text.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EditorialService` using an OpenAI-compatible
/// LLM.
#[derive(Clone)]
pub struct OpenAiEditorialAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEditorialAdapter {
    /// Creates a new `OpenAiEditorialAdapter`.
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
            .temperature(0.3)
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
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                PortError::Unexpected("editorial LLM returned no text content".to_string())
            })
    }
}

fn headline_listing(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| format!("- {}", a.title))
        .collect::<Vec<_>>()
        .join("\n")
}

fn language_line(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Write in English.",
        Locale::Ja => "日本語で書いてください。",
    }
}

//=========================================================================================
// `EditorialService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EditorialService for OpenAiEditorialAdapter {
    async fn generate_summary(&self, articles: &[Article], locale: Locale) -> PortResult<String> {
        let user = format!(
            "{}\nHeadlines:\n{}",
            language_line(locale),
            headline_listing(articles)
        );
        self.chat(SUMMARY_SYSTEM, user, 200).await
    }

    async fn generate_editorial(
        &self,
        theme: &str,
        articles: &[Article],
        locale: Locale,
    ) -> PortResult<String> {
        let user = format!(
            "{}\nTheme: {}\nHeadlines:\n{}",
            language_line(locale),
            theme,
            headline_listing(articles)
        );
        self.chat(EDITORIAL_SYSTEM, user, 700).await
    }
}
