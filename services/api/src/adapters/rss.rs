//! services/api/src/adapters/rss.rs
//!
//! The feed-fetching adapter: implements the `FeedFetchService` port by
//! pulling RSS/Atom feeds over HTTP and parsing them with `feed-rs`.
//!
//! Fetching enforces timeouts, a size cap, and URL validation so a
//! user-supplied feed URL cannot point the server at internal hosts.

use async_trait::async_trait;
use feed_rs::parser;
use myrsspress_core::domain::{Article, FetchedFeed};
use myrsspress_core::ports::{FeedFetchService, PortError, PortResult};
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;
use tracing::warn;

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum feed size in bytes (5MB).
const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum length kept for an article description.
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Fetch attempts per feed. Backoff between attempts grows linearly.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP_MS: u64 = 500;

/// User agent string for feed fetching.
const USER_AGENT: &str = "MyRSSPress/1.0 (RSS Aggregator)";

/// RSS feed fetcher with security measures.
pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    /// Create a new fetcher with default settings.
    pub fn new() -> PortResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PortError::Unexpected(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch_bytes(&self, url: &str) -> PortResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_FEED_SIZE {
                return Err(PortError::Unexpected(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, MAX_FEED_SIZE
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(PortError::Unexpected(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                MAX_FEED_SIZE
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FeedFetchService for RssFetcher {
    async fn fetch(&self, url: &str) -> PortResult<FetchedFeed> {
        validate_url(url)?;

        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.fetch_bytes(url).await {
                Ok(bytes) => return parse_feed(url, &bytes),
                Err(e) => {
                    warn!(url, attempt, "feed fetch failed: {}", e);
                    last_err = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(
                            BACKOFF_STEP_MS * attempt as u64,
                        ))
                        .await;
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| PortError::Unexpected("feed fetch failed".to_string())))
    }
}

/// Validate a URL before fetching.
///
/// Rejects non-HTTP schemes, private/loopback IP literals, and internal
/// hostnames.
pub fn validate_url(url: &str) -> PortResult<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| PortError::Unexpected(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(PortError::Unexpected(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| PortError::Unexpected("URL has no host".to_string()))?;

    match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(PortError::Unexpected(format!("forbidden host: {}", domain)));
            }
        }
        url::Host::Ipv4(ipv4) => {
            if is_private_ip(&IpAddr::V4(ipv4)) {
                return Err(PortError::Unexpected(format!(
                    "private IP address not allowed: {}",
                    ipv4
                )));
            }
        }
        url::Host::Ipv6(ipv6) => {
            if is_private_ip(&IpAddr::V6(ipv6)) {
                return Err(PortError::Unexpected(format!(
                    "private IP address not allowed: {}",
                    ipv6
                )));
            }
        }
    }

    Ok(())
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host_lower = host.to_lowercase();
    if host_lower == "localhost" {
        return true;
    }
    let forbidden_suffixes = [".local", ".localhost", ".internal", ".intranet", ".lan"];
    forbidden_suffixes.iter().any(|s| host_lower.ends_with(s))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            ipv4.is_loopback()
                || ipv4.is_unspecified()
                || ipv4.is_broadcast()
                || octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || (octets[0] == 169 && octets[1] == 254)
        }
        IpAddr::V6(ipv6) => {
            let segments = ipv6.segments();
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || (segments[0] & 0xfe00) == 0xfc00
                || (segments[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes into a `FetchedFeed`.
fn parse_feed(url: &str, bytes: &[u8]) -> PortResult<FetchedFeed> {
    let feed = parser::parse(bytes)
        .map_err(|e| PortError::Unexpected(format!("failed to parse feed: {}", e)))?;

    let feed_title = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled Feed".to_string());

    let articles: Vec<Article> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            // An article without a link cannot be rendered; skip it.
            let link = entry.links.first().map(|l| l.href.clone())?;
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let description = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .map(|d| truncate(&strip_html(&d), MAX_DESCRIPTION_LENGTH));
            let image_url = entry
                .media
                .first()
                .and_then(|m| m.content.first())
                .and_then(|c| c.url.as_ref())
                .map(|u| u.to_string());
            let published_at = entry.published.or(entry.updated);

            Some(Article {
                title,
                description,
                link,
                published_at,
                image_url,
                source_url: url.to_string(),
                source_title: feed_title.clone(),
                importance: None,
            })
        })
        .collect();

    Ok(FetchedFeed {
        url: url.to_string(),
        title: feed_title,
        articles,
    })
}

/// Strip HTML tags and decode common entities.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' if !in_tag => {
                in_entity = true;
                entity.clear();
            }
            ';' if in_entity => {
                in_entity = false;
                match entity.as_str() {
                    "amp" => result.push('&'),
                    "lt" => result.push('<'),
                    "gt" => result.push('>'),
                    "quot" => result.push('"'),
                    "apos" => result.push('\''),
                    "nbsp" => result.push(' '),
                    _ => {
                        result.push('&');
                        result.push_str(&entity);
                        result.push(';');
                    }
                }
            }
            _ if in_entity => entity.push(ch),
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim()
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
