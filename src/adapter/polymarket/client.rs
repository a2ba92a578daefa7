//! Polymarket REST API client.
//!
//! Two API surfaces:
//! - **Gamma API** (`gamma-api.polymarket.com`) for event discovery and
//!   single-event snapshots with volume, liquidity, and outcome prices
//! - **Event-summary endpoint** for free-text AI market commentary
//!
//! Every call carries an explicit timeout. Only the commentary fetch
//! retries, once, after a fixed short delay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tokio::time::sleep;
use tracing::{info, warn};

use super::dto::GammaEvent;
use crate::config::PolymarketConfig;
use crate::domain::EventSummary;
use crate::error::Result;
use crate::port::MarketGateway;

/// HTTP client for the Polymarket REST APIs.
pub struct PolymarketClient {
    http: HttpClient,
    /// Gamma API base URL.
    api_url: String,
    /// Event-summary endpoint for market commentary.
    context_url: String,
    context_timeout: Duration,
    context_retry_delay: Duration,
    /// Commentary shorter than this is treated as a failed fetch.
    min_context_len: usize,
}

impl PolymarketClient {
    #[must_use]
    pub fn from_config(config: &PolymarketConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            api_url: config.api_url.clone(),
            context_url: config.context_url.clone(),
            context_timeout: Duration::from_secs(config.context_timeout_secs),
            context_retry_delay: Duration::from_secs(config.context_retry_delay_secs),
            min_context_len: config.min_context_len,
        }
    }

    async fn get_events(&self, query: &[(&str, String)]) -> Result<Vec<GammaEvent>> {
        let url = format!("{}/events", self.api_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn fetch_context_once(&self, slug: &str) -> Result<String> {
        let url = format!("{}?prompt={slug}", self.context_url);
        let response = self
            .http
            .post(&url)
            .timeout(self.context_timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketGateway for PolymarketClient {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<EventSummary>> {
        let events = self
            .get_events(&[
                ("limit", limit.to_string()),
                ("offset", "0".into()),
                ("closed", "false".into()),
                ("active", "true".into()),
                ("order", "createdAt".into()),
                ("ascending", "false".into()),
            ])
            .await?;

        Ok(events.into_iter().map(GammaEvent::into_event).collect())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<EventSummary>> {
        let events = self.get_events(&[("slug", slug.to_string())]).await?;

        let event = events.into_iter().next().map(GammaEvent::into_event);
        if event.is_none() {
            warn!(slug, "Event not found");
        }
        Ok(event)
    }

    async fn fetch_context(&self, slug: &str) -> Option<String> {
        if slug.is_empty() {
            warn!("Cannot fetch market context: slug is empty");
            return None;
        }

        for attempt in 1..=2u32 {
            match self.fetch_context_once(slug).await {
                Ok(text) if text.len() > self.min_context_len => {
                    let text = strip_sources(&text);
                    info!(slug, chars = text.len(), "Got market context");
                    return Some(text);
                }
                Ok(text) => {
                    warn!(slug, chars = text.len(), attempt, "Market context too short");
                }
                Err(e) => {
                    warn!(slug, error = %e, attempt, "Market context fetch failed");
                }
            }

            if attempt == 1 {
                sleep(self.context_retry_delay).await;
            }
        }

        None
    }
}

/// Drop the trailing sources block the commentary endpoint sometimes appends.
fn strip_sources(text: &str) -> String {
    text.split("__SOURCES__").next().unwrap_or(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_sources_removes_trailing_block() {
        let text = "The market is tight.\n__SOURCES__\n[1] example.com";
        assert_eq!(strip_sources(text), "The market is tight.");
    }

    #[test]
    fn strip_sources_keeps_clean_text() {
        assert_eq!(strip_sources("  plain text  "), "plain text");
    }

    #[test]
    fn from_config_uses_configured_endpoints() {
        let config = PolymarketConfig {
            api_url: "https://example.test".into(),
            context_url: "https://example.test/summary".into(),
            ..Default::default()
        };
        let client = PolymarketClient::from_config(&config);
        assert_eq!(client.api_url, "https://example.test");
        assert_eq!(client.context_url, "https://example.test/summary");
        assert_eq!(client.min_context_len, 50);
    }
}
