//! Market-data gateway port.

use async_trait::async_trait;

use crate::domain::EventSummary;
use crate::error::Result;

/// Read access to the external market-data source.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// The most recently created active events, newest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<EventSummary>>;

    /// Current snapshot of a single event, including per-outcome prices.
    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<EventSummary>>;

    /// Free-text market commentary for an event.
    ///
    /// Implementations retry once internally on timeout or an implausibly
    /// short response; callers only see the final optional result.
    async fn fetch_context(&self, slug: &str) -> Option<String>;
}
