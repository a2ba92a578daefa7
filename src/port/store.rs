//! Persistence port.
//!
//! The minimum operation set the schedulers and command layer need.
//! Multi-row mutation groups (marking a discovery batch seen plus evicting
//! over-cap entries, appending a posted event plus trimming the log) must
//! be atomic in implementations.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{NewAlert, PostedEventRecord, PriceAlert, User};
use crate::error::Result;

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Fetch the user, creating a fresh subscription if none exists.
    /// Returns the user and whether it was created.
    async fn get_or_create_user(&self, user_id: i64) -> Result<(User, bool)>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    /// All non-paused users.
    async fn active_users(&self) -> Result<Vec<User>>;

    async fn set_user_paused(&self, user_id: i64, paused: bool) -> Result<bool>;

    async fn set_user_interval(&self, user_id: i64, interval_secs: i64) -> Result<bool>;

    // Keyword and category filters

    async fn user_keywords(&self, user_id: i64) -> Result<Vec<String>>;

    /// Replace the user's keyword set.
    async fn set_user_keywords(&self, user_id: i64, keywords: &[String]) -> Result<bool>;

    async fn clear_user_keywords(&self, user_id: i64) -> Result<bool>;

    async fn user_categories(&self, user_id: i64) -> Result<Vec<String>>;

    /// Replace the user's category set.
    async fn set_user_categories(&self, user_id: i64, categories: &[String]) -> Result<bool>;

    async fn clear_user_categories(&self, user_id: i64) -> Result<bool>;

    // Watchlist

    async fn user_watchlist(&self, user_id: i64) -> Result<Vec<String>>;

    /// Returns `false` if the slug was already watched.
    async fn add_to_watchlist(&self, user_id: i64, slug: &str) -> Result<bool>;

    async fn remove_from_watchlist(&self, user_id: i64, slug: &str) -> Result<bool>;

    /// Every user's watched slugs, keyed by user id.
    async fn watched_slugs_by_user(&self) -> Result<HashMap<i64, Vec<String>>>;

    // Price alerts

    async fn user_alerts(&self, user_id: i64) -> Result<Vec<PriceAlert>>;

    /// Returns `false` if an identical alert already exists.
    async fn add_alert(&self, user_id: i64, alert: &NewAlert) -> Result<bool>;

    /// Remove the user's nth alert (0-based, in listing order).
    async fn remove_alert_at(&self, user_id: i64, index: usize) -> Result<bool>;

    /// All non-triggered alerts with their owning user's id.
    async fn active_alerts(&self) -> Result<Vec<(i64, PriceAlert)>>;

    /// Terminal: a triggered alert is never evaluated again.
    async fn mark_alert_triggered(&self, alert_id: i64) -> Result<()>;

    // Seen-events dedup set

    async fn is_event_seen(&self, event_id: &str) -> Result<bool>;

    async fn seen_event_count(&self) -> Result<i64>;

    /// Mark a batch of events seen and evict the oldest entries down to
    /// `cap`, atomically. Returns the number of evicted entries.
    async fn record_seen_events(&self, event_ids: &[String], cap: i64) -> Result<usize>;

    // News cache

    /// Update the cached fingerprint for a slug. Returns whether the
    /// content changed; the first sighting of a slug caches silently and
    /// reports no change.
    async fn update_news_cache(
        &self,
        slug: &str,
        context_hash: &str,
        preview: &str,
    ) -> Result<bool>;

    // Posted-events log

    /// Append a broadcast record and trim the log to the newest `cap`
    /// entries, atomically.
    async fn append_posted_event(&self, record: &PostedEventRecord, cap: i64) -> Result<()>;
}
