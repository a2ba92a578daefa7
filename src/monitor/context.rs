//! Watchlist context monitoring: fingerprint each watched event's
//! commentary on the user's chosen interval and report changes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::MonitorHandle;
use crate::adapter::telegram::format::truncate_text;
use crate::config::MonitorConfig;
use crate::domain::fingerprint::fingerprint;
use crate::error::Result;
use crate::port::{Clock, Dispatcher, MarketGateway, Store};

/// Changed-entry previews keep this many leading characters.
const UPDATE_PREVIEW_LEN: usize = 800;

/// Status messages above this length get cut with a truncation marker.
const MAX_MESSAGE_LEN: usize = 4000;
const TRUNCATED_MESSAGE_LEN: usize = 3950;

/// Scheduler that detects substantive commentary changes on watchlisted
/// events and sends each due user one aggregated status message.
pub struct ContextMonitor {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MarketGateway>,
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
    /// Per-user last-checked time. Deliberately process-memory only: a
    /// restart makes every user immediately due, and the persisted
    /// fingerprints keep that from producing duplicate change reports.
    last_check: Mutex<HashMap<i64, DateTime<Utc>>>,
}

impl ContextMonitor {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn MarketGateway>,
        dispatcher: Arc<dyn Dispatcher>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            dispatcher,
            clock,
            config,
            last_check: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn the monitoring loop.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let period = Duration::from_secs(self.config.news_tick_interval_secs);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!("Context monitor started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cycle().await {
                            error!(error = %e, "Error in context monitoring cycle");
                        }
                    }
                }
            }
        });

        MonitorHandle::new("context-change", shutdown, task)
    }

    /// One tick: find due users and check their watchlists.
    pub async fn run_cycle(&self) -> Result<()> {
        let watchlists = self.store.watched_slugs_by_user().await?;
        let now = self.clock.now();

        for (user_id, slugs) in watchlists {
            if slugs.is_empty() {
                continue;
            }

            let user = match self.store.get_user(user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => continue,
                Err(e) => {
                    error!(user_id, error = %e, "Failed to load user");
                    continue;
                }
            };

            let interval_secs = user.effective_interval(
                self.config.default_news_interval_secs,
                self.config.min_news_interval_secs,
            );

            if !self.mark_due(user_id, now, interval_secs) {
                continue;
            }

            debug!(user_id, events = slugs.len(), "Checking watchlist");
            self.check_user_watchlist(user_id, &slugs, interval_secs).await;
        }

        Ok(())
    }

    /// Whether the user's interval has elapsed; updates the last-checked
    /// time before processing when due.
    fn mark_due(&self, user_id: i64, now: DateTime<Utc>, interval_secs: i64) -> bool {
        let mut last_check = self.last_check.lock();
        if let Some(last) = last_check.get(&user_id) {
            if (now - *last).num_seconds() < interval_secs {
                return false;
            }
        }
        last_check.insert(user_id, now);
        true
    }

    async fn check_user_watchlist(&self, user_id: i64, slugs: &[String], interval_secs: i64) {
        let mut updates: Vec<(String, String)> = Vec::new();
        let mut unchanged: Vec<String> = Vec::new();

        for slug in slugs {
            match self.gateway.fetch_context(slug).await {
                Some(context) => {
                    let hash = fingerprint(&context);
                    match self.store.update_news_cache(slug, &hash, &context).await {
                        Ok(true) => {
                            info!(slug = %slug, "Context update detected");
                            updates.push((slug.clone(), context));
                        }
                        // First sightings and identical fingerprints both
                        // land here; neither is a change.
                        Ok(false) => unchanged.push(slug.clone()),
                        Err(e) => {
                            error!(slug = %slug, error = %e, "Failed to update news cache");
                            unchanged.push(slug.clone());
                        }
                    }
                }
                None => unchanged.push(slug.clone()),
            }

            sleep(Duration::from_millis(self.config.context_fetch_delay_ms)).await;
        }

        if updates.is_empty() && unchanged.is_empty() {
            return;
        }

        let text = build_status_message(self.clock.now(), &updates, &unchanged, interval_secs);
        if !self.dispatcher.send_to_user(user_id, &text).await {
            error!(user_id, "Failed to send watchlist status");
        }
    }
}

/// Aggregate changed and unchanged entries into one status message,
/// capped to the Telegram-safe length with an explicit marker when cut.
fn build_status_message(
    now: DateTime<Utc>,
    updates: &[(String, String)],
    unchanged: &[String],
    interval_secs: i64,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (slug, context) in updates {
        let preview = truncate_text(context, UPDATE_PREVIEW_LEN);
        parts.push(format!(
            "<b>{slug}</b>\nhttps://polymarket.com/event/{slug}\n<b>New Update:</b>\n{preview}"
        ));
    }

    if !unchanged.is_empty() {
        if unchanged.len() == 1 {
            parts.push(format!("<b>{}</b> - No new updates", unchanged[0]));
        } else {
            let listing: Vec<String> = unchanged.iter().map(|slug| format!("• {slug}")).collect();
            parts.push(format!("<b>No new updates:</b>\n{}", listing.join("\n")));
        }
    }

    let header = format!(
        "<b>Watchlist Status</b> ({})\nNext update in {} min\n\n",
        now.format("%H:%M"),
        interval_secs / 60
    );
    let full = header + &parts.join("\n\n");

    if full.chars().count() > MAX_MESSAGE_LEN {
        let cut: String = full.chars().take(TRUNCATED_MESSAGE_LEN).collect();
        format!("{cut}\n\n<i>...truncated</i>")
    } else {
        full
    }
}
