//! Event discovery: detect newly listed events and notify matching users.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::MonitorHandle;
use crate::adapter::telegram::format::format_event;
use crate::config::MonitorConfig;
use crate::domain::{filter, EventSummary, PostedEventRecord};
use crate::error::Result;
use crate::port::{Clock, Dispatcher, MarketGateway, Store};

/// Scheduler that finds genuinely-new events and notifies interested,
/// non-paused users, optionally broadcasting to a channel.
pub struct EventDiscoveryMonitor {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MarketGateway>,
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
}

impl EventDiscoveryMonitor {
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
        }
    }

    /// Spawn the monitoring loop.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            if let Err(e) = self.bootstrap_seen_events().await {
                error!(error = %e, "Failed to bootstrap seen events");
            }

            let period = Duration::from_secs(self.config.event_check_interval_secs);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!("Event discovery monitor started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cycle().await {
                            error!(error = %e, "Error in event discovery cycle");
                        }
                    }
                }
            }
        });

        MonitorHandle::new("event-discovery", shutdown, task)
    }

    /// Seed the seen-events set from the most recent listings so the first
    /// real cycle does not flood users with historical backfill.
    pub async fn bootstrap_seen_events(&self) -> Result<()> {
        let count = self.store.seen_event_count().await?;
        if count > 0 {
            return Ok(());
        }

        info!(
            limit = self.config.bootstrap_limit,
            "Initializing seen events from recent listings"
        );
        let events = self.gateway.fetch_recent(self.config.bootstrap_limit).await?;
        let ids: Vec<String> = events
            .into_iter()
            .map(|event| event.id)
            .filter(|id| !id.is_empty())
            .collect();
        self.store
            .record_seen_events(&ids, self.config.max_seen_events)
            .await?;
        info!(count = ids.len(), "Seen events initialized");

        Ok(())
    }

    /// One discovery cycle: fetch, classify, dedup, broadcast, notify.
    pub async fn run_cycle(&self) -> Result<()> {
        let recent = self.gateway.fetch_recent(self.config.fetch_limit).await?;
        let now = self.clock.now();

        let mut examined: Vec<String> = Vec::new();
        let mut batch: Vec<EventSummary> = Vec::new();

        for event in recent {
            if event.id.is_empty() {
                continue;
            }

            match self.store.is_event_seen(&event.id).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    error!(event_id = %event.id, error = %e, "Seen check failed");
                    continue;
                }
            }

            // Old or already high-volume events showing up for the first
            // time are listing artifacts; mark them seen without notifying.
            examined.push(event.id.clone());
            if self.is_genuinely_new(&event, now) {
                info!(title = %event.title, "New event found");
                batch.push(event);
            }
        }

        // All of this cycle's seen-set mutations, including the cap
        // eviction, commit as one unit.
        self.store
            .record_seen_events(&examined, self.config.max_seen_events)
            .await?;

        if batch.is_empty() {
            return Ok(());
        }
        info!(count = batch.len(), "Found new events");

        self.broadcast(&batch).await;
        self.notify_users(&batch).await;

        Ok(())
    }

    fn is_genuinely_new(&self, event: &EventSummary, now: DateTime<Utc>) -> bool {
        if let Some(age_hours) = event.age_hours(now) {
            if age_hours > self.config.new_event_age_hours as f64 {
                return false;
            }
        }
        event.volume <= self.config.high_volume_threshold
    }

    async fn broadcast(&self, batch: &[EventSummary]) {
        for event in batch {
            let text = format!("<b>New Polymarket Event</b>\n\n{}", format_event(event));

            // An unconfigured channel reports false, skipping the log too.
            if !self.dispatcher.send_to_channel(&text).await {
                continue;
            }
            info!(slug = %event.slug, "Posted event to channel");

            let record = PostedEventRecord::from(event);
            if let Err(e) = self
                .store
                .append_posted_event(&record, self.config.max_posted_events)
                .await
            {
                error!(slug = %event.slug, error = %e, "Failed to record posted event");
            }
        }
    }

    async fn notify_users(&self, batch: &[EventSummary]) {
        let users = match self.store.active_users().await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to load active users");
                return;
            }
        };

        for user in users {
            let keywords = match self.store.user_keywords(user.telegram_id).await {
                Ok(keywords) => keywords,
                Err(e) => {
                    error!(user_id = user.telegram_id, error = %e, "Failed to load keywords");
                    continue;
                }
            };
            let categories = match self.store.user_categories(user.telegram_id).await {
                Ok(categories) => categories,
                Err(e) => {
                    error!(user_id = user.telegram_id, error = %e, "Failed to load categories");
                    continue;
                }
            };

            for event in batch {
                if !filter::matches_keywords(event, &keywords) {
                    continue;
                }
                if !filter::matches_categories(event, &categories) {
                    continue;
                }

                let text = format!(
                    "<b>New Event Matching Your Filters</b>\n\n{}",
                    format_event(event)
                );
                if !self.dispatcher.send_to_user(user.telegram_id, &text).await {
                    warn!(user_id = user.telegram_id, "Failed to notify user");
                }

                sleep(Duration::from_millis(self.config.send_delay_ms)).await;
            }
        }
    }
}
