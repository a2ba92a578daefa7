//! Price-alert evaluation: fire each active alert at most once when its
//! threshold condition becomes true.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::MonitorHandle;
use crate::adapter::telegram::format::format_alert_triggered;
use crate::config::MonitorConfig;
use crate::domain::{as_percent, MarketSummary, PriceAlert};
use crate::error::Result;
use crate::port::{Dispatcher, MarketGateway, Store};

/// Scheduler that evaluates price-threshold alerts against live snapshots.
pub struct AlertMonitor {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MarketGateway>,
    dispatcher: Arc<dyn Dispatcher>,
    config: MonitorConfig,
}

impl AlertMonitor {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn MarketGateway>,
        dispatcher: Arc<dyn Dispatcher>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            dispatcher,
            config,
        }
    }

    /// Spawn the monitoring loop.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let period = Duration::from_secs(self.config.alert_check_interval_secs);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!("Alert monitor started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cycle().await {
                            error!(error = %e, "Error in alert monitoring cycle");
                        }
                    }
                }
            }
        });

        MonitorHandle::new("alert-evaluation", shutdown, task)
    }

    /// One evaluation cycle over all active alerts, one snapshot fetch per
    /// distinct event slug.
    pub async fn run_cycle(&self) -> Result<()> {
        let active = self.store.active_alerts().await?;
        if active.is_empty() {
            return Ok(());
        }

        let mut by_slug: BTreeMap<String, Vec<(i64, PriceAlert)>> = BTreeMap::new();
        let total = active.len();
        for (user_id, alert) in active {
            by_slug
                .entry(alert.event_slug.clone())
                .or_default()
                .push((user_id, alert));
        }

        debug!(alerts = total, events = by_slug.len(), "Checking alerts");

        for (slug, owners) in &by_slug {
            self.check_event_alerts(slug, owners).await;
            sleep(Duration::from_millis(self.config.snapshot_fetch_delay_ms)).await;
        }

        Ok(())
    }

    /// Evaluate all alerts on one slug against a fresh snapshot. An
    /// unavailable snapshot skips only this slug's alerts this cycle.
    async fn check_event_alerts(&self, slug: &str, owners: &[(i64, PriceAlert)]) {
        let snapshot = match self.gateway.fetch_by_slug(slug).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!(slug, "Could not fetch event for alert check");
                return;
            }
            Err(e) => {
                warn!(slug, error = %e, "Snapshot fetch failed");
                return;
            }
        };

        let Some(market) = snapshot.markets.first() else {
            return;
        };

        for (user_id, alert) in owners {
            if let Err(e) = self.check_single_alert(*user_id, alert, market).await {
                error!(alert_id = alert.id, error = %e, "Error checking alert");
            }
        }
    }

    async fn check_single_alert(
        &self,
        user_id: i64,
        alert: &PriceAlert,
        market: &MarketSummary,
    ) -> Result<()> {
        let Some(&price) = market.outcome_prices.get(alert.outcome_index) else {
            return Ok(());
        };

        let current = as_percent(price);
        if !alert.condition.is_met(current, alert.threshold) {
            return Ok(());
        }

        // Mark first: once triggered, this and all future cycles skip it.
        self.store.mark_alert_triggered(alert.id).await?;

        let text = format_alert_triggered(alert, current);
        if !self.dispatcher.send_to_user(user_id, &text).await {
            error!(user_id, "Failed to send alert notification");
        }
        info!(user_id, slug = %alert.event_slug, "Alert triggered");

        Ok(())
    }
}
