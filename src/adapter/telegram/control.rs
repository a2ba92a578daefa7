//! Command execution against the store and gateway.
//!
//! Parses nothing itself: takes a [`BotCommand`] and returns the HTML
//! response text to send back.

use std::sync::Arc;

use tracing::{error, info};

use super::command::{
    parse_event_target, parse_keywords, validate_keywords, AlertSpec, BotCommand,
    MIN_INTERVAL_MINUTES,
};
use super::format::{format_alert_row, truncate_text};
use crate::domain::{category, fingerprint::fingerprint, NewAlert};
use crate::error::Result;
use crate::port::{MarketGateway, Store};

const GENERIC_ERROR: &str = "Something went wrong. Please try again later.";

/// Executes bot commands on behalf of one user.
pub struct BotControl {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MarketGateway>,
    min_interval_secs: i64,
}

impl BotControl {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn MarketGateway>, min_interval_secs: i64) -> Self {
        Self {
            store,
            gateway,
            min_interval_secs,
        }
    }

    /// Execute one parsed command and return response text.
    pub async fn execute(&self, user_id: i64, command: BotCommand) -> String {
        match self.try_execute(user_id, command).await {
            Ok(text) => text,
            Err(e) => {
                error!(user_id, error = %e, "Command handling failed");
                GENERIC_ERROR.to_string()
            }
        }
    }

    async fn try_execute(&self, user_id: i64, command: BotCommand) -> Result<String> {
        match command {
            BotCommand::Start => self.start(user_id).await,
            BotCommand::Help => Ok(help_text()),
            BotCommand::Pause => self.pause(user_id).await,
            BotCommand::Resume => self.resume(user_id).await,
            BotCommand::Watch { target } => self.watch(user_id, target).await,
            BotCommand::Unwatch { slug } => self.unwatch(user_id, slug).await,
            BotCommand::Watchlist => self.watchlist(user_id).await,
            BotCommand::Interval { minutes } => self.interval(user_id, minutes).await,
            BotCommand::Alert { spec } => self.alert(user_id, spec).await,
            BotCommand::Alerts => self.alerts(user_id).await,
            BotCommand::RemoveAlert { number } => self.remove_alert(user_id, number).await,
            BotCommand::Keywords { input } => self.keywords(user_id, input).await,
            BotCommand::Category { input } => self.category(user_id, input).await,
            BotCommand::Categories => self.categories(user_id).await,
        }
    }

    async fn start(&self, user_id: i64) -> Result<String> {
        let (_, created) = self.store.get_or_create_user(user_id).await?;

        let mut text = String::from(
            "<b>Welcome to Polywatch</b>\n\n\
             Track Polymarket events and get notified about new listings,\n\
             price moves, and market context updates.\n\n",
        );
        if created {
            info!(user_id, "New user subscribed");
            text.push_str("You're now subscribed to new events!\n");
        } else {
            text.push_str("Welcome back!\n");
        }
        text.push_str("Use /help for the full command list");

        Ok(text)
    }

    async fn pause(&self, user_id: i64) -> Result<String> {
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok("You're not subscribed. Use /start to subscribe.".into());
        };
        if user.is_paused {
            return Ok("You're already paused. Use /resume to resume notifications.".into());
        }

        self.store.set_user_paused(user_id, true).await?;
        info!(user_id, "User paused notifications");
        Ok(
            "<b>Notifications paused</b>\n\nYou won't receive any new event notifications.\n\n\
             Use /resume when you want to resume notifications."
                .into(),
        )
    }

    async fn resume(&self, user_id: i64) -> Result<String> {
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok("You're not subscribed. Use /start to subscribe.".into());
        };
        if !user.is_paused {
            return Ok("Notifications are already active.".into());
        }

        self.store.set_user_paused(user_id, false).await?;
        info!(user_id, "User resumed notifications");
        Ok("<b>Notifications resumed</b>\n\nYou'll receive new event notifications again.".into())
    }

    async fn watch(&self, user_id: i64, target: Option<String>) -> Result<String> {
        let Some(target) = target else {
            return Ok(
                "<b>Send me a Polymarket link to watch</b>\n\n\
                 Example:\n/watch https://polymarket.com/event/btc-price-2026"
                    .into(),
            );
        };

        let Some(slug) = parse_event_target(&target) else {
            return Ok(
                "Invalid link. Please send a valid Polymarket URL.\n\n\
                 Example: https://polymarket.com/event/your-event-slug"
                    .into(),
            );
        };

        self.store.get_or_create_user(user_id).await?;

        if !self.store.add_to_watchlist(user_id, &slug).await? {
            return Ok(format!("<b>{slug}</b> is already in your watchlist."));
        }
        info!(user_id, slug, "Added to watchlist");

        // Prime the news cache so the first monitoring pass has a baseline.
        match self.gateway.fetch_context(&slug).await {
            Some(context) => {
                let hash = fingerprint(&context);
                self.store.update_news_cache(&slug, &hash, &context).await?;

                let preview = truncate_text(&context, 2000);
                Ok(format!(
                    "Added <b>{slug}</b> to your watchlist!\n\n\
                     <b>Market Context for {slug}:</b>\n\n{preview}"
                ))
            }
            None => Ok(format!(
                "Added <b>{slug}</b> to your watchlist!\n\n\
                 Could not fetch Market Context for this event."
            )),
        }
    }

    async fn unwatch(&self, user_id: i64, slug: Option<String>) -> Result<String> {
        let Some(slug) = slug else {
            return Ok("Please provide an event slug.\n\nExample:\n/unwatch btc-price-2026".into());
        };

        if self.store.remove_from_watchlist(user_id, &slug).await? {
            info!(user_id, slug, "Removed from watchlist");
            Ok(format!("Removed <b>{slug}</b> from your watchlist."))
        } else {
            Ok("Event not found in your watchlist.".into())
        }
    }

    async fn watchlist(&self, user_id: i64) -> Result<String> {
        let slugs = self.store.user_watchlist(user_id).await?;
        if slugs.is_empty() {
            return Ok(
                "<b>Your Watchlist is empty</b>\n\nAdd events with:\n/watch &lt;event-slug&gt;"
                    .into(),
            );
        }

        let mut lines = vec!["<b>Your Watchlist:</b>\n".to_string()];
        for (idx, slug) in slugs.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, slug));
            lines.push(format!("   https://polymarket.com/event/{slug}\n"));
        }
        lines.push(format!("\n<b>Total:</b> {} events", slugs.len()));
        lines.push("\nUse /unwatch &lt;slug&gt; to remove".to_string());

        Ok(lines.join("\n"))
    }

    async fn interval(&self, user_id: i64, minutes: Option<i64>) -> Result<String> {
        let Some(minutes) = minutes else {
            let current = self
                .store
                .get_user(user_id)
                .await?
                .map(|user| user.news_interval_secs / 60)
                .unwrap_or(5);
            return Ok(format!(
                "<b>Update Interval</b>\n\n\
                 Current: <b>{current} minutes</b>\n\n\
                 <b>Usage:</b>\n/interval &lt;minutes&gt;\n\n\
                 <i>Minimum: {} minutes</i>",
                self.min_interval_secs / 60
            ));
        };

        let floor_minutes = self.min_interval_secs / 60;
        if minutes < MIN_INTERVAL_MINUTES.max(floor_minutes) {
            return Ok(format!(
                "Minimum interval is {} minutes.\n\nExample: /interval {}",
                floor_minutes, floor_minutes
            ));
        }

        self.store.get_or_create_user(user_id).await?;
        self.store.set_user_interval(user_id, minutes * 60).await?;

        Ok(format!(
            "<b>Interval set to {minutes} minutes!</b>\n\n\
             You'll receive watchlist updates every {minutes} minutes."
        ))
    }

    async fn alert(&self, user_id: i64, spec: Option<AlertSpec>) -> Result<String> {
        let Some(spec) = spec else {
            return Ok(
                "Invalid format.\n\n\
                 <b>Usage:</b>\n\
                 /alert &lt;event-slug&gt; &gt; &lt;threshold&gt;\n\
                 /alert &lt;event-slug&gt; &lt; &lt;threshold&gt;\n\n\
                 <b>Examples:</b>\n\
                 /alert btc-price-2026 &gt; 70\n\
                 /alert election-winner &lt; 30"
                    .into(),
            );
        };

        self.store.get_or_create_user(user_id).await?;

        let new_alert = NewAlert {
            event_slug: spec.slug.clone(),
            condition: spec.condition,
            threshold: spec.threshold,
            outcome_index: 0,
        };

        if self.store.add_alert(user_id, &new_alert).await? {
            info!(
                user_id,
                slug = spec.slug,
                condition = %spec.condition,
                threshold = spec.threshold,
                "Alert set"
            );
            Ok(format!(
                "<b>Alert set!</b>\n\n\
                 Event: {}\n\
                 Condition: {} {}%\n\n\
                 You'll be notified when the price crosses this threshold.",
                spec.slug, spec.condition, spec.threshold
            ))
        } else {
            Ok("This alert already exists.".into())
        }
    }

    async fn alerts(&self, user_id: i64) -> Result<String> {
        let alerts = self.store.user_alerts(user_id).await?;
        if alerts.is_empty() {
            return Ok(
                "<b>No alerts set</b>\n\nSet alerts with:\n/alert &lt;event-slug&gt; &gt; &lt;threshold&gt;"
                    .into(),
            );
        }

        let mut lines = vec!["<b>Your Price Alerts:</b>\n".to_string()];
        for (idx, alert) in alerts.iter().enumerate() {
            lines.push(format_alert_row(idx, alert));
        }
        lines.push(format!("\n<b>Total:</b> {} alerts", alerts.len()));
        lines.push("\nUse /rmalert &lt;number&gt; to remove".to_string());

        Ok(lines.join("\n"))
    }

    async fn remove_alert(&self, user_id: i64, number: Option<usize>) -> Result<String> {
        let Some(number) = number else {
            return Ok("Please provide alert number.\n\nExample:\n/rmalert 1".into());
        };
        if number == 0 {
            return Ok("Alert not found.".into());
        }

        if self.store.remove_alert_at(user_id, number - 1).await? {
            info!(user_id, number, "Alert removed");
            Ok("Alert removed!".into())
        } else {
            Ok("Alert not found.".into())
        }
    }

    async fn keywords(&self, user_id: i64, input: Option<String>) -> Result<String> {
        let Some(input) = input else {
            let current = self.store.user_keywords(user_id).await?;
            let status = if current.is_empty() {
                "Currently no filters set - you'll receive all events.".to_string()
            } else {
                format!("<b>Your current keywords:</b>\n{}", current.join(", "))
            };
            return Ok(format!(
                "<b>Keyword Filters</b>\n\n{status}\n\n\
                 <b>How to use:</b>\n\
                 /keywords btc, eth, election - Set keywords\n\
                 /keywords clear - Remove all filters\n\n\
                 <b>Filter options:</b>\n\
                 • Simple words: btc, eth, sports\n\
                 • Phrases: \"united states\", \"world cup\"\n\
                 • OR logic: keywords separated by commas"
            ));
        };

        if input.eq_ignore_ascii_case("clear") {
            self.store.clear_user_keywords(user_id).await?;
            return Ok("All keyword filters removed. You'll receive all events.".into());
        }

        let parsed = parse_keywords(&input);
        let validated = match validate_keywords(&parsed) {
            Ok(validated) if !validated.is_empty() => validated,
            Ok(_) => return Ok("Please provide at least one valid keyword.".into()),
            Err(reason) => return Ok(format!("Invalid keywords: {reason}")),
        };

        self.store.get_or_create_user(user_id).await?;
        self.store.set_user_keywords(user_id, &validated).await?;
        info!(user_id, count = validated.len(), "Keywords saved");

        let listing: Vec<String> = validated.iter().map(|k| format!("  • {k}")).collect();
        Ok(format!(
            "<b>Keywords saved!</b>\n\n\
             You will only receive events matching:\n{}\n\n\
             Use /keywords clear to remove filters.",
            listing.join("\n")
        ))
    }

    async fn category(&self, user_id: i64, input: Option<String>) -> Result<String> {
        let available = category::category_names().join(", ");

        let Some(input) = input else {
            let current = self.store.user_categories(user_id).await?;
            let status = if current.is_empty() {
                "<b>No category filters set</b>".to_string()
            } else {
                format!("<b>Your categories:</b> {}", current.join(", "))
            };
            return Ok(format!(
                "{status}\n\n\
                 <b>Available categories:</b>\n{available}\n\n\
                 <b>Usage:</b>\n\
                 /category crypto politics\n\
                 /category clear - Remove filters"
            ));
        };

        if input.eq_ignore_ascii_case("clear") {
            self.store.clear_user_categories(user_id).await?;
            info!(user_id, "Category filters cleared");
            return Ok("Category filters cleared. You'll receive all events.".into());
        }

        let selected: Vec<String> = input
            .split([',', ' '])
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let valid: Vec<String> = selected
            .iter()
            .filter(|c| category::is_known_category(c))
            .cloned()
            .collect();

        if valid.is_empty() {
            return Ok(format!("Invalid categories. Available: {available}"));
        }

        self.store.get_or_create_user(user_id).await?;
        self.store.set_user_categories(user_id, &valid).await?;
        info!(user_id, count = valid.len(), "Categories saved");

        Ok(format!(
            "<b>Categories saved!</b>\n\n\
             You will only receive events in: {}\n\n\
             Use /category clear to remove filters.",
            valid.join(", ")
        ))
    }

    async fn categories(&self, user_id: i64) -> Result<String> {
        let current = self.store.user_categories(user_id).await?;
        let available = category::category_names().join(", ");

        let status = if current.is_empty() {
            "No category filters set.".to_string()
        } else {
            format!("<b>Your categories:</b> {}", current.join(", "))
        };

        Ok(format!(
            "<b>Available categories:</b>\n{available}\n\n{status}\n\n\
             Set filters with /category crypto politics"
        ))
    }
}

fn help_text() -> String {
    "<b>Polywatch</b>\n\n\
     <b>Main Commands:</b>\n\
     /start - Subscribe to notifications\n\
     /pause - Pause notifications\n\
     /resume - Resume notifications\n\n\
     <b>Filters:</b>\n\
     /keywords - Filter by keywords\n\
     /category - Filter by category (crypto, politics, sports)\n\
     /categories - Show all categories\n\n\
     <b>Watchlist:</b>\n\
     /watch &lt;slug&gt; - Add to watchlist\n\
     /watchlist - Show watchlist\n\
     /unwatch &lt;slug&gt; - Remove from watchlist\n\
     /interval &lt;min&gt; - Set update interval\n\n\
     <b>Price Alerts:</b>\n\
     /alert &lt;slug&gt; &gt; &lt;%&gt; - Set alert\n\
     /alerts - Show alerts\n\
     /rmalert &lt;#&gt; - Remove alert"
        .to_string()
}
