//! HTML message formatting for Telegram.

use chrono::{DateTime, Utc};

use crate::domain::{as_percent, EventSummary, MarketSummary, PriceAlert};

/// Dollar amount with thousands separators, no cents.
pub fn format_money(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Human-readable timestamp, or "N/A" when absent.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%B %d, %Y at %H:%M UTC").to_string(),
        None => "N/A".into(),
    }
}

/// Truncate to `max` characters, appending an ellipsis when text was cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

/// Full event card: title, link, market stats, and current odds.
pub fn format_event(event: &EventSummary) -> String {
    if event.markets.is_empty() {
        return "No market data available".into();
    }

    let mut lines = vec![
        format!("<b>{}</b>\n", event.title),
        format!("<b>Link:</b> https://polymarket.com/event/{}\n", event.slug),
        "<b>Market stats:</b>".to_string(),
        format!("<b>Closes:</b> {}", format_date(event.end_date)),
        format!("<b>Total Liquidity:</b> {}", format_money(event.liquidity)),
        format!("<b>Total Volume:</b> {}\n", format_money(event.volume)),
    ];

    if event.markets.len() == 1 {
        lines.extend(format_single_market(&event.markets[0]));
    } else {
        lines.extend(format_multiple_markets(&event.markets));
    }

    lines.join("\n")
}

fn format_single_market(market: &MarketSummary) -> Vec<String> {
    let mut lines = Vec::new();

    if market.outcomes.len() == 2 {
        lines.push("<b>Current Odds:</b>".to_string());
        for (name, price) in market.outcomes.iter().zip(&market.outcome_prices) {
            lines.push(format!("  • {}: {:.1}%", name, as_percent(*price)));
        }
    } else {
        lines.push("<b>Options:</b>".to_string());
        for (idx, (name, price)) in market
            .outcomes
            .iter()
            .zip(&market.outcome_prices)
            .enumerate()
        {
            lines.push(format!("  {}. {}: {:.1}%", idx + 1, name, as_percent(*price)));
        }
    }

    lines
}

fn format_multiple_markets(markets: &[MarketSummary]) -> Vec<String> {
    let valid: Vec<&MarketSummary> = markets
        .iter()
        .filter(|m| !m.outcomes.is_empty() && !m.outcome_prices.is_empty())
        .collect();

    let mut lines = vec![format!("<b>Markets ({}):</b>", valid.len())];

    for (idx, market) in valid.iter().enumerate() {
        lines.push(format!("  {}. {}", idx + 1, market.question));
        for (name, price) in market.outcomes.iter().take(5).zip(&market.outcome_prices) {
            lines.push(format!("     • {}: {:.1}%", name, as_percent(*price)));
        }
    }

    lines
}

/// Notification body for a fired price alert.
pub fn format_alert_triggered(user_alert: &PriceAlert, current_pct: f64) -> String {
    format!(
        "<b>Price Alert Triggered!</b>\n\n\
         <b>Event:</b> {slug}\n\
         <b>Current price:</b> {current_pct:.1}%\n\
         <b>Condition:</b> {condition} {threshold}%\n\n\
         <a href='https://polymarket.com/event/{slug}'>View Event</a>",
        slug = user_alert.event_slug,
        condition = user_alert.condition,
        threshold = user_alert.threshold,
    )
}

/// One line of the /alerts listing.
pub fn format_alert_row(index: usize, user_alert: &PriceAlert) -> String {
    let status = if user_alert.is_triggered {
        "Triggered"
    } else {
        "Active"
    };
    format!(
        "{}. {}\n   {} {}% - {}\n",
        index + 1,
        user_alert.event_slug,
        user_alert.condition,
        user_alert.threshold,
        status
    )
}
