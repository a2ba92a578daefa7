//! Event and market snapshot types.

use chrono::{DateTime, Utc};

/// One market (question) inside an event, with its current outcome prices.
#[derive(Debug, Clone, Default)]
pub struct MarketSummary {
    pub question: String,
    pub outcomes: Vec<String>,
    /// Prices as delivered by the feed: usually fractions of 1, occasionally
    /// already percentages. Normalize with [`as_percent`] before display
    /// or threshold comparison.
    pub outcome_prices: Vec<f64>,
}

/// A prediction-market event as returned by the market-data gateway.
#[derive(Debug, Clone, Default)]
pub struct EventSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub volume: f64,
    pub liquidity: f64,
    pub markets: Vec<MarketSummary>,
}

impl EventSummary {
    /// Age in hours at `now`, or `None` when the feed gave no creation
    /// timestamp.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.created_at
            .map(|created| (now - created).num_seconds() as f64 / 3600.0)
    }

    /// Lowercased title plus all market questions, the text the keyword
    /// and category filters search over.
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        for market in &self.markets {
            text.push(' ');
            text.push_str(&market.question.to_lowercase());
        }
        text
    }
}

/// Record of an event broadcast to the channel, kept for external read-sync.
#[derive(Debug, Clone)]
pub struct PostedEventRecord {
    pub event_id: String,
    pub event_slug: String,
    pub title: Option<String>,
    pub volume: f64,
    pub liquidity: f64,
}

impl From<&EventSummary> for PostedEventRecord {
    fn from(event: &EventSummary) -> Self {
        Self {
            event_id: event.id.clone(),
            event_slug: event.slug.clone(),
            title: (!event.title.is_empty())
                .then(|| event.title.chars().take(500).collect()),
            volume: event.volume,
            liquidity: event.liquidity,
        }
    }
}

/// Normalize a feed price to a 0-100 percentage.
///
/// Values up to and including 1 are fractions and get scaled by 100;
/// values above 1 are already percentages and pass through unchanged.
pub fn as_percent(price: f64) -> f64 {
    if price <= 1.0 {
        price * 100.0
    } else {
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn as_percent_scales_fractions() {
        assert!((as_percent(0.75) - 75.0).abs() < f64::EPSILON);
        assert!((as_percent(0.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn as_percent_passes_through_percentages() {
        assert!((as_percent(75.0) - 75.0).abs() < f64::EPSILON);
        assert!((as_percent(1.5) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn as_percent_treats_exactly_one_as_fraction() {
        assert!((as_percent(1.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn age_hours_without_timestamp_is_none() {
        let event = EventSummary::default();
        assert_eq!(event.age_hours(Utc::now()), None);
    }

    #[test]
    fn age_hours_counts_elapsed_time() {
        let now = Utc::now();
        let event = EventSummary {
            created_at: Some(now - Duration::minutes(90)),
            ..Default::default()
        };
        assert!((event.age_hours(now).unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn searchable_text_joins_title_and_questions() {
        let event = EventSummary {
            title: "BTC above 100k?".into(),
            markets: vec![
                MarketSummary {
                    question: "Will Bitcoin close above 100k?".into(),
                    ..Default::default()
                },
                MarketSummary {
                    question: "Will ETH flip BTC?".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let text = event.searchable_text();
        assert!(text.contains("btc above 100k?"));
        assert!(text.contains("will bitcoin close above 100k?"));
        assert!(text.contains("will eth flip btc?"));
    }

    #[test]
    fn posted_record_truncates_long_titles() {
        let event = EventSummary {
            id: "42".into(),
            slug: "long-title".into(),
            title: "x".repeat(600),
            ..Default::default()
        };
        let record = PostedEventRecord::from(&event);
        assert_eq!(record.title.unwrap().chars().count(), 500);
    }
}
