//! Shared test doubles: temp database, recording dispatcher, scripted
//! gateway, manual clock, and event builders.
#![allow(dead_code)]

pub mod manual_clock;
pub mod recording_dispatcher;
pub mod scripted_gateway;
pub mod temp_db;

use chrono::{DateTime, Duration, Utc};
use polywatch::domain::{EventSummary, MarketSummary};

/// An event created one hour before `now`, well under any volume threshold.
pub fn fresh_event(now: DateTime<Utc>, id: &str, slug: &str, title: &str) -> EventSummary {
    EventSummary {
        id: id.into(),
        slug: slug.into(),
        title: title.into(),
        created_at: Some(now - Duration::hours(1)),
        end_date: None,
        volume: 100.0,
        liquidity: 50.0,
        markets: vec![MarketSummary {
            question: title.into(),
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec![0.5, 0.5],
        }],
    }
}

/// A snapshot for alert tests with the given outcome prices.
pub fn snapshot_with_prices(slug: &str, prices: Vec<f64>) -> EventSummary {
    EventSummary {
        id: format!("id-{slug}"),
        slug: slug.into(),
        title: format!("Snapshot for {slug}"),
        created_at: None,
        end_date: None,
        volume: 1_000.0,
        liquidity: 500.0,
        markets: vec![MarketSummary {
            question: format!("Question for {slug}"),
            outcomes: prices.iter().map(|_| "Outcome".to_string()).collect(),
            outcome_prices: prices,
        }],
    }
}
