//! Gamma API response payloads.
//!
//! The Gamma API is loose with types: numeric fields arrive as numbers or
//! strings, and `outcomes`/`outcomePrices` arrive either as JSON arrays or
//! as JSON arrays encoded inside a string. The deserializers here accept
//! all of these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{EventSummary, MarketSummary};

/// An event as returned by the Gamma `/events` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaEvent {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub volume: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub liquidity: f64,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

/// A market inside a Gamma event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default)]
    pub question: String,
    #[serde(default, deserialize_with = "de_string_list")]
    pub outcomes: Vec<String>,
    #[serde(default, deserialize_with = "de_price_list")]
    pub outcome_prices: Vec<f64>,
}

impl GammaEvent {
    /// Convert into the domain event type, preferring `createdAt` over
    /// `startDate` for the creation timestamp.
    pub fn into_event(self) -> EventSummary {
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_iso)
            .or_else(|| self.start_date.as_deref().and_then(parse_iso));
        let end_date = self.end_date.as_deref().and_then(parse_iso);

        EventSummary {
            id: self.id,
            slug: self.slug,
            title: self.title,
            created_at,
            end_date,
            volume: self.volume,
            liquidity: self.liquidity,
            markets: self
                .markets
                .into_iter()
                .map(|market| MarketSummary {
                    question: market.question,
                    outcomes: market.outcomes,
                    outcome_prices: market.outcome_prices,
                })
                .collect(),
        }
    }
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn de_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = unpack_list(Value::deserialize(deserializer)?);
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

fn de_price_list<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = unpack_list(Value::deserialize(deserializer)?);
    // A malformed entry becomes NaN rather than being dropped, so the
    // positions of later outcomes stay aligned with their indices. NaN
    // never satisfies an alert condition.
    Ok(items
        .iter()
        .map(|item| value_to_f64(item).unwrap_or(f64::NAN))
        .collect())
}

/// A JSON array, possibly encoded inside a string.
fn unpack_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::String(s) => serde_json::from_str::<Vec<Value>>(&s).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_encoded_price_arrays() {
        let market: GammaMarket = serde_json::from_str(
            r#"{"question": "Will it happen?", "outcomes": "[\"Yes\", \"No\"]", "outcomePrices": "[\"0.75\", \"0.25\"]"}"#,
        )
        .unwrap();

        assert_eq!(market.outcomes, vec!["Yes", "No"]);
        assert_eq!(market.outcome_prices, vec![0.75, 0.25]);
    }

    #[test]
    fn parses_plain_price_arrays() {
        let market: GammaMarket = serde_json::from_str(
            r#"{"question": "Q", "outcomes": ["Yes", "No"], "outcomePrices": [0.6, 0.4]}"#,
        )
        .unwrap();

        assert_eq!(market.outcome_prices, vec![0.6, 0.4]);
    }

    #[test]
    fn malformed_price_entry_becomes_nan_without_shifting() {
        let market: GammaMarket = serde_json::from_str(
            r#"{"question": "Q", "outcomePrices": ["0.6", "oops", "0.1"]}"#,
        )
        .unwrap();

        assert_eq!(market.outcome_prices.len(), 3);
        assert!(market.outcome_prices[1].is_nan());
        assert_eq!(market.outcome_prices[2], 0.1);
    }

    #[test]
    fn numeric_id_and_string_volume_are_accepted() {
        let event: GammaEvent = serde_json::from_str(
            r#"{"id": 12345, "slug": "btc-2026", "title": "BTC", "volume": "9001.5"}"#,
        )
        .unwrap();

        assert_eq!(event.id, "12345");
        assert_eq!(event.volume, 9001.5);
    }

    #[test]
    fn into_event_prefers_created_at_over_start_date() {
        let event: GammaEvent = serde_json::from_str(
            r#"{"id": "1", "createdAt": "2026-01-02T00:00:00Z", "startDate": "2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let domain = event.into_event();
        assert_eq!(domain.created_at.unwrap().to_rfc3339(), "2026-01-02T00:00:00+00:00");
    }

    #[test]
    fn into_event_falls_back_to_start_date() {
        let event: GammaEvent = serde_json::from_str(
            r#"{"id": "1", "startDate": "2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(event.into_event().created_at.is_some());
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let event: GammaEvent =
            serde_json::from_str(r#"{"id": "1", "createdAt": "not-a-date"}"#).unwrap();
        assert!(event.into_event().created_at.is_none());
    }
}
