//! Per-user keyword and category filters for event delivery.
//!
//! Both filters OR their terms and treat an empty filter as match-all.

use crate::domain::category;
use crate::domain::event::EventSummary;

/// Whether the event passes the user's keyword filter.
///
/// Keywords match case-insensitively as substrings of the event title or
/// any market question. A keyword wrapped in single or double quotes
/// matches only as an exact phrase.
pub fn matches_keywords(event: &EventSummary, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }

    let searchable = event.searchable_text();

    keywords.iter().any(|keyword| {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }

        match phrase_of(keyword) {
            Some(phrase) => searchable.contains(&phrase.to_lowercase()),
            None => searchable.contains(&keyword.to_lowercase()),
        }
    })
}

/// Whether the event matches any of the user's category filters.
pub fn matches_categories(event: &EventSummary, categories: &[String]) -> bool {
    if categories.is_empty() {
        return true;
    }

    let searchable = event.searchable_text();

    categories.iter().any(|name| {
        category::keywords_for(&name.to_lowercase())
            .map(|keywords| keywords.iter().any(|keyword| searchable.contains(keyword)))
            .unwrap_or(false)
    })
}

/// The inner text of a quoted phrase keyword, or `None` for plain keywords.
fn phrase_of(keyword: &str) -> Option<&str> {
    let quoted = (keyword.starts_with('"') && keyword.ends_with('"'))
        || (keyword.starts_with('\'') && keyword.ends_with('\''));
    (quoted && keyword.len() >= 2).then(|| &keyword[1..keyword.len() - 1])
}
