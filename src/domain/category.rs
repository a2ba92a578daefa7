//! Fixed event categories and their keyword dictionaries.

/// Category names with the keywords that place an event in them.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "crypto",
        &[
            "btc",
            "bitcoin",
            "eth",
            "ethereum",
            "crypto",
            "solana",
            "xrp",
            "blockchain",
            "defi",
            "nft",
            "token",
            "coin",
            "doge",
            "bnb",
            "ada",
            "dot",
        ],
    ),
    (
        "politics",
        &[
            "election",
            "president",
            "senate",
            "congress",
            "vote",
            "trump",
            "biden",
            "political",
            "government",
            "democrat",
            "republican",
            "governor",
        ],
    ),
    (
        "sports",
        &[
            "nfl",
            "nba",
            "mlb",
            "nhl",
            "football",
            "basketball",
            "baseball",
            "hockey",
            "soccer",
            "vs.",
            "vs",
            "game",
            "match",
            "championship",
            "super bowl",
            "ufc",
            "boxing",
        ],
    ),
    (
        "finance",
        &[
            "stock",
            "market",
            "fed",
            "rate",
            "inflation",
            "gdp",
            "economy",
            "treasury",
            "dollar",
            "recession",
            "s&p",
            "nasdaq",
            "dow",
        ],
    ),
    (
        "tech",
        &[
            "ai",
            "apple",
            "google",
            "meta",
            "tesla",
            "microsoft",
            "amazon",
            "tech",
            "software",
            "app",
            "nvidia",
            "openai",
        ],
    ),
    (
        "entertainment",
        &[
            "movie",
            "oscar",
            "grammy",
            "emmy",
            "celebrity",
            "actor",
            "music",
            "album",
            "box office",
        ],
    ),
];

/// Keywords for a category name, if it exists.
pub fn keywords_for(category: &str) -> Option<&'static [&'static str]> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, keywords)| *keywords)
}

/// Whether `category` is one of the known category names.
pub fn is_known_category(category: &str) -> bool {
    keywords_for(category).is_some()
}

/// All known category names.
pub fn category_names() -> Vec<&'static str> {
    CATEGORY_KEYWORDS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_keywords_include_btc() {
        let keywords = keywords_for("crypto").unwrap();
        assert!(keywords.contains(&"btc"));
        assert!(keywords.contains(&"ethereum"));
    }

    #[test]
    fn unknown_category_has_no_keywords() {
        assert!(keywords_for("weather").is_none());
        assert!(!is_known_category("weather"));
    }

    #[test]
    fn names_cover_all_dictionaries() {
        let names = category_names();
        assert_eq!(names.len(), CATEGORY_KEYWORDS.len());
        assert!(names.contains(&"politics"));
        assert!(names.contains(&"entertainment"));
    }
}
