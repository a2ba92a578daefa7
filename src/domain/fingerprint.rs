//! Commentary fingerprinting.
//!
//! The market-context endpoint returns AI-generated prose that gets
//! paraphrased between fetches even when nothing substantive changed.
//! The fingerprint normalizes the text before hashing so that swapped
//! time references ("today" vs "yesterday") and filler words do not
//! register as content changes, while a genuinely new sentence does.

use sha2::{Digest, Sha256};

/// Words that shift with the calendar and carry no content.
const TIME_WORDS: &[&str] = &["today", "yesterday", "recently", "currently"];

/// Two-word time phrases, checked against consecutive tokens.
const TIME_PHRASES: &[(&str, &str)] = &[("this", "week"), ("last", "week")];

/// Common filler words stripped before hashing.
const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "has", "have", "had", "been", "being",
];

/// Only this many leading characters of the normalized text are hashed;
/// the tail of the commentary is boilerplate that churns freely.
const PREFIX_LEN: usize = 200;

/// Fingerprint of a piece of commentary, as a hex-encoded SHA-256 digest.
pub fn fingerprint(context: &str) -> String {
    let normalized = normalize(context);
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}

fn normalize(context: &str) -> String {
    let lowered = context.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(words.len());

    let mut i = 0;
    while i < words.len() {
        if i + 1 < words.len() {
            let pair = (bare_word(words[i]), bare_word(words[i + 1]));
            if TIME_PHRASES.contains(&pair) {
                i += 2;
                continue;
            }
        }

        let word = bare_word(words[i]);
        if !TIME_WORDS.contains(&word) && !FILLER_WORDS.contains(&word) {
            kept.push(words[i]);
        }
        i += 1;
    }

    truncate_chars(&kept.join(" "), PREFIX_LEN)
}

/// Token stripped of leading/trailing punctuation, for stopword comparison.
fn bare_word(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_identical_fingerprint() {
        let text = "The market moved sharply after the announcement.";
        assert_eq!(fingerprint(text), fingerprint(text));
    }

    #[test]
    fn time_word_swaps_do_not_change_fingerprint() {
        let a = "Prices rose today as traders repositioned.";
        let b = "Prices rose yesterday as traders repositioned.";
        assert_eq!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn time_phrases_are_stripped() {
        let a = "Volume spiked this week before settling.";
        let b = "Volume spiked last week before settling.";
        assert_eq!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn filler_word_variations_do_not_change_fingerprint() {
        let a = "The outcome is uncertain and the polls are tight.";
        let b = "Outcome was uncertain and polls were tight.";
        assert_eq!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn whitespace_and_case_are_normalized() {
        let a = "Market  Context:\n  traders expect  volatility.";
        let b = "market context: traders expect volatility.";
        assert_eq!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn substantive_change_changes_fingerprint() {
        let a = "Polls show a narrow lead for the incumbent.";
        let b = "Polls show a narrow lead for the incumbent. A recount was announced.";
        assert_ne!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn changes_past_the_prefix_are_ignored() {
        let prefix = "word ".repeat(60);
        let a = format!("{prefix}ending one");
        let b = format!("{prefix}ending two");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn punctuation_does_not_shield_stopwords() {
        let a = "Traders repositioned today, fearing losses.";
        let b = "Traders repositioned yesterday, fearing losses.";
        assert_eq!(fingerprint(a), fingerprint(b));
    }
}
