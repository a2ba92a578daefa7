//! Telegram command parsing and input validation.

use std::fmt;

use url::Url;

use crate::domain::AlertCondition;

pub const MAX_KEYWORDS: usize = 20;
pub const MAX_KEYWORD_LENGTH: usize = 50;
pub const MIN_KEYWORD_LENGTH: usize = 2;
pub const MIN_SLUG_LENGTH: usize = 3;
pub const MAX_SLUG_LENGTH: usize = 200;
pub const MIN_INTERVAL_MINUTES: i64 = 3;
pub const MAX_INTERVAL_MINUTES: i64 = 1440;

/// Supported bot commands.
///
/// Argument-less variants of commands that need input (`Watch { target:
/// None }` etc.) render usage help instead of failing the parse.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    Start,
    Help,
    Pause,
    Resume,
    Watch { target: Option<String> },
    Unwatch { slug: Option<String> },
    Watchlist,
    Interval { minutes: Option<i64> },
    Alert { spec: Option<AlertSpec> },
    Alerts,
    RemoveAlert { number: Option<usize> },
    Keywords { input: Option<String> },
    Category { input: Option<String> },
    Categories,
}

/// Parsed arguments of an /alert command.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSpec {
    pub slug: String,
    pub condition: AlertCondition,
    pub threshold: f64,
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    InvalidArgument(String),
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::InvalidArgument(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Commands registered with Telegram for the "/" menu.
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Subscribe to notifications"),
        ("watch", "Add event to watchlist"),
        ("watchlist", "Show your watchlist"),
        ("unwatch", "Remove event from watchlist"),
        ("interval", "Set update interval"),
        ("alert", "Set price alert"),
        ("alerts", "Show price alerts"),
        ("rmalert", "Remove price alert"),
        ("keywords", "Set keyword filters"),
        ("category", "Set category filters"),
        ("categories", "Show categories"),
        ("pause", "Pause notifications"),
        ("resume", "Resume notifications"),
        ("help", "Show help"),
    ]
}

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<BotCommand, CommandParseError> {
    let trimmed = text.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(BotCommand::Start),
        "/help" => Ok(BotCommand::Help),
        "/pause" => Ok(BotCommand::Pause),
        "/resume" => Ok(BotCommand::Resume),
        "/watch" => Ok(BotCommand::Watch {
            target: rest.map(str::to_string),
        }),
        "/unwatch" => Ok(BotCommand::Unwatch {
            slug: rest.map(|s| s.to_lowercase()),
        }),
        "/watchlist" => Ok(BotCommand::Watchlist),
        "/interval" => parse_interval(rest),
        "/alert" => parse_alert(rest),
        "/alerts" => Ok(BotCommand::Alerts),
        "/rmalert" => parse_rmalert(rest),
        "/keywords" => Ok(BotCommand::Keywords {
            input: rest.map(str::to_string),
        }),
        "/category" => Ok(BotCommand::Category {
            input: rest.map(str::to_string),
        }),
        "/categories" => Ok(BotCommand::Categories),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_interval(rest: Option<&str>) -> Result<BotCommand, CommandParseError> {
    let Some(rest) = rest else {
        return Ok(BotCommand::Interval { minutes: None });
    };

    let minutes: i64 = rest.split_whitespace().next().unwrap_or(rest).parse().map_err(|_| {
        CommandParseError::InvalidArgument("Please provide a valid number of minutes.".into())
    })?;

    if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        return Err(CommandParseError::InvalidArgument(format!(
            "Minimum interval is {MIN_INTERVAL_MINUTES} minutes.\n\nExample: /interval {MIN_INTERVAL_MINUTES}"
        )));
    }

    Ok(BotCommand::Interval {
        minutes: Some(minutes),
    })
}

fn parse_alert(rest: Option<&str>) -> Result<BotCommand, CommandParseError> {
    let Some(rest) = rest else {
        return Ok(BotCommand::Alert { spec: None });
    };

    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < 3 {
        return Ok(BotCommand::Alert { spec: None });
    }

    let slug = parts[0].to_lowercase();
    if !is_valid_slug(&slug) {
        return Err(CommandParseError::InvalidArgument(
            "Invalid slug format (use alphanumeric and hyphens only)".into(),
        ));
    }

    let condition: AlertCondition = parts[1]
        .parse()
        .map_err(CommandParseError::InvalidArgument)?;

    let threshold: f64 = parts[2].parse().map_err(|_| {
        CommandParseError::InvalidArgument("Threshold must be a number between 0 and 100".into())
    })?;
    if !(0.0..=100.0).contains(&threshold) {
        return Err(CommandParseError::InvalidArgument(
            "Threshold must be a number between 0 and 100".into(),
        ));
    }

    Ok(BotCommand::Alert {
        spec: Some(AlertSpec {
            slug,
            condition,
            threshold,
        }),
    })
}

fn parse_rmalert(rest: Option<&str>) -> Result<BotCommand, CommandParseError> {
    let Some(rest) = rest else {
        return Ok(BotCommand::RemoveAlert { number: None });
    };

    let number: usize = rest
        .parse()
        .map_err(|_| CommandParseError::InvalidArgument("Invalid number".into()))?;

    Ok(BotCommand::RemoveAlert {
        number: Some(number),
    })
}

/// Whether `slug` is a well-formed event slug.
pub fn is_valid_slug(slug: &str) -> bool {
    (MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Extract an event slug from a Polymarket URL or a bare slug.
pub fn parse_event_target(input: &str) -> Option<String> {
    let input = input.trim();

    if input.contains("polymarket.com") {
        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{input}")
        };
        let url = Url::parse(&with_scheme).ok()?;
        let mut segments = url.path_segments()?;
        while let Some(segment) = segments.next() {
            if segment == "event" {
                let slug = segments.next()?.to_lowercase();
                return is_valid_slug(&slug).then_some(slug);
            }
        }
        return None;
    }

    let slug = input.to_lowercase();
    is_valid_slug(&slug).then_some(slug)
}

/// Split comma-separated keywords, preserving quoted phrases.
pub fn parse_keywords(input: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match c {
            '"' | '\'' => {
                match quote {
                    Some(q) if q == c => quote = None,
                    None => quote = Some(c),
                    Some(_) => {}
                }
                current.push(c);
            }
            ',' if quote.is_none() => {
                let keyword = current.trim().to_string();
                if !keyword.is_empty() {
                    keywords.push(keyword);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let keyword = current.trim().to_string();
    if !keyword.is_empty() {
        keywords.push(keyword);
    }

    keywords
}

/// Validate and normalize a keyword list. Returns an error message on the
/// first invalid keyword.
pub fn validate_keywords(keywords: &[String]) -> Result<Vec<String>, String> {
    if keywords.len() > MAX_KEYWORDS {
        return Err(format!("Too many keywords (max {MAX_KEYWORDS})"));
    }

    let mut validated = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        if keyword.chars().count() > MAX_KEYWORD_LENGTH {
            return Err(format!("Keyword too long (max {MAX_KEYWORD_LENGTH} chars)"));
        }
        if keyword.chars().count() < MIN_KEYWORD_LENGTH {
            return Err("Keyword too short (min 2 chars)".into());
        }
        let well_formed = keyword
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '"' | '\''));
        if !well_formed {
            return Err("Invalid characters in keyword".into());
        }
        validated.push(keyword.to_lowercase());
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("/start").unwrap(), BotCommand::Start);
        assert_eq!(parse_command("/watchlist").unwrap(), BotCommand::Watchlist);
        assert_eq!(parse_command("/pause").unwrap(), BotCommand::Pause);
    }

    #[test]
    fn strips_bot_name_suffix() {
        assert_eq!(parse_command("/start@polywatch_bot").unwrap(), BotCommand::Start);
    }

    #[test]
    fn non_commands_are_rejected() {
        assert_eq!(parse_command("hello").unwrap_err(), CommandParseError::NotACommand);
        assert!(matches!(
            parse_command("/frobnicate").unwrap_err(),
            CommandParseError::UnknownCommand(_)
        ));
    }

    #[test]
    fn watch_captures_target() {
        assert_eq!(
            parse_command("/watch btc-price-2026").unwrap(),
            BotCommand::Watch {
                target: Some("btc-price-2026".into())
            }
        );
        assert_eq!(parse_command("/watch").unwrap(), BotCommand::Watch { target: None });
    }

    #[test]
    fn alert_parses_slug_condition_threshold() {
        let parsed = parse_command("/alert btc-price-2026 > 70").unwrap();
        assert_eq!(
            parsed,
            BotCommand::Alert {
                spec: Some(AlertSpec {
                    slug: "btc-price-2026".into(),
                    condition: AlertCondition::Above,
                    threshold: 70.0,
                })
            }
        );
    }

    #[test]
    fn alert_rejects_out_of_range_threshold() {
        assert!(matches!(
            parse_command("/alert btc-2026 > 170").unwrap_err(),
            CommandParseError::InvalidArgument(_)
        ));
        assert!(matches!(
            parse_command("/alert btc-2026 >= 70").unwrap_err(),
            CommandParseError::InvalidArgument(_)
        ));
    }

    #[test]
    fn alert_with_missing_args_requests_usage() {
        assert_eq!(parse_command("/alert btc-2026").unwrap(), BotCommand::Alert { spec: None });
    }

    #[test]
    fn interval_validates_bounds() {
        assert_eq!(
            parse_command("/interval 10").unwrap(),
            BotCommand::Interval { minutes: Some(10) }
        );
        assert!(parse_command("/interval 1").is_err());
        assert!(parse_command("/interval 2000").is_err());
        assert!(parse_command("/interval soon").is_err());
    }

    #[test]
    fn event_target_accepts_urls_and_slugs() {
        assert_eq!(
            parse_event_target("https://polymarket.com/event/btc-price-2026").unwrap(),
            "btc-price-2026"
        );
        assert_eq!(
            parse_event_target("polymarket.com/event/BTC-Price-2026?tid=1").unwrap(),
            "btc-price-2026"
        );
        assert_eq!(parse_event_target("btc-price-2026").unwrap(), "btc-price-2026");
        assert!(parse_event_target("https://example.com/event/x").is_none());
        assert!(parse_event_target("not a slug!").is_none());
        assert!(parse_event_target("ab").is_none());
    }

    #[test]
    fn keywords_split_on_commas_preserving_phrases() {
        assert_eq!(
            parse_keywords(r#"btc, eth, "united states", election"#),
            vec!["btc", "eth", "\"united states\"", "election"]
        );
    }

    #[test]
    fn keyword_validation_normalizes_and_bounds() {
        let input = vec!["BTC".to_string(), "\"United States\"".to_string()];
        assert_eq!(
            validate_keywords(&input).unwrap(),
            vec!["btc", "\"united states\""]
        );

        assert!(validate_keywords(&["x".to_string()]).is_err());
        assert!(validate_keywords(&["y".repeat(51)]).is_err());
        assert!(validate_keywords(&["bad;chars".to_string()]).is_err());

        let too_many: Vec<String> = (0..21).map(|i| format!("kw{i}")).collect();
        assert!(validate_keywords(&too_many).is_err());
    }
}
