//! Subscribed users.

use chrono::{DateTime, Utc};

/// A Telegram user subscribed to notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub telegram_id: i64,
    pub is_paused: bool,
    /// Seconds between watchlist status checks for this user.
    pub news_interval_secs: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Effective context-check interval, floored at the configured minimum.
    pub fn effective_interval(&self, default_secs: i64, min_secs: i64) -> i64 {
        let interval = if self.news_interval_secs > 0 {
            self.news_interval_secs
        } else {
            default_secs
        };
        interval.max(min_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(interval: i64) -> User {
        User {
            telegram_id: 1,
            is_paused: false,
            news_interval_secs: interval,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn effective_interval_uses_user_setting() {
        assert_eq!(user(600).effective_interval(300, 180), 600);
    }

    #[test]
    fn effective_interval_falls_back_to_default() {
        assert_eq!(user(0).effective_interval(300, 180), 300);
    }

    #[test]
    fn effective_interval_is_floored_at_minimum() {
        assert_eq!(user(60).effective_interval(300, 180), 180);
    }
}
