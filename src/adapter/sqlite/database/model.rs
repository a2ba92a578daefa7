//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{
    keywords, news_cache, posted_events, price_alerts, seen_events, user_categories, users,
    watchlist,
};

/// Database row for a user.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub telegram_id: i64,
    pub is_paused: bool,
    pub news_interval_secs: i64,
    pub created_at: String,
}

/// Database row for a seen event (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = seen_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SeenEventRow {
    pub id: i32,
    pub event_id: String,
    pub first_seen_at: String,
}

/// Database row for a seen event (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = seen_events)]
pub struct NewSeenEventRow {
    pub event_id: String,
    pub first_seen_at: String,
}

/// Database row for a keyword filter (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = keywords)]
pub struct NewKeywordRow {
    pub user_id: i64,
    pub keyword: String,
}

/// Database row for a category filter (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_categories)]
pub struct NewCategoryRow {
    pub user_id: i64,
    pub category: String,
}

/// Database row for a watchlist entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = watchlist)]
pub struct NewWatchlistRow {
    pub user_id: i64,
    pub event_slug: String,
    pub created_at: String,
}

/// Database row for a price alert (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = price_alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertRow {
    pub id: i32,
    pub user_id: i64,
    pub event_slug: String,
    pub condition: String,
    pub threshold: f64,
    pub outcome_index: i32,
    pub is_triggered: bool,
    pub created_at: String,
    pub triggered_at: Option<String>,
}

/// Database row for a price alert (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = price_alerts)]
pub struct NewAlertRow {
    pub user_id: i64,
    pub event_slug: String,
    pub condition: String,
    pub threshold: f64,
    pub outcome_index: i32,
    pub created_at: String,
}

/// Database row for a news-cache entry.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = news_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewsCacheRow {
    pub event_slug: String,
    pub context_hash: String,
    pub context_preview: Option<String>,
    pub updated_at: String,
}

/// Database row for a posted event (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = posted_events)]
pub struct NewPostedEventRow {
    pub event_id: String,
    pub event_slug: String,
    pub title: Option<String>,
    pub volume: Option<f64>,
    pub liquidity: Option<f64>,
    pub posted_at: String,
}
