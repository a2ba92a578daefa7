//! SQLite store implementation.
//!
//! Persists users, filters, watchlists, alerts, the seen-events dedup set,
//! the news cache, and the posted-events log using Diesel. Timestamps are
//! stored as RFC 3339 text.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::adapter::sqlite::database::connection::DbPool;
use crate::adapter::sqlite::database::model::{
    AlertRow, NewAlertRow, NewCategoryRow, NewKeywordRow, NewPostedEventRow, NewSeenEventRow,
    NewWatchlistRow, NewsCacheRow, UserRow,
};
use crate::adapter::sqlite::database::schema::{
    keywords, news_cache, posted_events, price_alerts, seen_events, user_categories, users,
    watchlist,
};
use crate::domain::{AlertCondition, NewAlert, PostedEventRecord, PriceAlert, User};
use crate::error::{Error, Result};
use crate::port::Store;

/// Interval assigned to users created before they pick one.
const DEFAULT_NEWS_INTERVAL_SECS: i64 = 300;

/// News-cache previews keep only this many leading characters.
const PREVIEW_LEN: usize = 500;

type PooledConn =
    diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>;

/// SQLite-backed store.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConn> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    fn db_err(e: diesel::result::Error) -> Error {
        Error::Database(e.to_string())
    }

    fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Parse(e.to_string()))
    }

    fn user_from_row(row: UserRow) -> Result<User> {
        Ok(User {
            telegram_id: row.telegram_id,
            is_paused: row.is_paused,
            news_interval_secs: row.news_interval_secs,
            created_at: Self::parse_timestamp(&row.created_at)?,
        })
    }

    fn alert_from_row(row: AlertRow) -> Result<PriceAlert> {
        let condition: AlertCondition = row.condition.parse().map_err(Error::Parse)?;
        Ok(PriceAlert {
            id: i64::from(row.id),
            event_slug: row.event_slug,
            condition,
            threshold: row.threshold,
            outcome_index: row.outcome_index.max(0) as usize,
            is_triggered: row.is_triggered,
            created_at: Self::parse_timestamp(&row.created_at)?,
            triggered_at: row
                .triggered_at
                .as_deref()
                .map(Self::parse_timestamp)
                .transpose()?,
        })
    }

    fn load_user(conn: &mut SqliteConnection, user_id: i64) -> Result<Option<UserRow>> {
        users::table
            .find(user_id)
            .first::<UserRow>(conn)
            .optional()
            .map_err(Self::db_err)
    }

    fn truncate_chars(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_or_create_user(&self, user_id: i64) -> Result<(User, bool)> {
        let mut conn = self.conn()?;

        if let Some(row) = Self::load_user(&mut conn, user_id)? {
            return Ok((Self::user_from_row(row)?, false));
        }

        let row = UserRow {
            telegram_id: user_id,
            is_paused: false,
            news_interval_secs: DEFAULT_NEWS_INTERVAL_SECS,
            created_at: Utc::now().to_rfc3339(),
        };
        diesel::insert_or_ignore_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(Self::db_err)?;

        Ok((Self::user_from_row(row)?, true))
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        Self::load_user(&mut conn, user_id)?
            .map(Self::user_from_row)
            .transpose()
    }

    async fn active_users(&self) -> Result<Vec<User>> {
        let mut conn = self.conn()?;
        let rows: Vec<UserRow> = users::table
            .filter(users::is_paused.eq(false))
            .load(&mut conn)
            .map_err(Self::db_err)?;
        rows.into_iter().map(Self::user_from_row).collect()
    }

    async fn set_user_paused(&self, user_id: i64, paused: bool) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.find(user_id))
            .set(users::is_paused.eq(paused))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(updated > 0)
    }

    async fn set_user_interval(&self, user_id: i64, interval_secs: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.find(user_id))
            .set(users::news_interval_secs.eq(interval_secs))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(updated > 0)
    }

    async fn user_keywords(&self, user_id: i64) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        keywords::table
            .filter(keywords::user_id.eq(user_id))
            .order(keywords::id.asc())
            .select(keywords::keyword)
            .load(&mut conn)
            .map_err(Self::db_err)
    }

    async fn set_user_keywords(&self, user_id: i64, new_keywords: &[String]) -> Result<bool> {
        let mut conn = self.conn()?;
        if Self::load_user(&mut conn, user_id)?.is_none() {
            return Ok(false);
        }

        let rows: Vec<NewKeywordRow> = new_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|keyword| NewKeywordRow { user_id, keyword })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(keywords::table.filter(keywords::user_id.eq(user_id)))
                .execute(conn)?;
            if !rows.is_empty() {
                diesel::insert_or_ignore_into(keywords::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(Self::db_err)?;

        Ok(true)
    }

    async fn clear_user_keywords(&self, user_id: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        diesel::delete(keywords::table.filter(keywords::user_id.eq(user_id)))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(true)
    }

    async fn user_categories(&self, user_id: i64) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        user_categories::table
            .filter(user_categories::user_id.eq(user_id))
            .order(user_categories::id.asc())
            .select(user_categories::category)
            .load(&mut conn)
            .map_err(Self::db_err)
    }

    async fn set_user_categories(&self, user_id: i64, categories: &[String]) -> Result<bool> {
        let mut conn = self.conn()?;
        if Self::load_user(&mut conn, user_id)?.is_none() {
            return Ok(false);
        }

        let rows: Vec<NewCategoryRow> = categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .map(|category| NewCategoryRow { user_id, category })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(user_categories::table.filter(user_categories::user_id.eq(user_id)))
                .execute(conn)?;
            if !rows.is_empty() {
                diesel::insert_or_ignore_into(user_categories::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(Self::db_err)?;

        Ok(true)
    }

    async fn clear_user_categories(&self, user_id: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        diesel::delete(user_categories::table.filter(user_categories::user_id.eq(user_id)))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(true)
    }

    async fn user_watchlist(&self, user_id: i64) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        watchlist::table
            .filter(watchlist::user_id.eq(user_id))
            .order(watchlist::id.asc())
            .select(watchlist::event_slug)
            .load(&mut conn)
            .map_err(Self::db_err)
    }

    async fn add_to_watchlist(&self, user_id: i64, slug: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        if Self::load_user(&mut conn, user_id)?.is_none() {
            return Ok(false);
        }

        let row = NewWatchlistRow {
            user_id,
            event_slug: slug.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        let inserted = diesel::insert_or_ignore_into(watchlist::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(inserted > 0)
    }

    async fn remove_from_watchlist(&self, user_id: i64, slug: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            watchlist::table
                .filter(watchlist::user_id.eq(user_id))
                .filter(watchlist::event_slug.eq(slug)),
        )
        .execute(&mut conn)
        .map_err(Self::db_err)?;
        Ok(deleted > 0)
    }

    async fn watched_slugs_by_user(&self) -> Result<HashMap<i64, Vec<String>>> {
        let mut conn = self.conn()?;
        let rows: Vec<(i64, String)> = watchlist::table
            .order(watchlist::id.asc())
            .select((watchlist::user_id, watchlist::event_slug))
            .load(&mut conn)
            .map_err(Self::db_err)?;

        let mut by_user: HashMap<i64, Vec<String>> = HashMap::new();
        for (user_id, slug) in rows {
            by_user.entry(user_id).or_default().push(slug);
        }
        Ok(by_user)
    }

    async fn user_alerts(&self, user_id: i64) -> Result<Vec<PriceAlert>> {
        let mut conn = self.conn()?;
        let rows: Vec<AlertRow> = price_alerts::table
            .filter(price_alerts::user_id.eq(user_id))
            .order(price_alerts::id.asc())
            .load(&mut conn)
            .map_err(Self::db_err)?;
        rows.into_iter().map(Self::alert_from_row).collect()
    }

    async fn add_alert(&self, user_id: i64, alert: &NewAlert) -> Result<bool> {
        let mut conn = self.conn()?;
        if Self::load_user(&mut conn, user_id)?.is_none() {
            return Ok(false);
        }

        let row = NewAlertRow {
            user_id,
            event_slug: alert.event_slug.clone(),
            condition: alert.condition.as_str().to_string(),
            threshold: alert.threshold,
            outcome_index: alert.outcome_index as i32,
            created_at: Utc::now().to_rfc3339(),
        };
        let inserted = diesel::insert_or_ignore_into(price_alerts::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(inserted > 0)
    }

    async fn remove_alert_at(&self, user_id: i64, index: usize) -> Result<bool> {
        let mut conn = self.conn()?;
        let ids: Vec<i32> = price_alerts::table
            .filter(price_alerts::user_id.eq(user_id))
            .order(price_alerts::id.asc())
            .select(price_alerts::id)
            .load(&mut conn)
            .map_err(Self::db_err)?;

        let Some(&alert_id) = ids.get(index) else {
            return Ok(false);
        };

        diesel::delete(price_alerts::table.find(alert_id))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(true)
    }

    async fn active_alerts(&self) -> Result<Vec<(i64, PriceAlert)>> {
        let mut conn = self.conn()?;
        let rows: Vec<AlertRow> = price_alerts::table
            .filter(price_alerts::is_triggered.eq(false))
            .order(price_alerts::id.asc())
            .load(&mut conn)
            .map_err(Self::db_err)?;

        rows.into_iter()
            .map(|row| {
                let user_id = row.user_id;
                Self::alert_from_row(row).map(|alert| (user_id, alert))
            })
            .collect()
    }

    async fn mark_alert_triggered(&self, alert_id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::update(price_alerts::table.find(alert_id as i32))
            .set((
                price_alerts::is_triggered.eq(true),
                price_alerts::triggered_at.eq(Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .map_err(Self::db_err)?;
        Ok(())
    }

    async fn is_event_seen(&self, event_id: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let found: Option<i32> = seen_events::table
            .filter(seen_events::event_id.eq(event_id))
            .select(seen_events::id)
            .first(&mut conn)
            .optional()
            .map_err(Self::db_err)?;
        Ok(found.is_some())
    }

    async fn seen_event_count(&self) -> Result<i64> {
        let mut conn = self.conn()?;
        seen_events::table
            .count()
            .get_result(&mut conn)
            .map_err(Self::db_err)
    }

    async fn record_seen_events(&self, event_ids: &[String], cap: i64) -> Result<usize> {
        let mut conn = self.conn()?;
        let first_seen_at = Utc::now().to_rfc3339();
        let rows: Vec<NewSeenEventRow> = event_ids
            .iter()
            .map(|event_id| NewSeenEventRow {
                event_id: event_id.clone(),
                first_seen_at: first_seen_at.clone(),
            })
            .collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            if !rows.is_empty() {
                diesel::insert_or_ignore_into(seen_events::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            let count: i64 = seen_events::table.count().get_result(conn)?;
            if count <= cap {
                return Ok(0);
            }

            let victims: Vec<i32> = seen_events::table
                .order((seen_events::first_seen_at.asc(), seen_events::id.asc()))
                .limit(count - cap)
                .select(seen_events::id)
                .load(conn)?;

            diesel::delete(seen_events::table.filter(seen_events::id.eq_any(&victims)))
                .execute(conn)
        })
        .map_err(Self::db_err)
    }

    async fn update_news_cache(
        &self,
        slug: &str,
        context_hash: &str,
        preview: &str,
    ) -> Result<bool> {
        let mut conn = self.conn()?;

        let existing: Option<NewsCacheRow> = news_cache::table
            .find(slug)
            .first(&mut conn)
            .optional()
            .map_err(Self::db_err)?;

        let changed = match &existing {
            Some(row) if row.context_hash == context_hash => return Ok(false),
            Some(_) => true,
            // First sighting caches silently.
            None => false,
        };

        let row = NewsCacheRow {
            event_slug: slug.to_string(),
            context_hash: context_hash.to_string(),
            context_preview: Some(Self::truncate_chars(preview, PREVIEW_LEN)),
            updated_at: Utc::now().to_rfc3339(),
        };
        diesel::replace_into(news_cache::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(Self::db_err)?;

        Ok(changed)
    }

    async fn append_posted_event(&self, record: &PostedEventRecord, cap: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let row = NewPostedEventRow {
            event_id: record.event_id.clone(),
            event_slug: record.event_slug.clone(),
            title: record.title.clone(),
            volume: Some(record.volume),
            liquidity: Some(record.liquidity),
            posted_at: Utc::now().to_rfc3339(),
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(posted_events::table)
                .values(&row)
                .execute(conn)?;

            let count: i64 = posted_events::table.count().get_result(conn)?;
            if count <= cap {
                return Ok(());
            }

            let victims: Vec<i32> = posted_events::table
                .order((posted_events::posted_at.asc(), posted_events::id.asc()))
                .limit(count - cap)
                .select(posted_events::id)
                .load(conn)?;

            diesel::delete(posted_events::table.filter(posted_events::id.eq_any(&victims)))
                .execute(conn)?;
            Ok(())
        })
        .map_err(Self::db_err)
    }
}
