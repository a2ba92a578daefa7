//! Polywatch - prediction-market event tracking and notifications.
//!
//! A Telegram bot that tracks Polymarket events and notifies subscribed
//! users of new listings, watchlist commentary changes, and price-threshold
//! crossings.
//!
//! # Architecture
//!
//! Three independent schedulers form the core pipeline:
//!
//! - [`monitor::EventDiscoveryMonitor`] - finds genuinely-new events,
//!   dedups them against a persisted seen-set, and notifies users whose
//!   keyword/category filters match
//! - [`monitor::AlertMonitor`] - fires each price alert at most once when
//!   its threshold condition becomes true
//! - [`monitor::ContextMonitor`] - fingerprints watchlisted events'
//!   commentary per user-chosen interval and reports changes
//!
//! Each scheduler owns its state and is constructed with explicit handles
//! to the [`port`] traits, so tests drive cycles with fakes and an
//! injectable clock.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with env overrides for secrets
//! - [`domain`] - events, users, alerts, filters, and the fingerprint
//! - [`error`] - error types for the crate
//! - [`port`] - gateway/dispatcher/store/clock traits
//! - [`adapter`] - Polymarket REST client, Telegram bot, SQLite store
//! - [`monitor`] - the scheduler loops
//! - [`app`] - wiring and lifecycle

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod port;
