//! Outbound adapters: Polymarket REST gateway, Telegram dispatcher and
//! command handling, SQLite store.

pub mod polymarket;
pub mod sqlite;
pub mod telegram;
