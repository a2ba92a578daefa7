//! Application wiring and lifecycle.

use std::sync::Arc;

use teloxide::Bot;
use tracing::info;

use crate::adapter::polymarket::PolymarketClient;
use crate::adapter::sqlite::database::{create_pool, run_migrations};
use crate::adapter::sqlite::SqliteStore;
use crate::adapter::telegram::{run_command_listener, BotControl, TelegramDispatcher};
use crate::config::Config;
use crate::error::Result;
use crate::monitor::{AlertMonitor, ContextMonitor, EventDiscoveryMonitor};
use crate::port::{Clock, Dispatcher, MarketGateway, Store, SystemClock};

/// Main application orchestrator.
pub struct App;

impl App {
    /// Build all collaborators, start the monitors, and serve bot commands
    /// until shutdown. Monitors are stopped cleanly on the way out.
    pub async fn run(config: Config) -> Result<()> {
        let pool = create_pool(&config.database.url)?;
        run_migrations(&pool)?;
        info!(database = %config.database.url, "Database ready");

        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
        let gateway: Arc<dyn MarketGateway> =
            Arc::new(PolymarketClient::from_config(&config.polymarket));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let bot = Bot::new(config.telegram.bot_token.clone());
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(TelegramDispatcher::new(
            bot.clone(),
            config.telegram.channel_id,
        ));

        let discovery = Arc::new(EventDiscoveryMonitor::new(
            store.clone(),
            gateway.clone(),
            dispatcher.clone(),
            clock.clone(),
            config.monitor.clone(),
        ));
        let alerts = Arc::new(AlertMonitor::new(
            store.clone(),
            gateway.clone(),
            dispatcher.clone(),
            config.monitor.clone(),
        ));
        let context = Arc::new(ContextMonitor::new(
            store.clone(),
            gateway.clone(),
            dispatcher.clone(),
            clock.clone(),
            config.monitor.clone(),
        ));

        let handles = vec![discovery.start(), alerts.start(), context.start()];
        info!("Monitors started");

        let control = Arc::new(BotControl::new(
            store,
            gateway,
            config.monitor.min_news_interval_secs,
        ));

        // Blocks until the process is asked to shut down.
        run_command_listener(bot, control).await;

        for handle in handles {
            handle.stop().await;
        }

        Ok(())
    }
}
