//! End-to-end tests for the context monitor: fingerprint change detection,
//! silent first sightings, per-user pacing, and status aggregation.

mod harness;

use std::sync::Arc;

use polywatch::adapter::sqlite::SqliteStore;
use polywatch::config::MonitorConfig;
use polywatch::monitor::ContextMonitor;
use polywatch::port::Store;

use harness::manual_clock::ManualClock;
use harness::recording_dispatcher::RecordingDispatcher;
use harness::scripted_gateway::ScriptedGateway;
use harness::temp_db::TempDb;

struct Rig {
    _db: TempDb,
    store: Arc<dyn Store>,
    gateway: Arc<ScriptedGateway>,
    dispatcher: RecordingDispatcher,
    clock: Arc<ManualClock>,
    monitor: Arc<ContextMonitor>,
}

fn config() -> MonitorConfig {
    MonitorConfig {
        context_fetch_delay_ms: 0,
        default_news_interval_secs: 300,
        min_news_interval_secs: 180,
        ..MonitorConfig::default()
    }
}

fn rig() -> Rig {
    let db = TempDb::create();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool().clone()));
    let gateway = Arc::new(ScriptedGateway::new());
    let dispatcher = RecordingDispatcher::new();
    let clock = Arc::new(ManualClock::new());

    let monitor = Arc::new(ContextMonitor::new(
        store.clone(),
        gateway.clone(),
        Arc::new(dispatcher.clone()),
        clock.clone(),
        config(),
    ));

    Rig {
        _db: db,
        store,
        gateway,
        dispatcher,
        clock,
        monitor,
    }
}

async fn watch(rig: &Rig, user_id: i64, slug: &str) {
    rig.store.get_or_create_user(user_id).await.unwrap();
    rig.store.add_to_watchlist(user_id, slug).await.unwrap();
}

#[tokio::test]
async fn first_sighting_caches_silently() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    rig.gateway.set_context("btc-2026", "Initial commentary about the market.");

    rig.monitor.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Watchlist Status"));
    assert!(messages[0].contains("No new updates"));
    assert!(!messages[0].contains("New Update:"));
}

#[tokio::test]
async fn identical_commentary_never_reports_a_change() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    rig.gateway.set_context("btc-2026", "Stable commentary that does not move.");

    rig.monitor.run_cycle().await.unwrap();
    rig.clock.advance_secs(301);
    rig.monitor.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 2);
    assert!(!messages[1].contains("New Update:"));
}

#[tokio::test]
async fn swapped_time_words_do_not_count_as_changes() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;

    rig.gateway
        .set_context("btc-2026", "Prices moved sharply today as traders repositioned.");
    rig.monitor.run_cycle().await.unwrap();

    rig.clock.advance_secs(301);
    rig.gateway
        .set_context("btc-2026", "Prices moved sharply yesterday as traders repositioned.");
    rig.monitor.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 2);
    assert!(!messages[1].contains("New Update:"));
    assert!(messages[1].contains("No new updates"));
}

#[tokio::test]
async fn substantive_change_appears_as_exactly_one_update() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    watch(&rig, 1, "election-2028").await;

    rig.gateway.set_context("btc-2026", "Commentary that will change materially.");
    rig.gateway.set_context("election-2028", "Commentary that stays the same.");
    rig.monitor.run_cycle().await.unwrap();

    rig.clock.advance_secs(301);
    rig.gateway.set_context(
        "btc-2026",
        "Commentary that will change materially. A major fund took a large position.",
    );
    rig.monitor.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 2);
    let status = &messages[1];
    assert_eq!(status.matches("New Update:").count(), 1);
    assert!(status.contains("btc-2026"));
    assert!(status.contains("<b>election-2028</b> - No new updates"));
}

#[tokio::test]
async fn users_are_paced_by_their_interval() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    rig.gateway.set_context("btc-2026", "Some commentary.");

    // First tick: no last-checked record, immediately due.
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 1);

    // Next tick, no time passed: skipped.
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 1);

    // Still inside the default 300s interval: skipped.
    rig.clock.advance_secs(299);
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 1);

    // Interval elapsed: due again.
    rig.clock.advance_secs(2);
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 2);
}

#[tokio::test]
async fn short_user_intervals_are_floored_at_the_minimum() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    // 60s requested, but the configured minimum is 180s.
    rig.store.set_user_interval(1, 60).await.unwrap();
    rig.gateway.set_context("btc-2026", "Some commentary.");

    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 1);

    rig.clock.advance_secs(61);
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 1);

    rig.clock.advance_secs(120);
    rig.monitor.run_cycle().await.unwrap();
    assert_eq!(rig.dispatcher.messages_for(1).len(), 2);
}

#[tokio::test]
async fn fetch_failure_is_reported_as_no_update() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;

    rig.gateway.set_context("btc-2026", "Commentary present at first.");
    rig.monitor.run_cycle().await.unwrap();

    rig.clock.advance_secs(301);
    rig.gateway.clear_context("btc-2026");
    rig.monitor.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("No new updates"));
    assert!(!messages[1].contains("New Update:"));
}

#[tokio::test]
async fn users_without_watchlists_get_no_status() {
    let rig = rig();
    rig.store.get_or_create_user(1).await.unwrap();

    rig.monitor.run_cycle().await.unwrap();
    assert!(rig.dispatcher.user_messages().is_empty());
}

#[tokio::test]
async fn restart_makes_users_due_without_duplicate_change_reports() {
    let rig = rig();
    watch(&rig, 1, "btc-2026").await;
    rig.gateway.set_context("btc-2026", "Commentary before the restart.");
    rig.monitor.run_cycle().await.unwrap();

    // A fresh monitor instance loses the in-memory pacing state but not
    // the persisted fingerprints.
    let restarted = Arc::new(ContextMonitor::new(
        rig.store.clone(),
        rig.gateway.clone(),
        Arc::new(rig.dispatcher.clone()),
        rig.clock.clone(),
        config(),
    ));
    restarted.run_cycle().await.unwrap();

    let messages = rig.dispatcher.messages_for(1);
    assert_eq!(messages.len(), 2);
    assert!(!messages[1].contains("New Update:"));
}
