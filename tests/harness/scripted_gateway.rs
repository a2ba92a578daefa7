use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use polywatch::domain::EventSummary;
use polywatch::error::Result;
use polywatch::port::MarketGateway;

/// Gateway fake fed with scripted responses.
#[derive(Default)]
pub struct ScriptedGateway {
    recent: Mutex<Vec<EventSummary>>,
    snapshots: Mutex<HashMap<String, EventSummary>>,
    contexts: Mutex<HashMap<String, String>>,
    snapshot_fetches: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_recent(&self, events: Vec<EventSummary>) {
        *self.recent.lock().expect("lock recent") = events;
    }

    pub fn set_snapshot(&self, event: EventSummary) {
        self.snapshots
            .lock()
            .expect("lock snapshots")
            .insert(event.slug.clone(), event);
    }

    pub fn remove_snapshot(&self, slug: &str) {
        self.snapshots.lock().expect("lock snapshots").remove(slug);
    }

    pub fn set_context(&self, slug: &str, text: &str) {
        self.contexts
            .lock()
            .expect("lock contexts")
            .insert(slug.to_string(), text.to_string());
    }

    /// Make subsequent context fetches for `slug` fail.
    pub fn clear_context(&self, slug: &str) {
        self.contexts.lock().expect("lock contexts").remove(slug);
    }

    /// How many snapshot fetches the monitor has issued.
    pub fn snapshot_fetch_count(&self) -> usize {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketGateway for ScriptedGateway {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<EventSummary>> {
        let events = self.recent.lock().expect("lock recent").clone();
        Ok(events.into_iter().take(limit).collect())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<EventSummary>> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshots.lock().expect("lock snapshots").get(slug).cloned())
    }

    async fn fetch_context(&self, slug: &str) -> Option<String> {
        self.contexts.lock().expect("lock contexts").get(slug).cloned()
    }
}
