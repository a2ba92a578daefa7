use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use polywatch::port::Dispatcher;

/// Thread-safe message collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    channel_enabled: bool,
    user_messages: Arc<Mutex<Vec<(i64, String)>>>,
    channel_messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher with a configured broadcast channel.
    pub fn with_channel() -> Self {
        Self {
            channel_enabled: true,
            ..Self::default()
        }
    }

    pub fn user_messages(&self) -> Vec<(i64, String)> {
        self.user_messages.lock().expect("lock user messages").clone()
    }

    pub fn channel_messages(&self) -> Vec<String> {
        self.channel_messages
            .lock()
            .expect("lock channel messages")
            .clone()
    }

    /// Messages delivered to one user.
    pub fn messages_for(&self, user_id: i64) -> Vec<String> {
        self.user_messages()
            .into_iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn send_to_user(&self, user_id: i64, text: &str) -> bool {
        self.user_messages
            .lock()
            .expect("lock user messages")
            .push((user_id, text.to_string()));
        true
    }

    async fn send_to_channel(&self, text: &str) -> bool {
        if !self.channel_enabled {
            return false;
        }
        self.channel_messages
            .lock()
            .expect("lock channel messages")
            .push(text.to_string());
        true
    }
}
