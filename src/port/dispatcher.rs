//! Notification dispatcher port.

use async_trait::async_trait;

/// Sends notification text to a single user or the broadcast channel.
///
/// Delivery failures are reported as `false`, never as errors; a missing
/// or unconfigured channel is a no-op returning `false`.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send_to_user(&self, user_id: i64, text: &str) -> bool;

    async fn send_to_channel(&self, text: &str) -> bool;
}
