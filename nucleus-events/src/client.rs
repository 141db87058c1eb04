//! Message transport boundary.

use crate::error::MessageResult;
use crate::message::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Connection to a message bus, shared by every stream.
pub trait MessageClient: Send + Sync {
    /// Returns a sender bound to the named queue or topic.
    fn create_sender(&self, channel: &str) -> Arc<dyn MessageSender>;
}

/// Sends messages to one channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    fn channel(&self) -> &str;

    async fn send_message(&self, message: Message) -> MessageResult<()>;

    /// Sends every message in one transport operation, preserving order.
    async fn send_messages(&self, messages: Vec<Message>) -> MessageResult<()>;
}
