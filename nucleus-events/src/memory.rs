//! In-process message bus.
//!
//! Records every transport call per channel so tests can assert on exactly
//! what was sent and how it was grouped. Nothing is consumed or persisted.

use crate::client::{MessageClient, MessageSender};
use crate::error::{MessageError, MessageResult};
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

type Channels = HashMap<String, Vec<Delivery>>;

/// In-memory bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBusConfig {
    /// Largest number of messages accepted in one batch call.
    pub max_batch_size: Option<usize>,
    /// Largest accepted message body in bytes.
    pub max_message_bytes: Option<usize>,
    /// Accept sends to channels that were never declared.
    pub auto_create_channels: bool,
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            max_batch_size: None,
            max_message_bytes: Some(256 * 1024),
            auto_create_channels: true,
        }
    }
}

/// One accepted transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub messages: Vec<Message>,
    /// True if the call was `send_messages`.
    pub batched: bool,
}

/// Message bus backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageBus {
    config: MessageBusConfig,
    channels: Arc<RwLock<Channels>>,
}

impl InMemoryMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MessageBusConfig) -> Self {
        Self {
            config,
            channels: Arc::default(),
        }
    }

    /// Declares `channel` while building the bus.
    ///
    /// On a bus already shared with clones the declaration needs the channel
    /// lock without waiting. If a send or read holds it at that moment the
    /// declaration is skipped with a warning; use
    /// [`create_channel`](Self::create_channel) once the bus is in use.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        let channel = channel.into();
        if let Some(lock) = Arc::get_mut(&mut self.channels) {
            lock.get_mut().entry(channel).or_default();
        } else if let Ok(mut channels) = self.channels.try_write() {
            channels.entry(channel).or_default();
        } else {
            warn!(channel, "channel lock busy, declaration skipped");
        }
        self
    }

    pub fn config(&self) -> &MessageBusConfig {
        &self.config
    }

    /// Declares `channel` if it does not exist yet. Returns true if it was created.
    pub async fn create_channel(&self, channel: &str) -> bool {
        let mut channels = self.channels.write().await;
        if channels.contains_key(channel) {
            return false;
        }
        channels.insert(channel.to_string(), Vec::new());
        info!(channel, "created in-memory channel");
        true
    }

    /// Every accepted transport call on `channel`, oldest first.
    pub async fn deliveries(&self, channel: &str) -> Vec<Delivery> {
        self.channels
            .read()
            .await
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Every accepted message on `channel` in send order.
    pub async fn messages(&self, channel: &str) -> Vec<Message> {
        self.deliveries(channel)
            .await
            .into_iter()
            .flat_map(|delivery| delivery.messages)
            .collect()
    }
}

impl MessageClient for InMemoryMessageBus {
    fn create_sender(&self, channel: &str) -> Arc<dyn MessageSender> {
        Arc::new(InMemorySender {
            channel: channel.to_string(),
            config: self.config.clone(),
            channels: Arc::clone(&self.channels),
        })
    }
}

struct InMemorySender {
    channel: String,
    config: MessageBusConfig,
    channels: Arc<RwLock<Channels>>,
}

impl InMemorySender {
    fn check_size(&self, message: &Message) -> MessageResult<()> {
        match self.config.max_message_bytes {
            Some(max) if message.body.len() > max => Err(MessageError::MessageTooLarge {
                size: message.body.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    async fn deliver(&self, delivery: Delivery) -> MessageResult<()> {
        let mut channels = self.channels.write().await;
        let log = if self.config.auto_create_channels {
            channels.entry(self.channel.clone()).or_default()
        } else {
            channels
                .get_mut(&self.channel)
                .ok_or_else(|| MessageError::ChannelNotFound(self.channel.clone()))?
        };
        debug!(
            channel = %self.channel,
            messages = delivery.messages.len(),
            batched = delivery.batched,
            "accepted delivery"
        );
        log.push(delivery);
        Ok(())
    }
}

#[async_trait]
impl MessageSender for InMemorySender {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn send_message(&self, message: Message) -> MessageResult<()> {
        self.check_size(&message)?;
        self.deliver(Delivery {
            messages: vec![message],
            batched: false,
        })
        .await
    }

    async fn send_messages(&self, messages: Vec<Message>) -> MessageResult<()> {
        if let Some(max) = self.config.max_batch_size {
            if messages.len() > max {
                return Err(MessageError::BatchTooLarge {
                    size: messages.len(),
                    max,
                });
            }
        }
        for message in &messages {
            self.check_size(message)?;
        }
        self.deliver(Delivery {
            messages,
            batched: true,
        })
        .await
    }
}
