//! Typed publish contract and its client-backed implementation.

use crate::client::{MessageClient, MessageSender};
use crate::error::EventStreamResult;
use crate::event::Event;
use crate::message::{EVENT_TYPE_PROPERTY, JSON_CONTENT_TYPE, Message};
use async_trait::async_trait;
use nucleus_types::Cancellation;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Publishes events of type `E` to one channel.
#[async_trait]
pub trait EventStream<E: Event>: Send + Sync {
    /// Serializes and sends one event in one transport call.
    async fn publish(&self, event: &E, cancel: &Cancellation) -> EventStreamResult<()>;

    /// Serializes every event first, then sends them all in one transport
    /// call, preserving order. An empty slice sends nothing.
    async fn publish_batch(&self, events: &[E], cancel: &Cancellation) -> EventStreamResult<()>;
}

/// Gives a specialized stream the [`EventStream`] contract by pointing at
/// the base it wraps.
pub trait AsEventStream<E: Event> {
    fn as_base(&self) -> &EventStreamBase<E>;
}

/// Client-backed stream bound to one channel.
pub struct EventStreamBase<E> {
    sender: Arc<dyn MessageSender>,
    _event: PhantomData<fn(E)>,
}

impl<E> Clone for EventStreamBase<E> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            _event: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EventStreamBase<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStreamBase")
            .field("channel", &self.sender.channel())
            .finish_non_exhaustive()
    }
}

impl<E: Event> EventStreamBase<E> {
    /// Creates the sender for `channel` once; it is reused for every publish.
    pub fn new(client: &dyn MessageClient, channel: &str) -> Self {
        Self::from_sender(client.create_sender(channel))
    }

    pub fn from_sender(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            sender,
            _event: PhantomData,
        }
    }

    pub fn channel(&self) -> &str {
        self.sender.channel()
    }

    pub async fn publish(&self, event: &E, cancel: &Cancellation) -> EventStreamResult<()> {
        cancel.check()?;
        let message = to_message(event)?;
        debug!(
            channel = self.channel(),
            event_type = message.event_type(),
            message_id = %message.message_id,
            "publishing event"
        );

        cancel.run(self.sender.send_message(message)).await??;
        Ok(())
    }

    pub async fn publish_batch(
        &self,
        events: &[E],
        cancel: &Cancellation,
    ) -> EventStreamResult<()> {
        cancel.check()?;
        if events.is_empty() {
            debug!(channel = self.channel(), "empty batch, nothing to publish");
            return Ok(());
        }

        let messages = events
            .iter()
            .map(to_message)
            .collect::<EventStreamResult<Vec<_>>>()?;
        debug!(channel = self.channel(), count = messages.len(), "publishing batch");

        cancel.run(self.sender.send_messages(messages)).await??;
        Ok(())
    }
}

/// JSON body plus content type and event type metadata.
fn to_message<E: Event>(event: &E) -> EventStreamResult<Message> {
    let body = serde_json::to_vec(event)?;
    Ok(Message::new(body)
        .with_content_type(JSON_CONTENT_TYPE)
        .with_property(EVENT_TYPE_PROPERTY, event.event_type()))
}

impl<E: Event> AsEventStream<E> for EventStreamBase<E> {
    fn as_base(&self) -> &EventStreamBase<E> {
        self
    }
}

#[async_trait]
impl<E, S> EventStream<E> for S
where
    E: Event,
    S: AsEventStream<E> + Send + Sync,
{
    async fn publish(&self, event: &E, cancel: &Cancellation) -> EventStreamResult<()> {
        <S as AsEventStream<E>>::as_base(self).publish(event, cancel).await
    }

    async fn publish_batch(&self, events: &[E], cancel: &Cancellation) -> EventStreamResult<()> {
        <S as AsEventStream<E>>::as_base(self).publish_batch(events, cancel).await
    }
}
