//! Generic typed event stream publisher.
//!
//! An [`EventStreamBase<E>`] is bound at construction to one channel (queue
//! or topic) of a shared [`MessageClient`]. Each published event is
//! serialized to JSON and tagged with its type discriminator under the
//! [`EVENT_TYPE_PROPERTY`] application property, so one channel can carry
//! several event types and consumers can route on metadata alone.
//!
//! # Architecture
//!
//! - **Event**: any `Serialize` type; [`Event::event_type`] supplies the
//!   discriminator
//! - **Message**: body bytes plus string application properties
//! - **Client/Sender**: the transport boundary, implemented by vendor SDK
//!   adapters and by [`InMemoryMessageBus`]
//! - **Stream**: [`EventStream`], the publish contract

mod client;
mod error;
mod event;
mod memory;
mod message;
mod stream;

pub use client::{MessageClient, MessageSender};
pub use error::{EventStreamError, EventStreamResult, MessageError, MessageResult};
pub use event::{Event, short_type_name};
pub use memory::{Delivery, InMemoryMessageBus, MessageBusConfig};
pub use message::{EVENT_TYPE_PROPERTY, JSON_CONTENT_TYPE, Message};
pub use stream::{AsEventStream, EventStream, EventStreamBase};
