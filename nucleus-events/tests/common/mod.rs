//! Shared fixtures for event stream tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nucleus_events::{
    AsEventStream, Event, EventStreamBase, Message, MessageClient, MessageError, MessageResult,
    MessageSender,
};
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const CHANNEL: &str = "readings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEvent {
    pub content: String,
}

impl TestEvent {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }
}

impl Event for TestEvent {}

/// Several logical events sharing one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorEvent {
    Connected { sensor: String },
    Reading { sensor: String, celsius: f64 },
}

impl Event for SensorEvent {
    fn event_type(&self) -> Cow<'static, str> {
        match self {
            Self::Connected { .. } => "SensorConnected".into(),
            Self::Reading { .. } => "SensorReading".into(),
        }
    }
}

/// Fails to serialize when `poisoned` is set.
#[derive(Debug, Clone)]
pub struct FlakyEvent {
    pub poisoned: bool,
}

impl Serialize for FlakyEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.poisoned {
            return Err(serde::ser::Error::custom("poisoned event"));
        }
        serializer.serialize_str("ok")
    }
}

impl Event for FlakyEvent {}

/// A specialized stream, built the way downstream crates build theirs.
pub struct TestStream(EventStreamBase<TestEvent>);

impl TestStream {
    pub fn new(client: &dyn MessageClient) -> Self {
        Self(EventStreamBase::new(client, CHANNEL))
    }
}

impl AsEventStream<TestEvent> for TestStream {
    fn as_base(&self) -> &EventStreamBase<TestEvent> {
        &self.0
    }
}

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Single(Message),
    Batch(Vec<Message>),
}

/// Sender double that records every call and answers from a script.
#[derive(Default)]
pub struct ScriptedSender {
    channel: String,
    sends: Mutex<Vec<Sent>>,
    errors: Mutex<VecDeque<MessageError>>,
    stalled: Mutex<bool>,
}

impl ScriptedSender {
    pub fn new(channel: &str) -> Arc<Self> {
        Arc::new(Self {
            channel: channel.to_string(),
            ..Self::default()
        })
    }

    pub fn sends(&self) -> Vec<Sent> {
        self.sends.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: MessageError) {
        self.errors.lock().unwrap().push_back(err);
    }

    /// Makes every later call wait forever after recording itself.
    pub fn stall(&self) {
        *self.stalled.lock().unwrap() = true;
    }

    async fn answer(&self, send: Sent) -> MessageResult<()> {
        self.sends.lock().unwrap().push(send);
        let stalled = *self.stalled.lock().unwrap();
        if stalled {
            std::future::pending::<()>().await;
        }
        match self.errors.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MessageSender for ScriptedSender {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn send_message(&self, message: Message) -> MessageResult<()> {
        self.answer(Sent::Single(message)).await
    }

    async fn send_messages(&self, messages: Vec<Message>) -> MessageResult<()> {
        self.answer(Sent::Batch(messages)).await
    }
}

/// Client handing out one shared scripted sender and counting requests.
pub struct ScriptedClient {
    pub sender: Arc<ScriptedSender>,
    pub created: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            sender: ScriptedSender::new(CHANNEL),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl MessageClient for ScriptedClient {
    fn create_sender(&self, channel: &str) -> Arc<dyn MessageSender> {
        self.created.lock().unwrap().push(channel.to_string());
        self.sender.clone()
    }
}
