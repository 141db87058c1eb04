//! Transport messages.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Application property carrying the event type discriminator.
pub const EVENT_TYPE_PROPERTY: &str = "EventType";

/// Content type of serialized events.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One message as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub application_properties: BTreeMap<String, String>,
}

impl Message {
    /// Creates a message with a random id and no properties.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            content_type: None,
            body: body.into(),
            application_properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.application_properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.application_properties.get(key).map(String::as_str)
    }

    /// The event type discriminator, if the message carries one.
    pub fn event_type(&self) -> Option<&str> {
        self.property(EVENT_TYPE_PROPERTY)
    }

    pub fn body_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Decodes the JSON body.
    pub fn deserialize_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
