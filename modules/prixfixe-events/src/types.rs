//! Core types for the outbox. Domain-agnostic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message as stored in Postgres. Returned by all read methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub topic: String,
    pub message_type: String,
    pub data_type: String,
    pub payload: serde_json::Value,
    pub schema_v: i16,
}

/// A message to be appended. The caller builds this; the store assigns seq/ts.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub topic: String,
    pub message_type: String,
    pub data_type: String,
    pub payload: serde_json::Value,
    pub schema_v: i16,
}

impl OutboundMessage {
    pub fn new(
        message_type: impl Into<String>,
        data_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            topic: OutboundMessage::DEFAULT_TOPIC.to_string(),
            message_type: message_type.into(),
            data_type: data_type.into(),
            payload,
            schema_v: 1,
        }
    }

    pub const DEFAULT_TOPIC: &'static str = "data_changes";

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_schema_v(mut self, v: i16) -> Self {
        self.schema_v = v;
        self
    }
}
