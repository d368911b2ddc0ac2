//! Publisher implementations.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use prixfixe_common::{DataChangeMessage, MessageType};
use prixfixe_events::{OutboundMessage, OutboxStore};

use crate::traits::Publisher;

// ---------------------------------------------------------------------------
// OutboxStore adapter (production, postgres)
// ---------------------------------------------------------------------------

#[async_trait]
impl Publisher for OutboxStore {
    async fn publish(&self, message: &DataChangeMessage) -> Result<()> {
        let outbound = OutboundMessage::new(
            message.message_type.as_str(),
            message.data_type.as_str(),
            message.to_payload()?,
        );
        self.append(outbound).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryPublisher (tests, no database required)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Sent {
    messages: Vec<DataChangeMessage>,
    failing: HashSet<MessageType>,
    fail_all: bool,
    attempts: usize,
    published: usize,
    recording: bool,
}

/// Counts publish calls. Keeps the accepted messages in order once
/// [`recording`](Self::recording) is on. Thread-safe.
#[derive(Default)]
pub struct MemoryPublisher {
    sent: Mutex<Sent>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every accepted message for [`messages`](Self::messages).
    pub fn recording(self) -> Self {
        self.lock().recording = true;
        self
    }

    /// Reject every message of `message_type`.
    pub fn fail_on(self, message_type: MessageType) -> Self {
        self.lock().failing.insert(message_type);
        self
    }

    /// Reject everything.
    pub fn failing(self) -> Self {
        self.lock().fail_all = true;
        self
    }

    pub fn recover(&self) {
        let mut sent = self.lock();
        sent.failing.clear();
        sent.fail_all = false;
    }

    /// Successfully published messages, oldest first. Empty unless recording.
    pub fn messages(&self) -> Vec<DataChangeMessage> {
        self.lock().messages.clone()
    }

    pub fn message_types(&self) -> Vec<MessageType> {
        self.lock()
            .messages
            .iter()
            .map(|m| m.message_type)
            .collect()
    }

    /// Publish calls made, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// Messages accepted, whether or not they were kept.
    pub fn published(&self) -> usize {
        self.lock().published
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sent> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, message: &DataChangeMessage) -> Result<()> {
        let mut sent = self.lock();
        sent.attempts += 1;
        if sent.fail_all || sent.failing.contains(&message.message_type) {
            bail!("publisher rejected {}", message.message_type);
        }
        sent.published += 1;
        if sent.recording {
            sent.messages.push(message.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prixfixe_common::DataType;

    fn message(message_type: MessageType) -> DataChangeMessage {
        DataChangeMessage::new(DataType::Recipe, message_type, "u1", "h1")
    }

    #[tokio::test]
    async fn keeps_publish_order() {
        let publisher = MemoryPublisher::new().recording();
        publisher
            .publish(&message(MessageType::RecipeCreated))
            .await
            .unwrap();
        publisher
            .publish(&message(MessageType::RecipeArchived))
            .await
            .unwrap();
        assert_eq!(
            publisher.message_types(),
            vec![MessageType::RecipeCreated, MessageType::RecipeArchived]
        );
    }

    #[tokio::test]
    async fn rejected_messages_are_counted_but_not_kept() {
        let publisher = MemoryPublisher::new()
            .recording()
            .fail_on(MessageType::RecipeArchived);
        publisher
            .publish(&message(MessageType::RecipeCreated))
            .await
            .unwrap();
        assert!(publisher
            .publish(&message(MessageType::RecipeArchived))
            .await
            .is_err());

        assert_eq!(publisher.attempts(), 2);
        assert_eq!(publisher.messages().len(), 1);

        publisher.recover();
        publisher
            .publish(&message(MessageType::RecipeArchived))
            .await
            .unwrap();
        assert_eq!(publisher.messages().len(), 2);
    }

    #[tokio::test]
    async fn only_counts_unless_recording() {
        let publisher = MemoryPublisher::new();
        publisher
            .publish(&message(MessageType::RecipeCreated))
            .await
            .unwrap();

        assert_eq!(publisher.published(), 1);
        assert!(publisher.messages().is_empty());
    }
}
