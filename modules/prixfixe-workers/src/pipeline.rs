//! The three-step mutation contract shared by every entity handler:
//! persist, then mirror into the search index, then publish the data change.
//! Each step runs only if the previous one succeeded.

use std::future::Future;

use prixfixe_common::{DataChangeMessage, DataType, Entity, MessageType, Record};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::MessageContext;
use crate::error::{IndexOp, Verb, WorkerError};
use crate::traits::{Publisher, SearchIndexManager};

/// Everything a handler needs for one delivery.
pub(crate) struct Steps<'a> {
    ctx: &'a MessageContext,
    data_type: DataType,
    index: Option<&'a dyn SearchIndexManager>,
    publisher: Option<&'a dyn Publisher>,
    user_id: &'a str,
    household_id: &'a str,
}

impl<'a> Steps<'a> {
    pub(crate) fn new(
        ctx: &'a MessageContext,
        data_type: DataType,
        index: Option<&'a dyn SearchIndexManager>,
        publisher: Option<&'a dyn Publisher>,
        user_id: &'a str,
        household_id: &'a str,
    ) -> Self {
        Self {
            ctx,
            data_type,
            index,
            publisher,
            user_id,
            household_id,
        }
    }

    pub(crate) fn ctx(&self) -> &MessageContext {
        self.ctx
    }

    pub(crate) fn household_id(&self) -> &str {
        self.household_id
    }

    /// A data-change message attributed to this delivery.
    pub(crate) fn message(&self, data_type: DataType, message_type: MessageType) -> DataChangeMessage {
        DataChangeMessage::new(data_type, message_type, self.user_id, self.household_id)
    }

    pub(crate) async fn persist<T, F>(&self, verb: Verb, op: F) -> Result<T, WorkerError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match self.ctx.run(op).await {
            Ok(value) => {
                debug!(data_type = %self.data_type, verb = verb.as_str(), "Persisted");
                Ok(value)
            }
            Err(source) => {
                warn!(data_type = %self.data_type, verb = verb.as_str(), error = %source, "Persistence failed");
                Err(WorkerError::Persistence {
                    verb,
                    data_type: self.data_type,
                    source,
                })
            }
        }
    }

    pub(crate) async fn upsert_index<T: Serialize>(&self, id: &str, document: &T) -> Result<(), WorkerError> {
        let Some(index) = self.index else {
            return Ok(());
        };
        let result = match serde_json::to_value(document) {
            Ok(document) => self.ctx.run(index.index(id, &document)).await,
            Err(e) => Err(e.into()),
        };
        self.index_outcome(IndexOp::Upsert, id, result)
    }

    pub(crate) async fn delete_from_index(&self, id: &str) -> Result<(), WorkerError> {
        let Some(index) = self.index else {
            return Ok(());
        };
        let result = self.ctx.run(index.delete(id)).await;
        self.index_outcome(IndexOp::Delete, id, result)
    }

    fn index_outcome(&self, op: IndexOp, id: &str, result: anyhow::Result<()>) -> Result<(), WorkerError> {
        match result {
            Ok(()) => {
                debug!(data_type = %self.data_type, id, "{op} succeeded");
                Ok(())
            }
            Err(source) => {
                warn!(data_type = %self.data_type, id, error = %source, "{op} failed");
                Err(WorkerError::Index {
                    op,
                    data_type: self.data_type,
                    source,
                })
            }
        }
    }

    /// Publish through the configured publisher, if any. Returns whether a
    /// message was actually sent.
    pub(crate) async fn send(&self, message: &DataChangeMessage) -> anyhow::Result<bool> {
        let Some(publisher) = self.publisher else {
            debug!(message_type = %message.message_type, "No publisher configured, skipping");
            return Ok(false);
        };
        self.ctx.run(publisher.publish(message)).await?;
        debug!(message_type = %message.message_type, "Published data change");
        Ok(true)
    }

    pub(crate) async fn publish(&self, message: DataChangeMessage) -> Result<(), WorkerError> {
        match self.send(&message).await {
            Ok(_) => Ok(()),
            Err(source) => {
                warn!(message_type = %message.message_type, error = %source, "Publish failed");
                Err(WorkerError::Publish {
                    data_type: message.data_type,
                    message_type: message.message_type,
                    source,
                })
            }
        }
    }
}

/// Persist a new entity, index it, and announce it.
pub(crate) async fn create<T, F>(steps: &Steps<'_>, message_type: MessageType, op: F) -> Result<(), WorkerError>
where
    T: Record + Serialize + Into<Entity>,
    F: Future<Output = anyhow::Result<T>>,
{
    let created = steps.persist(Verb::Create, op).await?;
    steps.upsert_index(created.id(), &created).await?;
    steps
        .publish(steps.message(steps.data_type, message_type).with_entity(created))
        .await
}

/// Persist an updated entity, re-index it, and announce the submitted value.
pub(crate) async fn update<T, F>(
    steps: &Steps<'_>,
    message_type: MessageType,
    entity: &T,
    op: F,
) -> Result<(), WorkerError>
where
    T: Record + Serialize + Clone + Into<Entity>,
    F: Future<Output = anyhow::Result<()>>,
{
    steps.persist(Verb::Update, op).await?;
    steps.upsert_index(entity.id(), entity).await?;
    steps
        .publish(steps.message(steps.data_type, message_type).with_entity(entity.clone()))
        .await
}

/// Archive an entity, drop it from the index, and announce it.
pub(crate) async fn archive<F>(
    steps: &Steps<'_>,
    message_type: MessageType,
    id: &str,
    op: F,
) -> Result<(), WorkerError>
where
    F: Future<Output = anyhow::Result<()>>,
{
    steps.persist(Verb::Archive, op).await?;
    steps.delete_from_index(id).await?;
    steps.publish(steps.message(steps.data_type, message_type)).await
}
