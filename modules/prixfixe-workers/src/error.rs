use std::fmt;

use prixfixe_common::{DataType, MessageType, PrixFixeError};
use thiserror::Error;

/// Which lifecycle verb a persistence step was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Update,
    Archive,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Archive => "archive",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Create => "creating",
            Verb::Update => "updating",
            Verb::Archive => "archiving",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOp {
    Upsert,
    Delete,
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexOp::Upsert => "indexing",
            IndexOp::Delete => "removing from search index",
        })
    }
}

/// The follow-on steps of the vote cascade, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CascadeStep {
    PublishVoteCreated,
    FinalizeOption,
    PublishOptionFinalized,
    FinalizePlan,
    PublishPlanFinalized,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CascadeStep::PublishVoteCreated => "publishing meal plan option vote created message",
            CascadeStep::FinalizeOption => "finalizing meal plan option",
            CascadeStep::PublishOptionFinalized => "publishing meal plan option finalized message",
            CascadeStep::FinalizePlan => "finalizing meal plan",
            CascadeStep::PublishPlanFinalized => "publishing meal plan finalized message",
        })
    }
}

/// Everything `handle_message` can return. The broker retries on any of them.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("decoding {envelope} message: {source}")]
    Decode {
        envelope: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no handler assigned to message type {0}")]
    UnknownDataType(String),

    #[error("invalid {} message: {source}", .data_type.noun())]
    Invalid {
        data_type: DataType,
        #[source]
        source: PrixFixeError,
    },

    #[error("{verb} {}: {source}", .data_type.noun())]
    Persistence {
        verb: Verb,
        data_type: DataType,
        #[source]
        source: anyhow::Error,
    },

    #[error("{op} {}: {source}", .data_type.noun())]
    Index {
        op: IndexOp,
        data_type: DataType,
        #[source]
        source: anyhow::Error,
    },

    #[error("publishing {message_type} data change message: {source}")]
    Publish {
        data_type: DataType,
        message_type: MessageType,
        #[source]
        source: anyhow::Error,
    },

    #[error("{step}: {source}")]
    Cascade {
        step: CascadeStep,
        #[source]
        source: anyhow::Error,
    },
}

impl WorkerError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::Decode { .. } => "decode",
            WorkerError::UnknownDataType(_) => "unknown_data_type",
            WorkerError::Invalid { .. } => "invalid",
            WorkerError::Persistence { .. } => "persistence",
            WorkerError::Index { .. } => "index",
            WorkerError::Publish { .. } => "publish",
            WorkerError::Cascade { .. } => "cascade",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_names_the_verb_and_entity() {
        let err = WorkerError::Persistence {
            verb: Verb::Create,
            data_type: DataType::RecipeStep,
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "creating recipe step: boom");
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn unknown_data_type_message() {
        let err = WorkerError::UnknownDataType("nonexistent".into());
        assert_eq!(err.to_string(), "no handler assigned to message type nonexistent");
    }

    #[test]
    fn cascade_error_names_the_step() {
        let err = WorkerError::Cascade {
            step: CascadeStep::FinalizePlan,
            source: anyhow::anyhow!("db down"),
        };
        assert_eq!(err.to_string(), "finalizing meal plan: db down");
    }

    #[test]
    fn source_chain_is_preserved() {
        let err = WorkerError::Publish {
            data_type: DataType::Recipe,
            message_type: MessageType::RecipeCreated,
            source: anyhow::anyhow!("broker unreachable"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("broker unreachable"));
    }
}
