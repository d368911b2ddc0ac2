//! Topic routing: one worker per inbound topic.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::archives::ArchivesWorker;
use crate::context::MessageContext;
use crate::error::WorkerError;
use crate::search::SearchIndexes;
use crate::traits::{DataManager, MessageHandler, Publisher};
use crate::updates::UpdatesWorker;
use crate::writes::WritesWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    PreWrites,
    PreUpdates,
    PreArchives,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::PreWrites, Topic::PreUpdates, Topic::PreArchives];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::PreWrites => "pre_writes",
            Topic::PreUpdates => "pre_updates",
            Topic::PreArchives => "pre_archives",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown topic: {s}"))
    }
}

/// The three workers sharing one set of collaborators.
#[derive(Clone)]
pub struct Workers {
    pub writes: WritesWorker,
    pub updates: UpdatesWorker,
    pub archives: ArchivesWorker,
}

impl Workers {
    pub fn new(
        data_manager: Arc<dyn DataManager>,
        publisher: Option<Arc<dyn Publisher>>,
        indexes: SearchIndexes,
    ) -> Self {
        Self {
            writes: WritesWorker::builder()
                .data_manager(data_manager.clone())
                .publisher(publisher.clone())
                .indexes(indexes.clone())
                .build(),
            updates: UpdatesWorker::builder()
                .data_manager(data_manager.clone())
                .publisher(publisher.clone())
                .indexes(indexes.clone())
                .build(),
            archives: ArchivesWorker::builder()
                .data_manager(data_manager)
                .publisher(publisher)
                .indexes(indexes)
                .build(),
        }
    }

    pub fn handler(&self, topic: Topic) -> &dyn MessageHandler {
        match topic {
            Topic::PreWrites => &self.writes,
            Topic::PreUpdates => &self.updates,
            Topic::PreArchives => &self.archives,
        }
    }

    pub async fn handle(
        &self,
        topic: Topic,
        ctx: &MessageContext,
        bytes: &[u8],
    ) -> Result<(), WorkerError> {
        self.handler(topic).handle_message(ctx, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_names_parse_back() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
        assert!("data_changes".parse::<Topic>().is_err());
    }

    #[test]
    fn topic_serde_matches_display() {
        let json = serde_json::to_value(Topic::PreArchives).unwrap();
        assert_eq!(json, "pre_archives");
    }
}
