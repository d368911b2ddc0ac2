//! Replay of recorded deliveries against in-memory storage.
//!
//! Input is one JSON object per line: `{"topic": "pre_writes", "message": {...}}`.
//! Lines are read and handled as a stream, so memory use does not grow with
//! the length of the input.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::{stream, FutureExt, TryStreamExt};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::context::MessageContext;
use crate::memory::MemoryDataManager;
use crate::router::{Topic, Workers};

/// Household ID to member user IDs.
pub type Households = HashMap<String, Vec<String>>;

/// Read a households file: a JSON object mapping each household ID to the
/// user IDs of its members, e.g. `{"h1": ["u1", "u2"]}`.
pub async fn load_households(path: &Path) -> Result<Households> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading households file {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("parsing households file {}", path.display()))
}

/// Storage for a replay. Ballots only complete for households listed here.
pub fn data_manager(households: Households) -> MemoryDataManager {
    MemoryDataManager::new().with_households(households)
}

#[derive(Deserialize)]
struct Delivery {
    topic: Topic,
    message: serde_json::Value,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Lines that were not a delivery at all.
    pub unreadable: usize,
}

enum Outcome {
    Succeeded,
    Failed,
    Unreadable,
    Blank,
}

impl ReplaySummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Unreadable => self.unreadable += 1,
            Outcome::Blank => {}
        }
    }
}

/// Handle every delivery in `input`, at most `concurrency` at a time.
///
/// Failed and unreadable deliveries are logged and counted. Only a read error
/// on `input` stops the replay.
pub async fn replay<R>(
    workers: &Workers,
    input: R,
    concurrency: usize,
    deadline: Option<Duration>,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let lines = stream::try_unfold(input.lines(), |mut lines| async move {
        Ok::<_, io::Error>(lines.next_line().await?.map(|line| (line, lines)))
    });

    lines
        .map_ok(|line| deliver(workers, line, deadline).map(Ok::<_, io::Error>))
        .try_buffer_unordered(concurrency.max(1))
        .try_fold(ReplaySummary::default(), |mut summary, outcome| async move {
            summary.record(outcome);
            Ok::<_, io::Error>(summary)
        })
        .await
        .context("reading deliveries")
}

async fn deliver(workers: &Workers, line: String, deadline: Option<Duration>) -> Outcome {
    if line.trim().is_empty() {
        return Outcome::Blank;
    }
    let delivery = match serde_json::from_str::<Delivery>(&line) {
        Ok(delivery) => delivery,
        Err(e) => {
            warn!(error = %e, "Skipping unreadable delivery");
            return Outcome::Unreadable;
        }
    };
    let bytes = match serde_json::to_vec(&delivery.message) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(topic = %delivery.topic, error = %e, "Skipping unreadable delivery");
            return Outcome::Unreadable;
        }
    };

    let ctx = match deadline {
        Some(timeout) => MessageContext::new().with_timeout(timeout),
        None => MessageContext::new(),
    };
    match workers.handle(delivery.topic, &ctx, &bytes).await {
        Ok(()) => Outcome::Succeeded,
        Err(e) => {
            warn!(topic = %delivery.topic, kind = e.kind(), error = %e, "Delivery failed");
            Outcome::Failed
        }
    }
}
