//! OutboxStore: append-only outbound message log backed by Postgres.
//!
//! Gap-free reads are guaranteed internally. Relays never see BIGSERIAL gaps
//! from rolled-back or in-flight transactions.

use anyhow::Result;
use sqlx::PgPool;
use tracing::warn;

use crate::types::{OutboundMessage, StoredMessage};

const NOTIFY_CHANNEL: &str = "data_change_outbox";

// ---------------------------------------------------------------------------
// OutboxStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct OutboxStore {
    pool: PgPool,
}

impl OutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and make sure the outbox table exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the outbox table and its indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data_change_outbox (
                seq           BIGSERIAL    PRIMARY KEY,
                ts            TIMESTAMPTZ  NOT NULL DEFAULT now(),
                topic         TEXT         NOT NULL,
                message_type  TEXT         NOT NULL,
                data_type     TEXT         NOT NULL,
                payload       JSONB        NOT NULL,
                schema_v      SMALLINT     NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS data_change_outbox_message_type_idx \
             ON data_change_outbox (message_type, seq)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append a message. Returns its sequence number.
    pub async fn append(&self, message: OutboundMessage) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO data_change_outbox (topic, message_type, data_type, payload, schema_v)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING seq
            "#,
        )
        .bind(&message.topic)
        .bind(&message.message_type)
        .bind(&message.data_type)
        .bind(&message.payload)
        .bind(message.schema_v)
        .fetch_one(&self.pool)
        .await?;

        let seq = row.0;
        notify_new_message(&self.pool, seq).await;
        Ok(seq)
    }

    /// Append a message and return the full stored row (with ts from Postgres).
    pub async fn append_and_read(&self, message: OutboundMessage) -> Result<StoredMessage> {
        let stored = sqlx::query_as::<_, StoredMessage>(
            r#"
            INSERT INTO data_change_outbox (topic, message_type, data_type, payload, schema_v)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING seq, ts, topic, message_type, data_type, payload, schema_v
            "#,
        )
        .bind(&message.topic)
        .bind(&message.message_type)
        .bind(&message.data_type)
        .bind(&message.payload)
        .bind(message.schema_v)
        .fetch_one(&self.pool)
        .await?;

        notify_new_message(&self.pool, stored.seq).await;
        Ok(stored)
    }

    /// Read messages in sequence order starting from `seq_start` (inclusive).
    ///
    /// Stops at the first gap so an in-flight insert is never skipped; the next
    /// call picks up once it commits.
    pub async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredMessage>> {
        let rows = sqlx::query_as::<_, StoredMessage>(
            r#"
            SELECT seq, ts, topic, message_type, data_type, payload, schema_v
            FROM data_change_outbox
            WHERE seq >= $1
            ORDER BY seq ASC
            LIMIT $2
            "#,
        )
        .bind(seq_start)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(take_contiguous(rows, seq_start))
    }

    /// Read messages of one message type, in sequence order.
    pub async fn read_by_message_type(
        &self,
        message_type: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let rows = sqlx::query_as::<_, StoredMessage>(
            r#"
            SELECT seq, ts, topic, message_type, data_type, payload, schema_v
            FROM data_change_outbox
            WHERE message_type = $1
            ORDER BY seq ASC
            LIMIT $2
            "#,
        )
        .bind(message_type)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The latest committed sequence number, or 0 if the table is empty.
    pub async fn latest_seq(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (Option<i64>,)>("SELECT MAX(seq) FROM data_change_outbox")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0.unwrap_or(0))
    }
}

/// Keep the leading run of rows whose seqs are consecutive from `seq_start`.
pub(crate) fn take_contiguous(rows: Vec<StoredMessage>, seq_start: i64) -> Vec<StoredMessage> {
    let mut result = Vec::with_capacity(rows.len());
    let mut expected_seq = seq_start;

    for row in rows {
        if row.seq != expected_seq {
            break;
        }
        expected_seq = row.seq + 1;
        result.push(row);
    }

    result
}

// ---------------------------------------------------------------------------
// PG NOTIFY
// ---------------------------------------------------------------------------

async fn notify_new_message(pool: &PgPool, seq: i64) {
    let result = sqlx::query("SELECT pg_notify($1, $2::text)")
        .bind(NOTIFY_CHANNEL)
        .bind(seq)
        .execute(pool)
        .await;

    if let Err(e) = result {
        warn!(error = %e, seq, "PG NOTIFY failed (non-fatal)");
    }
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for StoredMessage
// ---------------------------------------------------------------------------

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredMessage {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(StoredMessage {
            seq: row.try_get("seq")?,
            ts: row.try_get("ts")?,
            topic: row.try_get("topic")?,
            message_type: row.try_get("message_type")?,
            data_type: row.try_get("data_type")?,
            payload: row.try_get("payload")?,
            schema_v: row.try_get("schema_v")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seq: i64) -> StoredMessage {
        StoredMessage {
            seq,
            ts: chrono::Utc::now(),
            topic: "data_changes".into(),
            message_type: "recipeCreated".into(),
            data_type: "recipe".into(),
            payload: serde_json::json!({}),
            schema_v: 1,
        }
    }

    #[test]
    fn contiguous_rows_are_all_returned() {
        let out = take_contiguous(vec![row(5), row(6), row(7)], 5);
        assert_eq!(out.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![5, 6, 7]);
    }

    #[test]
    fn read_stops_at_first_gap() {
        let out = take_contiguous(vec![row(1), row(2), row(4)], 1);
        assert_eq!(out.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn gap_at_start_returns_nothing() {
        assert!(take_contiguous(vec![row(3)], 1).is_empty());
    }
}
