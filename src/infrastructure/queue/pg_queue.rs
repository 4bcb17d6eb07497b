use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{MessageQueue, QueueError, SendStatus};
use crate::domain::{DeduplicationId, LeaseHandle, OutgoingMessage, QueueMessage};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CONNECT_ATTEMPTS: u32 = 6;

/// PostgreSQL-backed queue. A message of a group can only be leased once every
/// earlier message of that group has been acknowledged.
pub struct PgMessageQueue {
    pool: PgPool,
    visibility_timeout: Duration,
    dedup_window: Duration,
}

impl PgMessageQueue {
    pub fn new(pool: PgPool, visibility_timeout: Duration, dedup_window: Duration) -> Self {
        Self {
            pool,
            visibility_timeout,
            dedup_window,
        }
    }

    /// Connects with exponential backoff, then applies the queue migrations.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        visibility_timeout: Duration,
        dedup_window: Duration,
    ) -> Result<Self, QueueError> {
        let mut delay = Duration::from_millis(500);
        let mut attempt = 1;
        let pool = loop {
            let connected = PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(url)
                .await;
            match connected {
                Ok(pool) => break pool,
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Queue database unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(QueueError::ConnectionFailed(e.to_string())),
            }
        };
        tracing::info!(attempt, "Queue database connected");

        let queue = Self::new(pool, visibility_timeout, dedup_window);
        queue.migrate().await?;
        Ok(queue)
    }

    pub async fn migrate(&self) -> Result<(), QueueError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| QueueError::ConnectionFailed(format!("migrations: {}", e)))
    }

    async fn try_lease(&self) -> Result<Option<QueueMessage>, QueueError> {
        let lease_id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            UPDATE queue_messages
            SET receive_count = receive_count + 1,
                lease_id = $1,
                visible_at = now() + make_interval(secs => $2)
            WHERE seq = (
                SELECT m.seq
                FROM queue_messages m
                WHERE m.visible_at <= now()
                  AND NOT EXISTS (
                      SELECT 1 FROM queue_messages h
                      WHERE h.group_id = m.group_id AND h.seq < m.seq
                  )
                ORDER BY m.seq
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING dedup_id, body, receive_count
            "#,
        )
        .bind(lease_id)
        .bind(self.visibility_timeout.as_secs_f64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let receive_count: i32 = row.get("receive_count");
        Ok(Some(QueueMessage {
            body: row.get("body"),
            lease: LeaseHandle::new(lease_id.to_string()),
            dedup_id: DeduplicationId::from_raw(row.get::<String, _>("dedup_id")),
            receive_count: u32::try_from(receive_count).unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl MessageQueue for PgMessageQueue {
    #[instrument(skip(self, message), fields(group_id = %message.group_id, dedup_id = %message.dedup_id))]
    async fn send(&self, message: OutgoingMessage) -> Result<SendStatus, QueueError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM queue_dedup WHERE expires_at <= now()")
            .execute(&mut *tx)
            .await
            .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        let claimed = sqlx::query(
            r#"
            INSERT INTO queue_dedup (group_id, dedup_id, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
            ON CONFLICT (group_id, dedup_id) DO NOTHING
            "#,
        )
        .bind(&message.group_id)
        .bind(message.dedup_id.as_str())
        .bind(self.dedup_window.as_secs_f64())
        .execute(&mut *tx)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        if claimed.rows_affected() == 0 {
            tx.commit()
                .await
                .map_err(|e| QueueError::QueryFailed(e.to_string()))?;
            return Ok(SendStatus::Duplicate);
        }

        sqlx::query("INSERT INTO queue_messages (group_id, dedup_id, body) VALUES ($1, $2, $3)")
            .bind(&message.group_id)
            .bind(message.dedup_id.as_str())
            .bind(&message.body)
            .execute(&mut *tx)
            .await
            .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        Ok(SendStatus::Enqueued)
    }

    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>, QueueError> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if let Some(message) = self.try_lease().await? {
                return Ok(Some(message));
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    #[instrument(skip(self), fields(lease = %lease))]
    async fn acknowledge(&self, lease: &LeaseHandle) -> Result<(), QueueError> {
        let lease_id = Uuid::parse_str(lease.as_str())
            .map_err(|_| QueueError::UnknownLease(lease.to_string()))?;

        let deleted =
            sqlx::query("DELETE FROM queue_messages WHERE lease_id = $1 AND visible_at > now()")
                .bind(lease_id)
                .execute(&self.pool)
                .await
                .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            return Err(QueueError::UnknownLease(lease.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, message), fields(dedup_id = %message.dedup_id))]
    async fn dead_letter(&self, message: &QueueMessage, reason: &str) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO dead_letters (dedup_id, body, receive_count, reason)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(message.dedup_id.as_str())
        .bind(&message.body)
        .bind(i32::try_from(message.receive_count).unwrap_or(i32::MAX))
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}
