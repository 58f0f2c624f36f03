use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::payment::PaymentRecord;

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert-or-replace keyed by `payment_id`. Replays rewrite the mutable
    /// columns; `created_at` keeps its first-write value.
    pub async fn upsert(&self, record: &PaymentRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO payments (payment_id, user_id, amount, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (payment_id) DO UPDATE SET
                 user_id = excluded.user_id,
                 amount = excluded.amount,
                 status = excluded.status",
        )
        .bind(&record.payment_id)
        .bind(&record.user_id)
        .bind(record.amount)
        .bind(record.status)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to store payment")?;

        debug!(
            "Stored payment {} for user {} ({})",
            record.payment_id,
            record.user_id,
            record.status.as_str()
        );
        Ok(())
    }

    pub async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT payment_id, user_id, amount, status, created_at
             FROM payments WHERE payment_id = ?1",
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch payment by id")?;
        Ok(record)
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<Vec<PaymentRecord>> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            "SELECT payment_id, user_id, amount, status, created_at
             FROM payments WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch payments by user")?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count payments")?;
        Ok(count)
    }
}
