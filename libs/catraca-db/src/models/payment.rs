use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One charge attempt, keyed by the processor-assigned payment id.
///
/// The bot only ever writes `Pending` rows; later transitions (webhook
/// confirmations, expiry sweeps) rewrite the same row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }
}

impl PaymentRecord {
    pub fn pending(
        payment_id: impl Into<String>,
        user_id: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            payment_id: payment_id.into(),
            user_id: user_id.into(),
            amount,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
