//! Charge model.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Succeeded,
    Pending,
    Failed,
    Unknown,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Succeeded => "succeeded",
            ChargeStatus::Pending => "pending",
            ChargeStatus::Failed => "failed",
            ChargeStatus::Unknown => "unknown",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "succeeded" => ChargeStatus::Succeeded,
            "pending" => ChargeStatus::Pending,
            "failed" => ChargeStatus::Failed,
            _ => ChargeStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRecord {
    pub id: String,
    /// Amount in smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub status: ChargeStatus,
    pub customer_id: String,
    pub created: DateTime<Utc>,
    pub paid: bool,
    pub refunded: bool,
    pub amount_refunded: i64,
}
