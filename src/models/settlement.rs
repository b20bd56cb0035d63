use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a settlement transfer.
///
/// `completed` and `cancelled` are terminal; only completed settlements
/// count toward balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl SettlementStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(SettlementStatus::Pending),
            "completed" => Ok(SettlementStatus::Completed),
            "cancelled" => Ok(SettlementStatus::Cancelled),
            _ => Err(format!("Invalid settlement status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettlementStatus::Pending)
    }
}

/// A transfer between two users recorded to net out balances within a group.
///
/// `from_user` is the one handing over money (the debtor paying down what
/// they owe), `to_user` the one receiving it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount_cents: i64,
    pub status: String, // Stored as TEXT in DB, use SettlementStatus enum for type safety
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
}

impl Settlement {
    /// Create a new pending Settlement
    pub fn new(group_id: Uuid, from_user: Uuid, to_user: Uuid, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            from_user,
            to_user,
            amount_cents,
            status: SettlementStatus::Pending.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            resolved_at: None,
        }
    }

    /// Get the status as an enum
    pub fn status_enum(&self) -> SettlementStatus {
        SettlementStatus::from_str(&self.status).unwrap_or(SettlementStatus::Pending)
    }

    /// Whether this settlement counts toward balances
    pub fn is_completed(&self) -> bool {
        self.status_enum() == SettlementStatus::Completed
    }
}

/// A proposed transfer that would help zero out group balances.
///
/// Derived by the settlement engine, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount_cents: i64,
}
