use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a participant's share of an expense was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Total divided evenly, leftover cents to the earliest participants
    Equal,
    /// Share given in basis points of the total (10000 = 100%)
    Percent,
    /// Share given as an explicit amount in cents
    Amount,
    /// Share given as a weight relative to the sum of all weights
    Share,
}

impl SplitType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "percent" => Ok(SplitType::Percent),
            "amount" => Ok(SplitType::Amount),
            "share" => Ok(SplitType::Share),
            _ => Err(format!("Invalid split type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Percent => "percent",
            SplitType::Amount => "amount",
            SplitType::Share => "share",
        }
    }
}

/// One participant's requested share of an expense, before the engine
/// resolves it to an exact amount in cents.
///
/// `value` is interpreted per `split_type`: basis points for `percent`,
/// cents for `amount`, a weight for `share`, ignored for `equal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRequest {
    pub user_id: Uuid,
    pub split_type: SplitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl SplitRequest {
    pub fn equal(user_id: Uuid) -> Self {
        Self {
            user_id,
            split_type: SplitType::Equal,
            value: None,
        }
    }
}

/// A monetary event within a group, decomposed into per-participant splits.
///
/// Amounts are integer minor-currency units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub paid_by: Uuid,
    pub amount_cents: i64,
    pub description: String,
    pub receipt_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: NaiveDateTime,
}

impl Expense {
    /// Create a new Expense (typically used for creating from API input)
    pub fn new(
        group_id: Uuid,
        paid_by: Uuid,
        amount_cents: i64,
        description: String,
        receipt_url: Option<String>,
        created_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            paid_by,
            amount_cents,
            description,
            receipt_url,
            created_by,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// A per-participant share of an expense's total.
///
/// Invariant: the splits of an expense always sum to the expense's
/// `amount_cents`; the split engine guarantees this before anything is
/// written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseSplit {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub split_type: String, // Stored as TEXT in DB, use SplitType enum for type safety
}

impl ExpenseSplit {
    pub fn new(expense_id: Uuid, user_id: Uuid, amount_cents: i64, split_type: SplitType) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            user_id,
            amount_cents,
            split_type: split_type.as_str().to_string(),
        }
    }

    /// Get the split type as an enum
    pub fn split_type_enum(&self) -> SplitType {
        SplitType::from_str(&self.split_type).unwrap_or(SplitType::Equal)
    }
}
