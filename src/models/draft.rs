use crate::models::expense::SplitRequest;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of an expense draft.
///
/// `pending_review` is the only non-terminal state; once a draft is
/// approved or rejected it must never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl DraftStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "pending_review" => Ok(DraftStatus::PendingReview),
            "approved" => Ok(DraftStatus::Approved),
            "rejected" => Ok(DraftStatus::Rejected),
            _ => Err(format!("Invalid draft status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::PendingReview => "pending_review",
            DraftStatus::Approved => "approved",
            DraftStatus::Rejected => "rejected",
        }
    }

    /// Whether the status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DraftStatus::PendingReview)
    }
}

/// Where a draft came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftSource {
    Manual,
    LlmParsed,
}

impl DraftSource {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "manual" => Ok(DraftSource::Manual),
            "llm_parsed" => Ok(DraftSource::LlmParsed),
            _ => Err(format!("Invalid draft source: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftSource::Manual => "manual",
            DraftSource::LlmParsed => "llm_parsed",
        }
    }
}

/// An unconfirmed candidate expense awaiting human review.
///
/// Drafts may be entered manually or produced by automated parsing
/// (`source: llm_parsed`), in which case `llm_metadata` carries the
/// parser's free-form provenance (model, confidence, raw text).
/// `validation_warnings` are advisory only; they never block creation,
/// just flag the draft for the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseDraft {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub paid_by: Option<Uuid>,
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub source: String, // Stored as TEXT in DB, use DraftSource enum for type safety
    pub llm_metadata: Option<Json<serde_json::Value>>,
    pub validation_warnings: Json<Vec<String>>,
    /// Proposed splits, applied (or overridden) at approval time
    pub splits: Json<Vec<SplitRequest>>,
    pub status: String, // Stored as TEXT in DB, use DraftStatus enum for type safety
    pub expense_id: Option<Uuid>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl ExpenseDraft {
    /// Get the status as an enum
    pub fn status_enum(&self) -> DraftStatus {
        DraftStatus::from_str(&self.status).unwrap_or(DraftStatus::PendingReview)
    }

    /// Get the source as an enum
    pub fn source_enum(&self) -> DraftSource {
        DraftSource::from_str(&self.source).unwrap_or(DraftSource::Manual)
    }

    /// Whether the draft has been resolved (approved or rejected)
    pub fn is_resolved(&self) -> bool {
        self.status_enum().is_terminal()
    }
}
