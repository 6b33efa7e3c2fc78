//! Borrow request model and status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;
use super::user::UserShort;

/// Borrow request lifecycle status.
///
/// `pending` is the only state with outgoing decisions; `rejected` and
/// `returned` are terminal, `approved` only moves to `returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Returned => "returned",
        }
    }

    /// Whether a librarian decision (approve/reject) is still possible.
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    /// Active requests count against the reader's submission-time cap.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "returned" => Ok(RequestStatus::Returned),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion for RequestStatus (stored as text)
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrow request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: RequestStatus,
    pub requested_days: i32,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<i32>,
    pub rejected_by: Option<i32>,
    pub decided_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Borrow request joined with book and reader for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub user: UserShort,
    pub book: BookShort,
}

/// Counts of requests per status for listing summaries
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct RequestSummary {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub returned: i64,
}

/// Submit request payload (reader)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub book_id: i32,
    /// Requested borrow duration in days; server default applies when omitted
    #[validate(range(min = 1, max = 90, message = "Requested duration must be between 1 and 90 days"))]
    pub requested_days: Option<i32>,
}

/// Approve payload (librarian)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Optional librarian note recorded on the request
    pub notes: Option<String>,
}

/// Reject payload (librarian)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectRequest {
    #[validate(length(min = 1, max = 500, message = "Reason is required and must be at most 500 characters"))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_round_trip() {
        for s in ["pending", "approved", "rejected", "returned"] {
            let parsed: RequestStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("cancelled".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn active_statuses() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Returned.is_active());
    }
}
