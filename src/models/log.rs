//! Book log model (append-only audit trail)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Inventory-affecting event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Borrowed,
    Returned,
    RequestRejected,
    Overdue,
    Lost,
    Damaged,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Borrowed => "borrowed",
            LogAction::Returned => "returned",
            LogAction::RequestRejected => "request_rejected",
            LogAction::Overdue => "overdue",
            LogAction::Lost => "lost",
            LogAction::Damaged => "damaged",
        }
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(LogAction::Borrowed),
            "returned" => Ok(LogAction::Returned),
            "request_rejected" => Ok(LogAction::RequestRejected),
            "overdue" => Ok(LogAction::Overdue),
            "lost" => Ok(LogAction::Lost),
            "damaged" => Ok(LogAction::Damaged),
            _ => Err(format!("Invalid log action: {}", s)),
        }
    }
}

// SQLx conversion for LogAction (stored as text)
impl sqlx::Type<Postgres> for LogAction {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LogAction {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LogAction {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book log entry from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookLog {
    pub id: i32,
    pub action: LogAction,
    pub book_id: i32,
    pub user_id: i32,
    pub librarian_id: Option<i32>,
    pub borrow_request_id: Option<i32>,
    pub notes: Option<String>,
    pub action_date: DateTime<Utc>,
}

/// Log entry joined with book title and user names for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogDetails {
    pub id: i32,
    pub action: LogAction,
    pub book_id: i32,
    pub book_title: String,
    pub user_id: i32,
    pub user_name: String,
    pub librarian_name: Option<String>,
    pub borrow_request_id: Option<i32>,
    pub notes: Option<String>,
    pub action_date: DateTime<Utc>,
}

/// Log query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LogQuery {
    pub book_id: Option<i32>,
    pub user_id: Option<i32>,
    pub action: Option<LogAction>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
