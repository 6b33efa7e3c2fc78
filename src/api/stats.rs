//! Statistics endpoints (admin dashboard)

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{request::RequestSummary, user::Role},
};

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Catalog statistics
    pub books: BookStats,
    /// User statistics
    pub users: UserStats,
    /// Borrow request counts per status
    pub requests: RequestSummary,
    /// Audit log entry counts per action
    pub logs_by_action: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct BookStats {
    /// Number of titles in the catalog
    pub titles: i64,
    /// Copies across all titles
    pub total_copies: i64,
    /// Copies currently on the shelf
    pub available_copies: i64,
    /// Copies currently out with readers
    pub borrowed_copies: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserStats {
    /// Total number of accounts
    pub total: i64,
    /// Accounts by role
    pub by_role: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_role(Role::Admin)?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
