//! Librarian endpoints: request review, inventory, audit log

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{InventoryEntry, InventorySummary},
        log::{LogDetails, LogQuery},
        request::{ApproveRequest, BorrowRequest, RejectRequest, RequestDetails, RequestSummary},
        user::Role,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Pending requests listing
#[derive(Serialize, ToSchema)]
pub struct PendingRequestsResponse {
    pub requests: Vec<RequestDetails>,
    pub count: usize,
}

/// Full request listing with status summary
#[derive(Serialize, ToSchema)]
pub struct AllRequestsResponse {
    pub requests: Vec<RequestDetails>,
    pub summary: RequestSummary,
}

/// Outcome of a librarian decision
#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    pub message: String,
    pub request: BorrowRequest,
}

/// Inventory listing with aggregate summary
#[derive(Serialize, ToSchema)]
pub struct InventoryResponse {
    pub summary: InventorySummary,
    pub books: Vec<InventoryEntry>,
}

/// List pending requests, oldest first (FIFO review order)
#[utoipa::path(
    get,
    path = "/librarian/requests/pending",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests", body = PendingRequestsResponse),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn pending_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<PendingRequestsResponse>> {
    claims.require_role(Role::Librarian)?;

    let requests = state.services.ledger.list_pending().await?;
    let count = requests.len();

    Ok(Json(PendingRequestsResponse { requests, count }))
}

/// List all requests with a status summary, most recent first
#[utoipa::path(
    get,
    path = "/librarian/requests",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All requests", body = AllRequestsResponse),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn all_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AllRequestsResponse>> {
    claims.require_role(Role::Librarian)?;

    let (requests, summary) = state.services.ledger.list_all().await?;
    Ok(Json(AllRequestsResponse { requests, summary }))
}

/// Approve a pending borrow request
#[utoipa::path(
    post,
    path = "/librarian/requests/{id}/approve",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Request approved", body = DecisionResponse),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed"),
        (status = 422, description = "Book unavailable or borrower limit reached")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Json<DecisionResponse>> {
    claims.require_role(Role::Librarian)?;

    let request = state
        .services
        .ledger
        .approve(id, claims.user_id, payload.notes)
        .await?;

    Ok(Json(DecisionResponse {
        message: "Book request approved successfully".to_string(),
        request,
    }))
}

/// Reject a pending borrow request with a reason
#[utoipa::path(
    post,
    path = "/librarian/requests/{id}/reject",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = DecisionResponse),
        (status = 400, description = "Missing or overlong reason"),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<DecisionResponse>> {
    claims.require_role(Role::Librarian)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = state
        .services
        .ledger
        .reject(id, claims.user_id, &payload.reason)
        .await?;

    Ok(Json(DecisionResponse {
        message: "Book request rejected successfully".to_string(),
        request,
    }))
}

/// Record the return of a borrowed book
#[utoipa::path(
    post,
    path = "/librarian/requests/{id}/return",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = DecisionResponse),
        (status = 400, description = "Request is not an open loan"),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DecisionResponse>> {
    claims.require_role(Role::Librarian)?;

    let request = state.services.ledger.mark_returned(id, claims.user_id).await?;

    Ok(Json(DecisionResponse {
        message: "Book returned successfully".to_string(),
        request,
    }))
}

/// Current inventory with per-title counts and catalog-wide summary
#[utoipa::path(
    get,
    path = "/librarian/inventory",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library inventory", body = InventoryResponse),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<InventoryResponse>> {
    claims.require_role(Role::Librarian)?;

    let (summary, books) = state.services.ledger.inventory().await?;
    Ok(Json(InventoryResponse { summary, books }))
}

/// Browse the audit log, newest first
#[utoipa::path(
    get,
    path = "/librarian/logs",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(LogQuery),
    responses(
        (status = 200, description = "Book log entries", body = PaginatedResponse<LogDetails>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn list_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<PaginatedResponse<LogDetails>>> {
    claims.require_role(Role::Librarian)?;

    let (logs, total) = state.services.ledger.list_logs(&query).await?;

    Ok(Json(PaginatedResponse {
        items: logs,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}
