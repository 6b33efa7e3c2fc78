//! Reader-facing borrow request endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{BorrowRequest, CreateRequest, RequestDetails},
        user::Role,
    },
};

use super::AuthenticatedUser;

/// Submit a borrow request for a book
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowRequest),
        (status = 403, description = "Reader role required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Duplicate pending request"),
        (status = 422, description = "Borrowing limit reached or book unavailable")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    claims.require_role(Role::Reader)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = state
        .services
        .ledger
        .submit_request(claims.user_id, payload.book_id, payload.requested_days)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the authenticated reader's requests, most recent first
#[utoipa::path(
    get,
    path = "/my-requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reader's borrow requests", body = Vec<RequestDetails>),
        (status = 403, description = "Reader role required")
    )
)]
pub async fn my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    claims.require_role(Role::Reader)?;

    let requests = state.services.ledger.list_for_reader(claims.user_id).await?;
    Ok(Json(requests))
}
