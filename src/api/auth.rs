//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginUser, RegisterUser, Role, User},
};

use super::AuthenticatedUser;

/// Public view of a user account
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserInfo,
}

/// Register a new reader account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(payload): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.auth.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<LoginUser>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.auth.login(&payload).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    }))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.auth.current_user(&claims).await?;
    Ok(Json(user.into()))
}
