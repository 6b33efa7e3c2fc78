//! API handlers for Maktaba REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod librarian;
pub mod openapi;
pub mod requests;
pub mod stats;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::Unauthenticated("Missing or malformed authorization header".to_string())
            })?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
