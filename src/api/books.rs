//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        user::Role,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List books with search and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    let (books, total) = state.services.catalog.search_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a new book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Librarian role required"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_role(Role::Librarian)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_role(Role::Librarian)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update_book(id, payload).await?;
    Ok(Json(book))
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has active borrow requests")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(Role::Librarian)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
