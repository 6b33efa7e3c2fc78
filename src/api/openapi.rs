//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, librarian, requests, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maktaba API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Maktaba Team", email = "contact@maktaba.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Requests (reader)
        requests::submit_request,
        requests::my_requests,
        // Librarian
        librarian::pending_requests,
        librarian::all_requests,
        librarian::approve_request,
        librarian::reject_request,
        librarian::return_request,
        librarian::inventory,
        librarian::list_logs,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::UserInfo,
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            crate::models::user::LoginUser,
            crate::models::user::Role,
            crate::models::user::UserShort,
            // Books
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookShort,
            crate::models::book::InventoryEntry,
            crate::models::book::InventorySummary,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::RequestSummary,
            crate::models::request::CreateRequest,
            crate::models::request::ApproveRequest,
            crate::models::request::RejectRequest,
            // Logs
            crate::models::log::BookLog,
            crate::models::log::LogDetails,
            crate::models::log::LogAction,
            // Librarian
            librarian::PendingRequestsResponse,
            librarian::AllRequestsResponse,
            librarian::DecisionResponse,
            librarian::InventoryResponse,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::UserStats,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "books", description = "Book catalog"),
        (name = "requests", description = "Reader borrow requests"),
        (name = "librarian", description = "Request review and inventory"),
        (name = "stats", description = "Aggregate statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
