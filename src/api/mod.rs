//! API endpoint modules.

use actix_web::HttpResponse;

pub mod admin;
pub mod files;
pub mod health;
pub mod openapi;
pub mod public;

pub use admin::configure_routes as configure_admin_routes;
pub use files::configure_routes as configure_file_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use public::{configure_routes as configure_public_routes, not_found_page};

/// JSON 404 for unknown API routes.
pub async fn api_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(crate::error::ErrorResponse {
        error: "NOT_FOUND".to_string(),
        message: "Unknown API route".to_string(),
    })
}
