//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Droply",
        version = "0.4.0",
        description = "File-sharing relay: upload files, share short-code links, track visits and downloads"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // File endpoints
        api::files::upload_file,
        api::files::replace_file,
        api::files::delete_file,
        api::files::toggle_visit_notifications,
        api::files::toggle_download_notifications,
        api::files::list_owner_files,
        api::files::file_stats,
        // Admin endpoints
        api::admin::admin_stats,
        api::admin::admin_files,
        api::admin::admin_logs,
        api::admin::admin_export_csv,
        api::admin::admin_toggle,
        api::admin::admin_delete,
        api::admin::admin_broadcast,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Files
            models::AccessType,
            models::AccessLogView,
            models::UploadResponse,
            models::OwnerFileSummary,
            models::OwnerFilesResponse,
            models::FileStatsResponse,
            models::ToggleResponse,
            models::DeleteResponse,
            models::OwnerForm,
            // Admin
            models::AdminQuery,
            models::AdminStatsResponse,
            models::TopFileEntry,
            models::AdminFilesQuery,
            models::AdminFileView,
            models::AdminFilesResponse,
            models::AdminLogsQuery,
            models::AdminLogsResponse,
            models::ToggleForm,
            models::DeleteForm,
            models::BroadcastForm,
            models::BroadcastResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Files", description = "Upload, download and owner management"),
        (name = "Admin", description = "Stats, moderation and broadcast")
    )
)]
pub struct ApiDoc;
