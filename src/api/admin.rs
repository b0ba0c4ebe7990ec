//! Admin API handlers.
//!
//! Every handler authorizes the caller's numeric id against the configured
//! allow-list before touching the admin service.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::AdminRegistry;
use crate::error::AppResult;
use crate::models::{
    AdminFilesQuery, AdminLogsQuery, AdminQuery, BroadcastForm, DeleteForm, DeleteResponse,
    ToggleForm, ToggleResponse,
};
use crate::services::AdminService;

/// Aggregate dashboard counters.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Dashboard aggregates", body = crate::models::AdminStatsResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_stats(
    query: web::Query<AdminQuery>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(query.admin_id)?;

    let stats = admin.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Paginated, searchable listing of active files.
#[utoipa::path(
    get,
    path = "/api/admin/files",
    tag = "Admin",
    responses(
        (status = 200, description = "One page of files", body = crate::models::AdminFilesResponse),
        (status = 400, description = "Bad pagination bounds", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_files(
    query: web::Query<AdminFilesQuery>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(query.admin_id)?;

    let page = admin
        .list_files(query.q.as_deref(), query.page, query.size)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Paginated access logs for one code.
#[utoipa::path(
    get,
    path = "/api/admin/logs/{code}",
    tag = "Admin",
    responses(
        (status = 200, description = "One page of log rows", body = crate::models::AdminLogsResponse),
        (status = 400, description = "Bad pagination bounds", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_logs(
    path: web::Path<String>,
    query: web::Query<AdminLogsQuery>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(query.admin_id)?;

    let page = admin
        .logs(&path.into_inner(), query.page, query.size)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Export every log row for one code as CSV.
#[utoipa::path(
    get,
    path = "/api/admin/logs/{code}/export.csv",
    tag = "Admin",
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_export_csv(
    path: web::Path<String>,
    query: web::Query<AdminQuery>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(query.admin_id)?;

    let code = path.into_inner();
    let csv = admin.export_logs_csv(&code).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"logs_{}.csv\"", code),
        ))
        .body(csv))
}

/// Flip a notification flag by field name on any active file.
#[utoipa::path(
    patch,
    path = "/api/admin/files/{code}/toggle",
    tag = "Admin",
    responses(
        (status = 200, description = "Flag flipped", body = ToggleResponse),
        (status = 400, description = "Unknown field name", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "No active file", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_toggle(
    path: web::Path<String>,
    form: web::Form<ToggleForm>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(form.admin_id)?;

    let (field, value) = admin.toggle(&path.into_inner(), &form.field).await?;

    Ok(HttpResponse::Ok().json(ToggleResponse {
        success: true,
        field: field.as_str().to_string(),
        value,
    }))
}

/// Deactivate any file by code, idempotently.
#[utoipa::path(
    delete,
    path = "/api/admin/files/{code}",
    tag = "Admin",
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown code", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_delete(
    path: web::Path<String>,
    form: web::Form<DeleteForm>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(form.admin_id)?;

    let code = path.into_inner();
    admin.delete(&code).await?;
    info!("Admin deleted file {}", code);

    Ok(HttpResponse::Ok().json(DeleteResponse {
        success: true,
        message: "File deleted by admin".to_string(),
    }))
}

/// Broadcast a message to every distinct owner.
#[utoipa::path(
    post,
    path = "/api/admin/broadcast",
    tag = "Admin",
    responses(
        (status = 200, description = "Delivery counts", body = crate::models::BroadcastResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_broadcast(
    form: web::Form<BroadcastForm>,
    admins: web::Data<AdminRegistry>,
    admin: web::Data<AdminService>,
) -> AppResult<HttpResponse> {
    admins.authorize(form.admin_id)?;

    let result = admin.broadcast(&form.message).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Configure admin routes under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/stats").route(web::get().to(admin_stats)))
            .service(web::resource("/files").route(web::get().to(admin_files)))
            .service(
                web::resource("/logs/{code}/export.csv").route(web::get().to(admin_export_csv)),
            )
            .service(web::resource("/logs/{code}").route(web::get().to(admin_logs)))
            .service(web::resource("/files/{code}/toggle").route(web::patch().to(admin_toggle)))
            .service(web::resource("/files/{code}").route(web::delete().to(admin_delete)))
            .service(web::resource("/broadcast").route(web::post().to(admin_broadcast))),
    );
}
