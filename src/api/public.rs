//! Public web endpoints: landing page, download, 404.
//!
//! Every hit on an active file logs exactly one access row before the
//! response goes out; notification dispatch happens off the request path.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::AccessType;
use crate::services::FileService;

/// Resolve the client IP: first X-Forwarded-For entry, else peer address.
pub fn client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Minimal HTML escaping for values interpolated into inline pages.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Landing page for a share link. Logs a "visit".
pub async fn landing_page(
    req: HttpRequest,
    path: web::Path<String>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    let code = path.into_inner();
    let file = match files.resolve_active(&code).await {
        Ok(file) => file,
        // Unknown short links get the rendered 404 page, not an API error
        Err(AppError::NotFound(_)) => return Ok(not_found_html()),
        Err(e) => return Err(e),
    };

    let ip = client_ip(&req);
    let ua = user_agent(&req);
    if let Err(e) = files
        .record_access_and_notify(&file, AccessType::Visit, &ip, &ua)
        .await
    {
        warn!("Failed to record visit for {}: {}", code, e);
    }

    let name = escape_html(&file.original_filename);
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{name} - Droply</title></head>\n\
         <body>\n<h1>{name}</h1>\n<p>{size} bytes</p>\n\
         <p><a href=\"/download/{code}\">Download</a></p>\n</body>\n</html>\n",
        name = name,
        size = file.file_size,
        code = escape_html(&code),
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Stream a file's bytes. Logs a "download".
///
/// 404 whether the record or the underlying object is missing; callers can't
/// tell the two apart.
pub async fn download_file(
    req: HttpRequest,
    path: web::Path<String>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    let code = path.into_inner();
    let (file, data) = files.download(&code).await?;

    let ip = client_ip(&req);
    let ua = user_agent(&req);
    if let Err(e) = files
        .record_access_and_notify(&file, AccessType::Download, &ip, &ua)
        .await
    {
        warn!("Failed to record download for {}: {}", code, e);
    }

    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&file.original_filename)
    );

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(data))
}

/// Root page, shown when no static upload form is configured.
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Droply</title></head>\n\
             <body>\n<h1>Droply</h1>\n<p>Convenient file sharing. POST a file to /api/upload \
             and share the returned link.</p>\n</body>\n</html>\n",
        )
}

fn not_found_html() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Droply - page not found</title></head>\n\
             <body>\n<h1>404</h1>\n<p>Page not found.</p>\n</body>\n</html>\n",
        )
}

/// Rendered 404 page for unknown web routes.
pub async fn not_found_page() -> HttpResponse {
    not_found_html()
}

/// Configure public web routes. The short-link route matches any single
/// path segment, so it must be registered after every other route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/download/{code}").route(web::get().to(download_file)))
        .service(web::resource("/{code}").route(web::get().to(landing_page)));
}
