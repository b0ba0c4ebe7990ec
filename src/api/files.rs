//! File API handlers: upload, owner mutations, listings and per-file stats.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{
    DeleteResponse, OwnerFileSummary, OwnerFilesResponse, OwnerForm, ToggleField, ToggleResponse,
    UploadResponse,
};
use crate::services::FileService;

/// Parsed multipart upload body: one file part plus an optional owner id.
struct UploadPayload {
    data: Vec<u8>,
    filename: String,
    owner_id: Option<i64>,
}

/// Read the multipart body, enforcing the size limit while streaming.
async fn read_upload_payload(payload: &mut Multipart, max_size: usize) -> AppResult<UploadPayload> {
    let mut data: Option<Vec<u8>> = None;
    let mut filename = String::new();
    let mut owner_id: Option<i64> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let (name, part_filename) = {
            let cd = field.content_disposition().ok_or_else(|| {
                AppError::InvalidInput("Missing content disposition".to_string())
            })?;
            (
                cd.get_name().unwrap_or("").to_string(),
                cd.get_filename().map(str::to_string),
            )
        };

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if buf.len() + chunk.len() > max_size {
                return Err(AppError::InvalidInput(format!(
                    "file exceeds the maximum upload size of {} bytes",
                    max_size
                )));
            }
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => {
                filename = part_filename.unwrap_or_default();
                data = Some(buf);
            }
            "owner_id" => {
                let raw = String::from_utf8(buf)
                    .map_err(|_| AppError::InvalidInput("owner_id must be text".to_string()))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    owner_id = Some(raw.parse::<i64>().map_err(|_| {
                        AppError::InvalidInput("owner_id must be an integer".to_string())
                    })?);
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| {
        AppError::InvalidInput("multipart body must contain a 'file' part".to_string())
    })?;

    Ok(UploadPayload {
        data,
        filename,
        owner_id,
    })
}

/// Upload a file and mint its share link.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Files",
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Invalid upload", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_file(
    mut payload: Multipart,
    files: web::Data<FileService>,
    max_upload_size: web::Data<usize>,
) -> AppResult<HttpResponse> {
    let parsed = read_upload_payload(&mut payload, *max_upload_size.get_ref()).await?;

    let stored = files
        .upload(parsed.data, &parsed.filename, parsed.owner_id)
        .await?;

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        download_url: files.download_url(&stored.file_code),
        file_code: stored.file_code,
        filename: stored.original_filename,
        size: stored.file_size,
    }))
}

/// Replace the content behind an existing share link.
#[utoipa::path(
    put,
    path = "/api/files/{code}/replace",
    tag = "Files",
    responses(
        (status = 200, description = "Content replaced", body = UploadResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "No active file", body = crate::error::ErrorResponse),
    )
)]
pub async fn replace_file(
    path: web::Path<String>,
    mut payload: Multipart,
    files: web::Data<FileService>,
    max_upload_size: web::Data<usize>,
) -> AppResult<HttpResponse> {
    let code = path.into_inner();
    let parsed = read_upload_payload(&mut payload, *max_upload_size.get_ref()).await?;
    let owner_id = parsed
        .owner_id
        .ok_or_else(|| AppError::InvalidInput("owner_id is required".to_string()))?;

    let updated = files
        .replace(&code, owner_id, parsed.data, &parsed.filename)
        .await?;

    info!("Replaced content of {}", updated.file_code);

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        download_url: files.download_url(&updated.file_code),
        file_code: updated.file_code,
        filename: updated.original_filename,
        size: updated.file_size,
    }))
}

/// Soft-delete an owned file.
#[utoipa::path(
    delete,
    path = "/api/files/{code}",
    tag = "Files",
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "No active file", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_file(
    path: web::Path<String>,
    form: web::Form<OwnerForm>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    let code = path.into_inner();
    files.delete_owned(&code, form.owner_id).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        success: true,
        message: "File deleted".to_string(),
    }))
}

async fn toggle(
    code: &str,
    form: OwnerForm,
    files: &FileService,
    field: ToggleField,
) -> AppResult<HttpResponse> {
    let value = files.toggle_owned(code, form.owner_id, field).await?;

    Ok(HttpResponse::Ok().json(ToggleResponse {
        success: true,
        field: field.as_str().to_string(),
        value,
    }))
}

/// Toggle visit notifications on an owned file.
#[utoipa::path(
    patch,
    path = "/api/files/{code}/notify_visits",
    tag = "Files",
    responses(
        (status = 200, description = "Flag flipped", body = ToggleResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
    )
)]
pub async fn toggle_visit_notifications(
    path: web::Path<String>,
    form: web::Form<OwnerForm>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    toggle(
        &path.into_inner(),
        form.into_inner(),
        files.get_ref(),
        ToggleField::NotifyVisits,
    )
    .await
}

/// Toggle download notifications on an owned file.
#[utoipa::path(
    patch,
    path = "/api/files/{code}/notify_downloads",
    tag = "Files",
    responses(
        (status = 200, description = "Flag flipped", body = ToggleResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
    )
)]
pub async fn toggle_download_notifications(
    path: web::Path<String>,
    form: web::Form<OwnerForm>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    toggle(
        &path.into_inner(),
        form.into_inner(),
        files.get_ref(),
        ToggleField::NotifyDownloads,
    )
    .await
}

/// List an owner's active files, newest upload first.
#[utoipa::path(
    get,
    path = "/api/files/{owner_id}",
    tag = "Files",
    responses(
        (status = 200, description = "Owner's active files", body = OwnerFilesResponse),
    )
)]
pub async fn list_owner_files(
    path: web::Path<String>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    let owner_id = path
        .into_inner()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput("owner id must be an integer".to_string()))?;

    let rows = files.list_by_owner(owner_id).await?;

    let summaries = rows
        .into_iter()
        .map(|f| OwnerFileSummary {
            download_url: files.download_url(&f.file_code),
            file_code: f.file_code,
            filename: f.original_filename,
            size: f.file_size,
            uploaded_at: f.uploaded_at,
            notify_visits: f.notify_on_visit,
            notify_downloads: f.notify_on_download,
        })
        .collect();

    Ok(HttpResponse::Ok().json(OwnerFilesResponse { files: summaries }))
}

/// Public per-file stats plus the last 10 log rows.
#[utoipa::path(
    get,
    path = "/api/stats/{code}",
    tag = "Files",
    responses(
        (status = 200, description = "Per-file stats", body = crate::models::FileStatsResponse),
        (status = 404, description = "No active file", body = crate::error::ErrorResponse),
    )
)]
pub async fn file_stats(
    path: web::Path<String>,
    files: web::Data<FileService>,
) -> AppResult<HttpResponse> {
    let stats = files.stats(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configure file routes under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/upload").route(web::post().to(upload_file)))
        .service(web::resource("/files/{code}/replace").route(web::put().to(replace_file)))
        .service(
            web::resource("/files/{code}/notify_visits")
                .route(web::patch().to(toggle_visit_notifications)),
        )
        .service(
            web::resource("/files/{code}/notify_downloads")
                .route(web::patch().to(toggle_download_notifications)),
        )
        .service(
            web::resource("/files/{id_or_code}")
                .route(web::get().to(list_owner_files))
                .route(web::delete().to(delete_file)),
        )
        .service(web::resource("/stats/{code}").route(web::get().to(file_stats)));
}
