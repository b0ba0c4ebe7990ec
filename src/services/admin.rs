//! Admin service: aggregates, listings, CSV export, moderation, broadcast.
//!
//! Authorization happens at the HTTP layer via `auth::AdminRegistry`; every
//! method here assumes the caller was already allowed.

use chrono::{Duration, Utc};
use tracing::info;

use crate::db::DbPool;
use crate::entity::file_access;
use crate::error::{AppError, AppResult};
use crate::models::{
    AccessType, AdminFileView, AdminFilesResponse, AdminLogsResponse, AdminStatsResponse,
    BroadcastResponse, ToggleField,
};
use crate::services::{Notifier, Storage};

/// Upper bound on the admin file-listing page size.
pub const FILES_PAGE_SIZE_MAX: u64 = 100;

/// Upper bound on the admin log-listing page size.
pub const LOGS_PAGE_SIZE_MAX: u64 = 200;

/// Exact CSV header for log exports.
pub const CSV_HEADER: &str = "time,type,ip,country,city,user_agent";

/// Service behind the admin surface.
#[derive(Clone)]
pub struct AdminService {
    pool: DbPool,
    storage: Storage,
    notifier: Notifier,
    public_base_url: String,
}

impl AdminService {
    pub fn new(
        pool: DbPool,
        storage: Storage,
        notifier: Notifier,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            storage,
            notifier,
            public_base_url: public_base_url.into(),
        }
    }

    fn download_url(&self, code: &str) -> String {
        format!("{}/{}", self.public_base_url, code)
    }

    /// Aggregate dashboard counters plus the top-10 downloads.
    pub async fn stats(&self) -> AppResult<AdminStatsResponse> {
        let week_ago = Utc::now() - Duration::days(7);

        let total_files = self.pool.count_active_files(None).await?;
        let total_bytes = self.pool.sum_active_bytes(None).await?;
        let total_visits = self
            .pool
            .count_accesses(None, AccessType::Visit, None)
            .await?;
        let total_downloads = self
            .pool
            .count_accesses(None, AccessType::Download, None)
            .await?;

        let files_this_week = self.pool.count_active_files(Some(week_ago)).await?;
        let bytes_this_week = self.pool.sum_active_bytes(Some(week_ago)).await?;
        let visits_this_week = self
            .pool
            .count_accesses(None, AccessType::Visit, Some(week_ago))
            .await?;
        let downloads_this_week = self
            .pool
            .count_accesses(None, AccessType::Download, Some(week_ago))
            .await?;

        let top_files = self.pool.top_downloaded(10).await?;

        Ok(AdminStatsResponse {
            total_files,
            total_bytes,
            total_visits,
            total_downloads,
            files_this_week,
            bytes_this_week,
            visits_this_week,
            downloads_this_week,
            top_files,
        })
    }

    /// Paginated, searchable listing of active files.
    pub async fn list_files(
        &self,
        q: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> AppResult<AdminFilesResponse> {
        validate_page(page, page_size, FILES_PAGE_SIZE_MAX)?;

        let (rows, total) = self.pool.search_files(q, page, page_size).await?;

        let files = rows
            .into_iter()
            .map(|f| AdminFileView {
                download_url: self.download_url(&f.file_code),
                file_code: f.file_code,
                filename: f.original_filename,
                size: f.file_size,
                uploaded_at: f.uploaded_at,
                owner_id: f.owner_id,
                notify_visits: f.notify_on_visit,
                notify_downloads: f.notify_on_download,
            })
            .collect();

        Ok(AdminFilesResponse {
            total,
            page,
            size: page_size,
            files,
        })
    }

    /// Paginated access logs for a code, newest first. History is served for
    /// deactivated files too.
    pub async fn logs(&self, code: &str, page: u64, page_size: u64) -> AppResult<AdminLogsResponse> {
        validate_page(page, page_size, LOGS_PAGE_SIZE_MAX)?;

        let (rows, total) = self.pool.page_accesses(code, page, page_size).await?;

        Ok(AdminLogsResponse {
            total,
            page,
            size: page_size,
            logs: rows.into_iter().map(Into::into).collect(),
        })
    }

    /// All log rows for a code as CSV, oldest first.
    pub async fn export_logs_csv(&self, code: &str) -> AppResult<String> {
        let rows = self.pool.all_accesses_asc(code).await?;
        Ok(render_logs_csv(&rows))
    }

    /// Flip a notification flag by field name on an active file.
    pub async fn toggle(&self, code: &str, field_name: &str) -> AppResult<(ToggleField, bool)> {
        let field = ToggleField::parse(field_name).ok_or_else(|| {
            AppError::InvalidInput(format!("unknown toggle field '{}'", field_name))
        })?;

        let file = self
            .pool
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))?;

        let new_value = !field.current(&file);
        self.pool.set_notify_flag(file, field, new_value).await?;

        Ok((field, new_value))
    }

    /// Deactivate any file by code and drop its stored bytes.
    ///
    /// Unlike the owner path this sees inactive rows, so a repeated delete
    /// succeeds; only a code that never existed is `NotFound`.
    pub async fn delete(&self, code: &str) -> AppResult<()> {
        let file = self
            .pool
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))?;

        self.storage
            .delete(&Storage::file_key(&file.stored_filename))
            .await?;

        if file.is_active {
            self.pool.deactivate_file(file).await?;
        }

        Ok(())
    }

    /// Send a message to every distinct owner, active or not. Per-recipient
    /// failures are counted, not reported.
    pub async fn broadcast(&self, message: &str) -> AppResult<BroadcastResponse> {
        let owners = self.pool.distinct_owner_ids().await?;
        let attempted = owners.len();

        let mut delivered = 0;
        for owner in owners {
            if self.notifier.notify(owner, message).await {
                delivered += 1;
            }
        }

        info!("Broadcast delivered to {}/{} owners", delivered, attempted);

        Ok(BroadcastResponse {
            success: true,
            delivered,
            attempted,
        })
    }
}

fn validate_page(page: u64, page_size: u64, max_size: u64) -> AppResult<()> {
    if page < 1 {
        return Err(AppError::InvalidInput("page must be >= 1".to_string()));
    }
    if page_size < 1 || page_size > max_size {
        return Err(AppError::InvalidInput(format!(
            "size must be between 1 and {}",
            max_size
        )));
    }
    Ok(())
}

/// Render log rows as CSV with the fixed export header.
pub fn render_logs_csv(rows: &[file_access::Model]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");

    for row in rows {
        let fields = [
            row.access_time.to_rfc3339(),
            row.access_type.clone(),
            row.ip_address.clone(),
            row.country.clone(),
            row.city.clone(),
            row.user_agent.clone(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }

    out
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
