//! File service: the owning logic around file rows and their stored bytes.
//!
//! Ownership is enforced identically across toggle/delete/replace: a single
//! check, repeated per operation. There is no admin bypass here; admin
//! operations live in `services::admin` behind their own authorization.

use chrono::Utc;
use sea_orm::{DbErr, SqlErr};
use tracing::{info, warn};

use crate::db::access_logs::NewAccess;
use crate::db::files::NewFile;
use crate::db::DbPool;
use crate::entity::file;
use crate::error::{AppError, AppResult};
use crate::models::{AccessType, FileStatsResponse, ToggleField};
use crate::services::notify::render_access_notification;
use crate::services::{codes, GeoClient, Notifier, Storage};

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Service for upload, download, owner mutations and access recording.
#[derive(Clone)]
pub struct FileService {
    pool: DbPool,
    storage: Storage,
    geo: GeoClient,
    notifier: Notifier,
    public_base_url: String,
}

impl FileService {
    pub fn new(
        pool: DbPool,
        storage: Storage,
        geo: GeoClient,
        notifier: Notifier,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            storage,
            geo,
            notifier,
            public_base_url: public_base_url.into(),
        }
    }

    /// Public share link for a short code.
    pub fn download_url(&self, code: &str) -> String {
        format!("{}/{}", self.public_base_url, code)
    }

    /// Store uploaded content and create its file row.
    ///
    /// The recorded size comes from the persisted byte count, never from
    /// client-declared metadata. A short-code collision at insert time is
    /// retried once with a fresh code.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        owner_id: Option<i64>,
    ) -> AppResult<file::Model> {
        let stored = codes::stored_filename(original_filename);
        let display_name = if original_filename.is_empty() {
            stored.clone()
        } else {
            original_filename.to_string()
        };
        let size = data.len() as i64;

        self.storage.put(&Storage::file_key(&stored), data).await?;

        let new_row = |code: String| NewFile {
            file_code: code,
            original_filename: display_name.clone(),
            stored_filename: stored.clone(),
            file_size: size,
            owner_id,
            uploaded_at: Utc::now(),
        };

        let inserted = match self.pool.insert_file(new_row(codes::short_code())).await {
            Ok(m) => m,
            Err(e) if is_unique_violation(&e) => {
                warn!("Short code collision on insert, regenerating");
                self.pool
                    .insert_file(new_row(codes::short_code()))
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to insert file: {}", e)))?
            }
            Err(e) => return Err(AppError::Database(format!("Failed to insert file: {}", e))),
        };

        info!(
            "Stored {} as {} ({} bytes)",
            inserted.original_filename, inserted.file_code, size
        );

        Ok(inserted)
    }

    /// Look up an active file by short code; inactive rows are invisible here.
    pub async fn resolve_active(&self, code: &str) -> AppResult<file::Model> {
        self.pool
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))
    }

    /// Record one visit/download and dispatch the owner notification.
    ///
    /// The geo lookup is awaited (bounded by its own timeout) so the log row
    /// carries the place; the log write itself is unconditional. The
    /// notification is spawned after the write commits and never awaited.
    pub async fn record_access_and_notify(
        &self,
        file: &file::Model,
        access: AccessType,
        ip: &str,
        user_agent: &str,
    ) -> AppResult<()> {
        let (country, city) = self.geo.lookup(ip).await;

        self.pool
            .insert_access(NewAccess {
                file_code: file.file_code.clone(),
                access_type: access,
                ip_address: ip.to_string(),
                user_agent: user_agent.to_string(),
                access_time: Utc::now(),
                country: country.clone(),
                city: city.clone(),
            })
            .await?;

        let wanted = match access {
            AccessType::Visit => file.notify_on_visit,
            AccessType::Download => file.notify_on_download,
        };

        if let Some(owner) = file.owner_id
            && wanted
        {
            let text = render_access_notification(
                access,
                &file.original_filename,
                &self.download_url(&file.file_code),
                Utc::now(),
                ip,
                &country,
                &city,
            );
            self.notifier.dispatch(owner, text);
        }

        Ok(())
    }

    /// Fetch an active file's bytes. A missing row and missing bytes are both
    /// `NotFound`: callers surface them identically as 404.
    pub async fn download(&self, code: &str) -> AppResult<(file::Model, Vec<u8>)> {
        let file = self.resolve_active(code).await?;
        let data = self
            .storage
            .get(&Storage::file_key(&file.stored_filename))
            .await?;
        Ok((file, data))
    }

    /// An owner's active files, newest upload first.
    pub async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<file::Model>> {
        self.pool.list_files_by_owner(owner_id).await
    }

    /// Public per-file stats: counters plus the last 10 log rows.
    pub async fn stats(&self, code: &str) -> AppResult<FileStatsResponse> {
        let file = self.resolve_active(code).await?;

        let visits = self
            .pool
            .count_accesses(Some(code), AccessType::Visit, None)
            .await?;
        let downloads = self
            .pool
            .count_accesses(Some(code), AccessType::Download, None)
            .await?;
        let recent = self.pool.recent_accesses(code, 10).await?;

        Ok(FileStatsResponse {
            file_code: file.file_code,
            filename: file.original_filename,
            size: file.file_size,
            visits,
            downloads,
            notify_visits: file.notify_on_visit,
            notify_downloads: file.notify_on_download,
            recent_activity: recent.into_iter().map(Into::into).collect(),
        })
    }

    /// Soft-delete an owned file and drop its stored bytes.
    pub async fn delete_owned(&self, code: &str, requester: i64) -> AppResult<()> {
        let file = self.resolve_active(code).await?;
        ensure_owner(&file, requester)?;

        self.storage
            .delete(&Storage::file_key(&file.stored_filename))
            .await?;
        self.pool.deactivate_file(file).await?;

        Ok(())
    }

    /// Flip one notification flag on an owned file; returns the new value.
    pub async fn toggle_owned(
        &self,
        code: &str,
        requester: i64,
        field: ToggleField,
    ) -> AppResult<bool> {
        let file = self.resolve_active(code).await?;
        ensure_owner(&file, requester)?;

        let new_value = !field.current(&file);
        self.pool.set_notify_flag(file, field, new_value).await?;

        Ok(new_value)
    }

    /// Replace the content of an owned file. The short code, owner and
    /// notification flags survive; name, size and upload time are updated.
    pub async fn replace(
        &self,
        code: &str,
        requester: i64,
        data: Vec<u8>,
        new_filename: &str,
    ) -> AppResult<file::Model> {
        let file = self.resolve_active(code).await?;
        ensure_owner(&file, requester)?;

        // Best-effort removal of the old object
        if let Err(e) = self
            .storage
            .delete(&Storage::file_key(&file.stored_filename))
            .await
        {
            warn!("Failed to delete old object for {}: {}", file.file_code, e);
        }

        let stored = codes::stored_filename(new_filename);
        let display_name = if new_filename.is_empty() {
            stored.clone()
        } else {
            new_filename.to_string()
        };
        let size = data.len() as i64;

        self.storage.put(&Storage::file_key(&stored), data).await?;

        let updated = self
            .pool
            .apply_replacement(file, display_name, stored, size, Utc::now())
            .await?;

        Ok(updated)
    }
}

fn ensure_owner(file: &file::Model, requester: i64) -> AppResult<()> {
    if file.owner_id == Some(requester) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you do not own this file".to_string(),
        ))
    }
}
