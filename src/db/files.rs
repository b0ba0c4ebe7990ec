//! Database queries for file rows.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::file::{self, Entity as File};
use crate::error::{AppError, AppResult};
use crate::models::ToggleField;

use super::DbPool;

/// Fields for a new file row. Notify flags and `is_active` always start true.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub file_code: String,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_size: i64,
    pub owner_id: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
}

/// Case-insensitive substring match on filename OR short code.
fn name_or_code_matches(q: &str) -> Condition {
    let pattern = format!("%{}%", q.to_lowercase());
    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((
                file::Entity,
                file::Column::OriginalFilename,
            ))))
            .like(pattern.clone()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((
                file::Entity,
                file::Column::FileCode,
            ))))
            .like(pattern),
        )
}

impl DbPool {
    /// Insert a new file row.
    ///
    /// Returns the raw `DbErr` so the caller can recognize a unique-constraint
    /// violation on the short code and regenerate it.
    pub async fn insert_file(&self, new: NewFile) -> Result<file::Model, DbErr> {
        let model = file::ActiveModel {
            file_code: Set(new.file_code),
            original_filename: Set(new.original_filename),
            stored_filename: Set(new.stored_filename),
            file_size: Set(new.file_size),
            owner_id: Set(new.owner_id),
            uploaded_at: Set(new.uploaded_at),
            notify_on_visit: Set(true),
            notify_on_download: Set(true),
            is_active: Set(true),
            ..Default::default()
        };

        model.insert(self.connection()).await
    }

    /// Find an active file by its short code.
    pub async fn find_active_by_code(&self, code: &str) -> AppResult<Option<file::Model>> {
        let result = File::find()
            .filter(file::Column::FileCode.eq(code))
            .filter(file::Column::IsActive.eq(true))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up file: {}", e)))?;

        Ok(result)
    }

    /// Find a file by short code regardless of active state (admin paths).
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<file::Model>> {
        let result = File::find()
            .filter(file::Column::FileCode.eq(code))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up file: {}", e)))?;

        Ok(result)
    }

    /// List an owner's active files, newest upload first.
    pub async fn list_files_by_owner(&self, owner_id: i64) -> AppResult<Vec<file::Model>> {
        let result = File::find()
            .filter(file::Column::OwnerId.eq(owner_id))
            .filter(file::Column::IsActive.eq(true))
            .order_by_desc(file::Column::UploadedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list owner files: {}", e)))?;

        Ok(result)
    }

    /// Soft-delete a file row.
    pub async fn deactivate_file(&self, m: file::Model) -> AppResult<file::Model> {
        let mut active: file::ActiveModel = m.into();
        active.is_active = Set(false);

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to deactivate file: {}", e)))?;

        Ok(updated)
    }

    /// Set one notification flag.
    pub async fn set_notify_flag(
        &self,
        m: file::Model,
        field: ToggleField,
        value: bool,
    ) -> AppResult<file::Model> {
        let mut active: file::ActiveModel = m.into();
        match field {
            ToggleField::NotifyVisits => active.notify_on_visit = Set(value),
            ToggleField::NotifyDownloads => active.notify_on_download = Set(value),
        }

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update notify flag: {}", e)))?;

        Ok(updated)
    }

    /// Apply a content replacement: new object key, display name, size and
    /// upload time. Short code, owner and notify flags are untouched.
    pub async fn apply_replacement(
        &self,
        m: file::Model,
        original_filename: String,
        stored_filename: String,
        file_size: i64,
        uploaded_at: DateTime<Utc>,
    ) -> AppResult<file::Model> {
        let mut active: file::ActiveModel = m.into();
        active.original_filename = Set(original_filename);
        active.stored_filename = Set(stored_filename);
        active.file_size = Set(file_size);
        active.uploaded_at = Set(uploaded_at);

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to replace file: {}", e)))?;

        Ok(updated)
    }

    /// Search active files, newest upload first, offset-paginated.
    /// Returns the page plus the total match count.
    pub async fn search_files(
        &self,
        q: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<file::Model>, u64)> {
        let mut query = File::find().filter(file::Column::IsActive.eq(true));

        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(name_or_code_matches(q));
        }

        let paginator = query
            .order_by_desc(file::Column::UploadedAt)
            .paginate(self.connection(), page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(format!("Failed to count files: {}", e)))?;

        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch file page: {}", e)))?;

        Ok((rows, total))
    }

    /// Count active files, optionally restricted to uploads since `cutoff`.
    pub async fn count_active_files(&self, since: Option<DateTime<Utc>>) -> AppResult<u64> {
        let mut query = File::find().filter(file::Column::IsActive.eq(true));
        if let Some(cutoff) = since {
            query = query.filter(file::Column::UploadedAt.gte(cutoff));
        }

        let count = query
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count files: {}", e)))?;

        Ok(count)
    }

    /// Total bytes across active files, optionally restricted to uploads
    /// since `cutoff`.
    pub async fn sum_active_bytes(&self, since: Option<DateTime<Utc>>) -> AppResult<i64> {
        let mut query = File::find()
            .select_only()
            // SUM(bigint) is NUMERIC on PostgreSQL; cast so it decodes as i64
            .column_as(Expr::cust("CAST(SUM(file_size) AS BIGINT)"), "total")
            .filter(file::Column::IsActive.eq(true));

        if let Some(cutoff) = since {
            query = query.filter(file::Column::UploadedAt.gte(cutoff));
        }

        let total: Option<Option<i64>> = query
            .into_tuple()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to sum file sizes: {}", e)))?;

        Ok(total.flatten().unwrap_or(0))
    }

    /// Distinct owner ids across all rows, active and inactive.
    pub async fn distinct_owner_ids(&self) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = File::find()
            .select_only()
            .column(file::Column::OwnerId)
            .filter(file::Column::OwnerId.is_not_null())
            .distinct()
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to collect owner ids: {}", e)))?;

        Ok(ids)
    }
}
