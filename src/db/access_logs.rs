//! Database queries for access log rows.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::JoinType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};

use crate::entity::file;
use crate::entity::file_access::{self, Entity as FileAccess};
use crate::error::{AppError, AppResult};
use crate::models::{AccessType, TopFileEntry};

use super::DbPool;

/// Fields for a new access log row.
#[derive(Debug, Clone)]
pub struct NewAccess {
    pub file_code: String,
    pub access_type: AccessType,
    pub ip_address: String,
    pub user_agent: String,
    pub access_time: DateTime<Utc>,
    pub country: String,
    pub city: String,
}

impl DbPool {
    /// Append one access log row.
    pub async fn insert_access(&self, new: NewAccess) -> AppResult<file_access::Model> {
        let model = file_access::ActiveModel {
            file_code: Set(new.file_code),
            access_type: Set(new.access_type.as_str().to_string()),
            ip_address: Set(new.ip_address),
            user_agent: Set(new.user_agent),
            access_time: Set(new.access_time),
            country: Set(new.country),
            city: Set(new.city),
            ..Default::default()
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert access log: {}", e)))?;

        Ok(inserted)
    }

    /// Count accesses of one type, optionally for a single code and/or since
    /// a cutoff time.
    pub async fn count_accesses(
        &self,
        code: Option<&str>,
        access_type: AccessType,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<u64> {
        let mut query =
            FileAccess::find().filter(file_access::Column::AccessType.eq(access_type.as_str()));

        if let Some(code) = code {
            query = query.filter(file_access::Column::FileCode.eq(code));
        }
        if let Some(cutoff) = since {
            query = query.filter(file_access::Column::AccessTime.gte(cutoff));
        }

        let count = query
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count accesses: {}", e)))?;

        Ok(count)
    }

    /// Most recent accesses for a code, newest first.
    pub async fn recent_accesses(
        &self,
        code: &str,
        limit: u64,
    ) -> AppResult<Vec<file_access::Model>> {
        let rows = FileAccess::find()
            .filter(file_access::Column::FileCode.eq(code))
            .order_by_desc(file_access::Column::AccessTime)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch recent accesses: {}", e)))?;

        Ok(rows)
    }

    /// One page of accesses for a code, newest first, plus the total count.
    /// Not restricted to active files: history survives deactivation.
    pub async fn page_accesses(
        &self,
        code: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<file_access::Model>, u64)> {
        let paginator = FileAccess::find()
            .filter(file_access::Column::FileCode.eq(code))
            .order_by_desc(file_access::Column::AccessTime)
            .paginate(self.connection(), page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(format!("Failed to count accesses: {}", e)))?;

        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch access page: {}", e)))?;

        Ok((rows, total))
    }

    /// Every access for a code, oldest first (CSV export).
    pub async fn all_accesses_asc(&self, code: &str) -> AppResult<Vec<file_access::Model>> {
        let rows = FileAccess::find()
            .filter(file_access::Column::FileCode.eq(code))
            .order_by_asc(file_access::Column::AccessTime)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch accesses: {}", e)))?;

        Ok(rows)
    }

    /// Top active files by download count. Ties come back in store order.
    pub async fn top_downloaded(&self, limit: u64) -> AppResult<Vec<TopFileEntry>> {
        let rows: Vec<(String, String, i64, i64)> = FileAccess::find()
            .select_only()
            .column(file_access::Column::FileCode)
            .column_as(file::Column::OriginalFilename, "filename")
            .column_as(file::Column::FileSize, "size")
            .column_as(file_access::Column::Id.count(), "downloads")
            .join(JoinType::InnerJoin, file_access::Relation::File.def())
            .filter(file_access::Column::AccessType.eq(AccessType::Download.as_str()))
            .filter(file::Column::IsActive.eq(true))
            .group_by(file_access::Column::FileCode)
            .group_by(file::Column::OriginalFilename)
            .group_by(file::Column::FileSize)
            .order_by_desc(file_access::Column::Id.count())
            .limit(limit)
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to rank downloads: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(file_code, filename, size, downloads)| TopFileEntry {
                file_code,
                filename,
                size,
                downloads,
            })
            .collect())
    }
}
