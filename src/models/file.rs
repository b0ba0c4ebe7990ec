//! File DTOs for the public and owner endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AccessLogView;

/// Response after a successful upload or replace.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Public short code for the new share link.
    pub file_code: String,
    pub filename: String,
    /// Size in bytes, derived from the stored object.
    pub size: i64,
    pub download_url: String,
}

/// One file in an owner's listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerFileSummary {
    pub file_code: String,
    pub filename: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub notify_visits: bool,
    pub notify_downloads: bool,
    pub download_url: String,
}

/// Owner file listing response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerFilesResponse {
    pub files: Vec<OwnerFileSummary>,
}

/// Per-file stats: counters plus the most recent activity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileStatsResponse {
    pub file_code: String,
    pub filename: String,
    pub size: i64,
    pub visits: u64,
    pub downloads: u64,
    pub notify_visits: bool,
    pub notify_downloads: bool,
    pub recent_activity: Vec<AccessLogView>,
}

/// Response after flipping a notification flag.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub success: bool,
    /// Which flag was flipped (`notify_visits` or `notify_downloads`).
    pub field: String,
    /// The new value.
    pub value: bool,
}

/// Response after a delete.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Form body carrying the requesting owner's id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OwnerForm {
    pub owner_id: i64,
}
