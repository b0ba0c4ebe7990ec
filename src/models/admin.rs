//! Admin surface DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::file;

use super::AccessLogView;

/// Notification flag selectable by name on the admin toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleField {
    NotifyVisits,
    NotifyDownloads,
}

impl ToggleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotifyVisits => "notify_visits",
            Self::NotifyDownloads => "notify_downloads",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notify_visits" => Some(Self::NotifyVisits),
            "notify_downloads" => Some(Self::NotifyDownloads),
            _ => None,
        }
    }

    /// Current value of this flag on a file row.
    pub fn current(&self, m: &file::Model) -> bool {
        match self {
            Self::NotifyVisits => m.notify_on_visit,
            Self::NotifyDownloads => m.notify_on_download,
        }
    }
}

impl std::fmt::Display for ToggleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query carrying only the admin id (stats, CSV export).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminQuery {
    pub admin_id: i64,
}

/// Aggregate dashboard counters.
///
/// `total_visits`/`total_downloads` span active and inactive files: access
/// logs are never purged.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminStatsResponse {
    pub total_files: u64,
    pub total_bytes: i64,
    pub total_visits: u64,
    pub total_downloads: u64,
    pub files_this_week: u64,
    pub bytes_this_week: i64,
    pub visits_this_week: u64,
    pub downloads_this_week: u64,
    pub top_files: Vec<TopFileEntry>,
}

/// One of the top-10 files by download count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopFileEntry {
    pub file_code: String,
    pub filename: String,
    pub size: i64,
    pub downloads: i64,
}

/// Query parameters for the paginated/searchable admin file listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminFilesQuery {
    pub admin_id: i64,
    /// Case-insensitive substring match on filename or file code.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_files_page_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_files_page_size() -> u64 {
    10
}

/// One file in the admin listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminFileView {
    pub file_code: String,
    pub filename: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: Option<i64>,
    pub notify_visits: bool,
    pub notify_downloads: bool,
    pub download_url: String,
}

/// Paginated admin file listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminFilesResponse {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub files: Vec<AdminFileView>,
}

/// Query parameters for the paginated admin log listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminLogsQuery {
    pub admin_id: i64,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_logs_page_size")]
    pub size: u64,
}

fn default_logs_page_size() -> u64 {
    20
}

/// Paginated admin log listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLogsResponse {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub logs: Vec<AccessLogView>,
}

/// Form body for the admin toggle endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ToggleForm {
    pub admin_id: i64,
    /// Flag name: `notify_visits` or `notify_downloads`.
    pub field: String,
}

/// Form body for the admin delete endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteForm {
    pub admin_id: i64,
}

/// Form body for the broadcast endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastForm {
    pub admin_id: i64,
    pub message: String,
}

/// Broadcast outcome: counts only, never per-recipient details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastResponse {
    pub success: bool,
    pub delivered: usize,
    pub attempted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_field_parsing() {
        assert_eq!(
            ToggleField::parse("notify_visits"),
            Some(ToggleField::NotifyVisits)
        );
        assert_eq!(
            ToggleField::parse("notify_downloads"),
            Some(ToggleField::NotifyDownloads)
        );
        assert_eq!(ToggleField::parse("is_active"), None);
        assert_eq!(ToggleField::parse(""), None);
    }
}
