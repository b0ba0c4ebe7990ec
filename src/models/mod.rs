//! Domain models and DTOs for Droply.

pub mod access_log;
pub mod admin;
pub mod file;

// Re-export commonly used types
pub use access_log::{AccessLogView, AccessType};
pub use admin::{
    AdminFileView, AdminFilesQuery, AdminFilesResponse, AdminLogsQuery, AdminLogsResponse,
    AdminQuery, AdminStatsResponse, BroadcastForm, BroadcastResponse, DeleteForm, ToggleField,
    ToggleForm, TopFileEntry,
};
pub use file::{
    DeleteResponse, FileStatsResponse, OwnerFileSummary, OwnerFilesResponse, OwnerForm,
    ToggleResponse, UploadResponse,
};
