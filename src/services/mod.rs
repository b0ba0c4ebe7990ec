//! Business logic services.

pub mod admin;
pub mod codes;
pub mod files;
pub mod geo;
pub mod notify;
pub mod storage;

pub use admin::AdminService;
pub use files::FileService;
pub use geo::GeoClient;
pub use notify::Notifier;
pub use storage::Storage;
