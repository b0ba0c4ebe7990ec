//! Shared file entity.
//!
//! One row per uploaded file. Rows are soft-deleted via `is_active`; the
//! public short code is assigned once and never reused.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public short code used in share URLs, immutable once assigned.
    #[sea_orm(unique)]
    pub file_code: String,
    /// User-supplied display name, percent-decodable.
    pub original_filename: String,
    /// Server-chosen object key, distinct from the display name.
    #[sea_orm(unique)]
    pub stored_filename: String,
    /// Size in bytes, derived from the persisted object.
    pub file_size: i64,
    /// External chat-user id; None for anonymous web uploads.
    pub owner_id: Option<i64>,
    pub uploaded_at: DateTimeUtc,
    pub notify_on_visit: bool,
    pub notify_on_download: bool,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
