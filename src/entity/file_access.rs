//! Access log entity.
//!
//! Append-only. References the file by `file_code` value on purpose: log
//! history must survive file deactivation, so there is no foreign key.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "file_access")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub file_code: String,
    /// "visit" or "download".
    pub access_type: String,
    pub ip_address: String,
    #[sea_orm(column_type = "Text")]
    pub user_agent: String,
    pub access_time: DateTimeUtc,
    /// Empty string when geo lookup failed or was skipped.
    pub country: String,
    pub city: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::file::Entity",
        from = "Column::FileCode",
        to = "super::file::Column::FileCode"
    )]
    File,
}

impl Related<super::file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
