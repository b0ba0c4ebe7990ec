//! Create file_access table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FileAccess::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FileAccess::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // By-value reference: rows must survive file deactivation,
                    // so there is deliberately no foreign key here.
                    .col(
                        ColumnDef::new(FileAccess::FileCode)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FileAccess::AccessType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FileAccess::IpAddress)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FileAccess::UserAgent).text().not_null())
                    .col(
                        ColumnDef::new(FileAccess::AccessTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FileAccess::Country)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FileAccess::City)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_file_access_file_code")
                    .table(FileAccess::Table)
                    .col(FileAccess::FileCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_file_access_access_time")
                    .table(FileAccess::Table)
                    .col(FileAccess::AccessTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FileAccess::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum FileAccess {
    Table,
    Id,
    FileCode,
    AccessType,
    IpAddress,
    UserAgent,
    AccessTime,
    Country,
    City,
}
