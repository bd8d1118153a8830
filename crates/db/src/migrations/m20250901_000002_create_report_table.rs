//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::ReporterId).string_len(32).not_null())
                    .col(ColumnDef::new(Report::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::Type).string_len(32).not_null())
                    .col(ColumnDef::new(Report::ImageUrl).string_len(512))
                    .col(ColumnDef::new(Report::Location).json_binary())
                    .col(ColumnDef::new(Report::Area).string_len(128))
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(
                        ColumnDef::new(Report::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Report::IsPersonal).boolean().not_null())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Report::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_reporter")
                            .from(Report::Table, Report::ReporterId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (reporter_id, is_personal) - personal lists
        manager
            .create_index(
                Index::create()
                    .name("idx_report_reporter_personal")
                    .table(Report::Table)
                    .col(Report::ReporterId)
                    .col(Report::IsPersonal)
                    .to_owned(),
            )
            .await?;

        // Index: (is_personal, area) - community area feeds
        manager
            .create_index(
                Index::create()
                    .name("idx_report_personal_area")
                    .table(Report::Table)
                    .col(Report::IsPersonal)
                    .col(Report::Area)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    ReporterId,
    Title,
    Description,
    Type,
    ImageUrl,
    Location,
    Area,
    Status,
    IsAnonymous,
    IsPersonal,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
