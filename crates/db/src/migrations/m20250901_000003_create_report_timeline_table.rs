//! Create report timeline table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportTimeline::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportTimeline::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReportTimeline::ReportId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReportTimeline::Status).string_len(16).not_null())
                    .col(ColumnDef::new(ReportTimeline::Description).text().not_null())
                    .col(ColumnDef::new(ReportTimeline::AssignedTo).string_len(128))
                    .col(ColumnDef::new(ReportTimeline::Department).string_len(128))
                    .col(
                        ColumnDef::new(ReportTimeline::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_timeline_report")
                            .from(ReportTimeline::Table, ReportTimeline::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (report_id, status) - one entry per status reached
        manager
            .create_index(
                Index::create()
                    .name("idx_report_timeline_report_status")
                    .table(ReportTimeline::Table)
                    .col(ReportTimeline::ReportId)
                    .col(ReportTimeline::Status)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportTimeline::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportTimeline {
    Table,
    Id,
    ReportId,
    Status,
    Description,
    AssignedTo,
    Department,
    CreatedAt,
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
}
