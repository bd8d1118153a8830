//! Create report upvote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportUpvote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportUpvote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportUpvote::ReportId).string_len(32).not_null())
                    .col(ColumnDef::new(ReportUpvote::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ReportUpvote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_upvote_report")
                            .from(ReportUpvote::Table, ReportUpvote::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_upvote_user")
                            .from(ReportUpvote::Table, ReportUpvote::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (report_id, user_id) - one upvote per user per report
        manager
            .create_index(
                Index::create()
                    .name("idx_report_upvote_report_user")
                    .table(ReportUpvote::Table)
                    .col(ReportUpvote::ReportId)
                    .col(ReportUpvote::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for a viewer's upvoted set)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_upvote_user_id")
                    .table(ReportUpvote::Table)
                    .col(ReportUpvote::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportUpvote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportUpvote {
    Table,
    Id,
    ReportId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
