//! 点击日志表迁移
//!
//! 每次短链解析追加一行，用于来源统计，click_count 仍保留在 short_links 上。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClickLogs::LinkId).string_len(36).not_null())
                    .col(ColumnDef::new(ClickLogs::Code).string_len(64).not_null())
                    .col(
                        ColumnDef::new(ClickLogs::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickLogs::Referrer).text().null())
                    .col(ColumnDef::new(ClickLogs::UserAgent).text().null())
                    .col(ColumnDef::new(ClickLogs::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(ClickLogs::Source).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        // 统计和删除都按 link_id 过滤
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_logs_link_id")
                    .table(ClickLogs::Table)
                    .col(ClickLogs::LinkId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_logs_link_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClickLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickLogs {
    Table,
    Id,
    LinkId,
    Code,
    ClickedAt,
    Referrer,
    UserAgent,
    IpAddress,
    Source,
}
