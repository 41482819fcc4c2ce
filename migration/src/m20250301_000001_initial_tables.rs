use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 short_links 表
        manager
            .create_table(
                Table::create()
                    .table(ShortLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLink::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShortLink::Code)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ShortLink::DestinationUrl).text().not_null())
                    .col(ColumnDef::new(ShortLink::Title).string().null())
                    .col(ColumnDef::new(ShortLink::Description).text().null())
                    .col(ColumnDef::new(ShortLink::Campaign).string().null())
                    .col(ColumnDef::new(ShortLink::Tags).text().not_null())
                    .col(
                        ColumnDef::new(ShortLink::Status)
                            .string_len(32)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(ShortLink::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ShortLink::PartnerId).string_len(36).null())
                    .col(ColumnDef::new(ShortLink::PartnerType).string_len(32).null())
                    .col(ColumnDef::new(ShortLink::ProviderLinkId).string().null())
                    .col(ColumnDef::new(ShortLink::ProviderShortUrl).string().null())
                    .col(ColumnDef::new(ShortLink::CreatedBy).string().null())
                    .col(
                        ColumnDef::new(ShortLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_created_by")
                    .table(ShortLink::Table)
                    .col(ShortLink::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_partner_id")
                    .table(ShortLink::Table)
                    .col(ShortLink::PartnerId)
                    .to_owned(),
            )
            .await?;

        // 创建 partnerships 表
        manager
            .create_table(
                Table::create()
                    .table(Partnership::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partnership::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partnership::Website).text().not_null())
                    .col(ColumnDef::new(Partnership::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Partnership::PartnerType).string_len(32).null())
                    .col(
                        ColumnDef::new(Partnership::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Partnership::Notes).text().null())
                    .col(ColumnDef::new(Partnership::CommissionRate).double().null())
                    .col(ColumnDef::new(Partnership::BusinessName).string().null())
                    .col(ColumnDef::new(Partnership::ContactName).string().null())
                    .col(ColumnDef::new(Partnership::Product).text().null())
                    .col(ColumnDef::new(Partnership::CommissionOffer).text().null())
                    .col(ColumnDef::new(Partnership::AdditionalInfo).text().null())
                    .col(ColumnDef::new(Partnership::Category).string().null())
                    .col(ColumnDef::new(Partnership::LastContactDate).date().null())
                    .col(ColumnDef::new(Partnership::CreatedBy).string().null())
                    .col(
                        ColumnDef::new(Partnership::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Partnership::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_partnerships_status")
                    .table(Partnership::Table)
                    .col(Partnership::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_partnerships_status").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partnership::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_short_links_partner_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_short_links_created_by").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    Id,
    Code,
    DestinationUrl,
    Title,
    Description,
    Campaign,
    Tags,
    Status,
    ClickCount,
    PartnerId,
    PartnerType,
    ProviderLinkId,
    ProviderShortUrl,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Partnership {
    #[sea_orm(iden = "partnerships")]
    Table,
    Id,
    Website,
    ContactEmail,
    PartnerType,
    Status,
    Notes,
    CommissionRate,
    BusinessName,
    ContactName,
    Product,
    CommissionOffer,
    AdditionalInfo,
    Category,
    LastContactDate,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
