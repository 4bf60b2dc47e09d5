//! Migration: market reports, trends, blog posts and statistics.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::Users;
use super::m20240101_000002_create_areas::Areas;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MarketReports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MarketReports::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MarketReports::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MarketReports::Slug).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(MarketReports::Summary).text().not_null())
                    .col(ColumnDef::new(MarketReports::Content).text().not_null())
                    .col(ColumnDef::new(MarketReports::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(MarketReports::CoverImage).string().null())
                    .col(ColumnDef::new(MarketReports::PublishedDate).date().not_null())
                    .col(ColumnDef::new(MarketReports::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(MarketReports::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(MarketReports::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_market_reports_author_id")
                            .from(MarketReports::Table, MarketReports::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MarketTrends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MarketTrends::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MarketTrends::AreaId).uuid().not_null())
                    .col(ColumnDef::new(MarketTrends::PropertyType).string_len(20).not_null())
                    .col(ColumnDef::new(MarketTrends::Period).string_len(20).not_null())
                    .col(ColumnDef::new(MarketTrends::PeriodStartDate).date().not_null())
                    .col(ColumnDef::new(MarketTrends::PeriodEndDate).date().not_null())
                    .col(ColumnDef::new(MarketTrends::AveragePrice).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(MarketTrends::PriceChange).decimal_len(5, 2).not_null())
                    .col(ColumnDef::new(MarketTrends::TrendDirection).string_len(10).not_null())
                    .col(ColumnDef::new(MarketTrends::SalesVolume).integer().not_null())
                    .col(ColumnDef::new(MarketTrends::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(MarketTrends::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_market_trends_area_id")
                            .from(MarketTrends::Table, MarketTrends::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_market_trends_series")
                    .table(MarketTrends::Table)
                    .col(MarketTrends::AreaId)
                    .col(MarketTrends::PropertyType)
                    .col(MarketTrends::Period)
                    .col(MarketTrends::PeriodStartDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPosts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BlogPosts::Title).string_len(255).not_null())
                    .col(ColumnDef::new(BlogPosts::Slug).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(BlogPosts::Excerpt).text().not_null())
                    .col(ColumnDef::new(BlogPosts::Content).text().not_null())
                    .col(ColumnDef::new(BlogPosts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(BlogPosts::CoverImage).string().null())
                    .col(ColumnDef::new(BlogPosts::PublishedDate).date().not_null())
                    .col(ColumnDef::new(BlogPosts::Tags).json().not_null())
                    .col(ColumnDef::new(BlogPosts::IsPublished).boolean().not_null().default(true))
                    .col(ColumnDef::new(BlogPosts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(BlogPosts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_posts_author_id")
                            .from(BlogPosts::Table, BlogPosts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MarketStatistics::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MarketStatistics::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MarketStatistics::Name).string_len(100).not_null())
                    .col(ColumnDef::new(MarketStatistics::Value).string_len(100).not_null())
                    .col(ColumnDef::new(MarketStatistics::Description).text().not_null().default(""))
                    .col(ColumnDef::new(MarketStatistics::Icon).string_len(50).not_null().default(""))
                    .col(ColumnDef::new(MarketStatistics::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(MarketStatistics::DisplayOrder).integer().not_null().default(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MarketStatistics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogPosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketTrends::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MarketReports {
    Table,
    Id,
    Title,
    Slug,
    Summary,
    Content,
    AuthorId,
    CoverImage,
    PublishedDate,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MarketTrends {
    Table,
    Id,
    AreaId,
    PropertyType,
    Period,
    PeriodStartDate,
    PeriodEndDate,
    AveragePrice,
    PriceChange,
    TrendDirection,
    SalesVolume,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BlogPosts {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    AuthorId,
    CoverImage,
    PublishedDate,
    Tags,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MarketStatistics {
    Table,
    Id,
    Name,
    Value,
    Description,
    Icon,
    IsFeatured,
    DisplayOrder,
}
