//! Migration: areas with their images, perks and guide.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Areas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Areas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Areas::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Areas::Description).text().not_null())
                    .col(ColumnDef::new(Areas::CoverImage).string().null())
                    .col(ColumnDef::new(Areas::PropertiesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Areas::AveragePrice)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Areas::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Areas::Latitude).decimal_len(9, 6).null())
                    .col(ColumnDef::new(Areas::Longitude).decimal_len(9, 6).null())
                    .col(ColumnDef::new(Areas::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Areas::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AreaImages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AreaImages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AreaImages::AreaId).uuid().not_null())
                    .col(ColumnDef::new(AreaImages::Image).string().not_null())
                    .col(ColumnDef::new(AreaImages::IsPrimary).boolean().not_null().default(false))
                    .col(ColumnDef::new(AreaImages::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_images_area_id")
                            .from(AreaImages::Table, AreaImages::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AreaPerks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AreaPerks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AreaPerks::AreaId).uuid().not_null())
                    .col(ColumnDef::new(AreaPerks::Name).string_len(100).not_null())
                    .col(ColumnDef::new(AreaPerks::Description).text().not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_perks_area_id")
                            .from(AreaPerks::Table, AreaPerks::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AreaGuides::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AreaGuides::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AreaGuides::AreaId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(AreaGuides::Content).text().not_null().default(""))
                    .col(ColumnDef::new(AreaGuides::Attractions).text().not_null().default(""))
                    .col(ColumnDef::new(AreaGuides::Lifestyle).text().not_null().default(""))
                    .col(ColumnDef::new(AreaGuides::Schools).text().not_null().default(""))
                    .col(ColumnDef::new(AreaGuides::Transportation).text().not_null().default(""))
                    .col(ColumnDef::new(AreaGuides::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(AreaGuides::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_guides_area_id")
                            .from(AreaGuides::Table, AreaGuides::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AreaGuides::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AreaPerks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AreaImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Areas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Areas {
    Table,
    Id,
    Name,
    Description,
    CoverImage,
    PropertiesCount,
    AveragePrice,
    Featured,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AreaImages {
    Table,
    Id,
    AreaId,
    Image,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AreaPerks {
    Table,
    Id,
    AreaId,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum AreaGuides {
    Table,
    Id,
    AreaId,
    Content,
    Attractions,
    Lifestyle,
    Schools,
    Transportation,
    CreatedAt,
    UpdatedAt,
}
