//! Migration: properties, their images and features, favorites and inquiries.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::{Agents, Users};
use super::m20240101_000002_create_areas::Areas;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Properties::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Properties::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Properties::Description).text().not_null())
                    .col(ColumnDef::new(Properties::PropertyType).string_len(20).not_null())
                    .col(ColumnDef::new(Properties::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Properties::Price).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Properties::Bedrooms).integer().not_null())
                    .col(ColumnDef::new(Properties::Bathrooms).integer().not_null())
                    .col(ColumnDef::new(Properties::AreaSqm).integer().not_null())
                    .col(ColumnDef::new(Properties::AgentId).uuid().null())
                    .col(ColumnDef::new(Properties::AreaId).uuid().null())
                    .col(ColumnDef::new(Properties::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Properties::Latitude).decimal_len(9, 6).null())
                    .col(ColumnDef::new(Properties::Longitude).decimal_len(9, 6).null())
                    .col(ColumnDef::new(Properties::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Properties::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Properties::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_agent_id")
                            .from(Properties::Table, Properties::AgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_area_id")
                            .from(Properties::Table, Properties::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Aggregate recomputation scans by area
        manager
            .create_index(
                Index::create()
                    .name("idx_properties_area_id")
                    .table(Properties::Table)
                    .col(Properties::AreaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyImages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PropertyImages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PropertyImages::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(PropertyImages::Image).string().not_null())
                    .col(ColumnDef::new(PropertyImages::IsPrimary).boolean().not_null().default(false))
                    .col(ColumnDef::new(PropertyImages::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_images_property_id")
                            .from(PropertyImages::Table, PropertyImages::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyFeatures::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PropertyFeatures::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PropertyFeatures::Name).string_len(100).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyFeatureRelations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PropertyFeatureRelations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PropertyFeatureRelations::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(PropertyFeatureRelations::FeatureId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feature_relations_property_id")
                            .from(PropertyFeatureRelations::Table, PropertyFeatureRelations::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feature_relations_feature_id")
                            .from(PropertyFeatureRelations::Table, PropertyFeatureRelations::FeatureId)
                            .to(PropertyFeatures::Table, PropertyFeatures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feature_relations_property_feature")
                    .table(PropertyFeatureRelations::Table)
                    .col(PropertyFeatureRelations::PropertyId)
                    .col(PropertyFeatureRelations::FeatureId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Favorites::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::UserId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_property_id")
                            .from(Favorites::Table, Favorites::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user_id")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_property_user")
                    .table(Favorites::Table)
                    .col(Favorites::PropertyId)
                    .col(Favorites::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyInquiries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PropertyInquiries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PropertyInquiries::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(PropertyInquiries::Name).string_len(100).not_null())
                    .col(ColumnDef::new(PropertyInquiries::Email).string_len(254).not_null())
                    .col(ColumnDef::new(PropertyInquiries::Phone).string_len(20).not_null().default(""))
                    .col(ColumnDef::new(PropertyInquiries::Message).text().not_null())
                    .col(ColumnDef::new(PropertyInquiries::UserId).uuid().null())
                    .col(ColumnDef::new(PropertyInquiries::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(
                        ColumnDef::new(PropertyInquiries::IsProcessed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_inquiries_property_id")
                            .from(PropertyInquiries::Table, PropertyInquiries::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_inquiries_user_id")
                            .from(PropertyInquiries::Table, PropertyInquiries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PropertyInquiries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PropertyFeatureRelations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PropertyFeatures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PropertyImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    Title,
    Description,
    PropertyType,
    Status,
    Price,
    Bedrooms,
    Bathrooms,
    AreaSqm,
    AgentId,
    AreaId,
    Address,
    Latitude,
    Longitude,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PropertyImages {
    Table,
    Id,
    PropertyId,
    Image,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PropertyFeatures {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum PropertyFeatureRelations {
    Table,
    Id,
    PropertyId,
    FeatureId,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    PropertyId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PropertyInquiries {
    Table,
    Id,
    PropertyId,
    Name,
    Email,
    Phone,
    Message,
    UserId,
    CreatedAt,
    IsProcessed,
}
