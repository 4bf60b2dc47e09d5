//! Property root entity.

use sea_orm::entity::prelude::*;

use crate::domain::{validation::round_money, Property};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub property_type: String,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: i32,
    pub agent_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub address: String,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub longitude: Option<Decimal>,
    pub is_featured: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Property {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Property {
            id: model.id,
            title: model.title,
            description: model.description,
            property_type: model
                .property_type
                .parse()
                .map_err(|_| AppError::internal(format!("Stored property type '{}'", model.property_type)))?,
            status: model
                .status
                .parse()
                .map_err(|_| AppError::internal(format!("Stored property status '{}'", model.status)))?,
            price: round_money(model.price),
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            area_sqm: model.area_sqm,
            agent_id: model.agent_id,
            area_id: model.area_id,
            address: model.address,
            latitude: model.latitude,
            longitude: model.longitude,
            is_featured: model.is_featured,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
