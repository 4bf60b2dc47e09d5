//! Area root entity.

use sea_orm::entity::prelude::*;

use crate::domain::{validation::round_money, Area};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "areas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub cover_image: Option<String>,
    pub properties_count: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub average_price: Decimal,
    pub featured: bool,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub longitude: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Area {
    fn from(model: Model) -> Self {
        Area {
            id: model.id,
            name: model.name,
            description: model.description,
            cover_image: model.cover_image,
            properties_count: model.properties_count,
            average_price: round_money(model.average_price),
            featured: model.featured,
            latitude: model.latitude,
            longitude: model.longitude,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
