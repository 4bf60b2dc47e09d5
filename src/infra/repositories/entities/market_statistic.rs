use sea_orm::entity::prelude::*;

use crate::domain::MarketStatistic;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "market_statistics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub value: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub icon: String,
    pub is_featured: bool,
    pub display_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MarketStatistic {
    fn from(model: Model) -> Self {
        MarketStatistic {
            id: model.id,
            name: model.name,
            value: model.value,
            description: model.description,
            icon: model.icon,
            is_featured: model.is_featured,
            display_order: model.display_order,
        }
    }
}
