//! Agent profile entity.

use sea_orm::entity::prelude::*;

use crate::domain::{validation::round_money, Agent};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "agents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub bio: String,
    pub specialties: String,
    pub years_of_experience: i32,
    pub listings_count: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub sales_volume: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Agent {
    fn from(model: Model) -> Self {
        Agent {
            id: model.id,
            user_id: model.user_id,
            bio: model.bio,
            specialties: model.specialties,
            years_of_experience: model.years_of_experience,
            listings_count: model.listings_count,
            sales_volume: round_money(model.sales_volume),
        }
    }
}
