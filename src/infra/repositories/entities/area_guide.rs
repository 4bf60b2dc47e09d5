//! One-per-area guide text.

use sea_orm::entity::prelude::*;

use crate::domain::AreaGuide;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "area_guides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub area_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub attractions: String,
    #[sea_orm(column_type = "Text")]
    pub lifestyle: String,
    #[sea_orm(column_type = "Text")]
    pub schools: String,
    #[sea_orm(column_type = "Text")]
    pub transportation: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AreaGuide {
    fn from(model: Model) -> Self {
        AreaGuide {
            id: model.id,
            content: model.content,
            attractions: model.attractions,
            lifestyle: model.lifestyle,
            schools: model.schools,
            transportation: model.transportation,
        }
    }
}
