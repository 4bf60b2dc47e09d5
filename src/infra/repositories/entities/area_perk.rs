use sea_orm::entity::prelude::*;

use crate::domain::AreaPerk;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "area_perks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub area_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AreaPerk {
    fn from(model: Model) -> Self {
        AreaPerk {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}
