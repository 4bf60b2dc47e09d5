//! Feature lookup table, unique by name.

use sea_orm::entity::prelude::*;

use crate::domain::Feature;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "property_features")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Feature {
    fn from(model: Model) -> Self {
        Feature {
            id: model.id,
            name: model.name,
        }
    }
}
