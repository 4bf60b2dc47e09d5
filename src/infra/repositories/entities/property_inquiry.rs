use sea_orm::entity::prelude::*;

use crate::domain::Inquiry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "property_inquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub is_processed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Inquiry {
    fn from(model: Model) -> Self {
        Inquiry {
            id: model.id,
            property_id: model.property_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            message: model.message,
            user_id: model.user_id,
            created_at: model.created_at,
            is_processed: model.is_processed,
        }
    }
}
