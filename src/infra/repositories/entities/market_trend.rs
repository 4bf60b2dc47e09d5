//! Price trend rows, unique per (area, property type, period, start date).

use sea_orm::entity::prelude::*;

use crate::domain::{validation::round_money, MarketTrend};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "market_trends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub area_id: Uuid,
    pub property_type: String,
    pub period: String,
    pub period_start_date: Date,
    pub period_end_date: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub average_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub price_change: Decimal,
    pub trend_direction: String,
    pub sales_volume: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MarketTrend {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |column: &str, value: &str| {
            AppError::internal(format!("Stored market_trends.{} '{}'", column, value))
        };

        Ok(MarketTrend {
            id: model.id,
            area_id: model.area_id,
            property_type: model
                .property_type
                .parse()
                .map_err(|_| corrupt("property_type", &model.property_type))?,
            period: model
                .period
                .parse()
                .map_err(|_| corrupt("period", &model.period))?,
            period_start_date: model.period_start_date,
            period_end_date: model.period_end_date,
            average_price: round_money(model.average_price),
            price_change: round_money(model.price_change),
            trend_direction: model
                .trend_direction
                .parse()
                .map_err(|_| corrupt("trend_direction", &model.trend_direction))?,
            sales_volume: model.sales_volume,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
