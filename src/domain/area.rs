//! Area aggregate: an area with its images, perks and guide.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::media::{representative, Image};
use super::validation::{double_option, round_money, FieldChecks};
use crate::config::MAX_NAME_LENGTH;
use crate::errors::{AppError, AppResult};

/// Area root entity
#[derive(Debug, Clone)]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub properties_count: i32,
    pub average_price: Decimal,
    pub featured: bool,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaPerk {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaGuide {
    pub id: Uuid,
    pub content: String,
    pub attractions: String,
    pub lifestyle: String,
    pub schools: String,
    pub transportation: String,
}

/// Derived summary fields of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AreaStats {
    pub properties_count: i32,
    #[schema(value_type = String, example = "200.00")]
    pub average_price: Decimal,
}

impl AreaStats {
    /// Count and exact mean of the given prices (0 when empty).
    pub fn from_prices(prices: &[Decimal]) -> Self {
        let count = prices.len();
        if count == 0 {
            return Self {
                properties_count: 0,
                average_price: Decimal::ZERO,
            };
        }

        let total: Decimal = prices.iter().copied().sum();
        Self {
            properties_count: count as i32,
            average_price: round_money(total / Decimal::from(count as u64)),
        }
    }
}

// =============================================================================
// Write inputs
// =============================================================================

/// Perk supplied with an area write
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PerkSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Guide sections supplied with an area write; absent sections are untouched on update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GuideData {
    pub content: Option<String>,
    pub attractions: Option<String>,
    pub lifestyle: Option<String>,
    pub schools: Option<String>,
    pub transportation: Option<String>,
}

/// Fields for creating an area
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AreaDraft {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[schema(example = "Dubai Marina")]
    pub name: String,
    #[schema(example = "Cosmopolitan waterfront community with luxury apartments.")]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[schema(value_type = Option<String>, example = "25.080500")]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "55.140300")]
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub perks: Vec<PerkSpec>,
    pub guide_data: Option<GuideData>,
}

impl AreaDraft {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.not_blank("name", &self.name);
        checks.not_blank("description", &self.description);
        if let Some(lat) = &self.latitude {
            checks.coordinate("latitude", lat, 90);
        }
        if let Some(lng) = &self.longitude {
            checks.coordinate("longitude", lng, 180);
        }
        check_perks(&mut checks, &self.perks);
        checks.finish()
    }
}

/// Partial update of an area; absent fields keep their values
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AreaPatch {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub longitude: Option<Option<Decimal>>,
    /// Replaces every perk when non-empty; empty or absent leaves perks untouched
    pub perks: Option<Vec<PerkSpec>>,
    pub guide_data: Option<GuideData>,
}

impl AreaPatch {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if let Some(name) = &self.name {
            checks.not_blank("name", name);
        }
        if let Some(description) = &self.description {
            checks.not_blank("description", description);
        }
        if let Some(Some(lat)) = &self.latitude {
            checks.coordinate("latitude", lat, 90);
        }
        if let Some(Some(lng)) = &self.longitude {
            checks.coordinate("longitude", lng, 180);
        }
        if let Some(perks) = &self.perks {
            check_perks(&mut checks, perks);
        }
        checks.finish()
    }

    /// The perk set to install, if this update replaces perks at all.
    pub fn replacement_perks(&self) -> Option<&[PerkSpec]> {
        self.perks.as_deref().filter(|perks| !perks.is_empty())
    }
}

fn check_perks(checks: &mut FieldChecks, perks: &[PerkSpec]) {
    for perk in perks {
        if perk.name.chars().count() as u64 > MAX_NAME_LENGTH {
            checks.fail("perks", "length", "Perk names must be at most 100 characters");
        }
    }
}

// =============================================================================
// Read shapes
// =============================================================================

/// List representation of an area
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub primary_image: Option<String>,
    pub properties_count: i32,
    #[schema(value_type = String)]
    pub average_price: Decimal,
    pub featured: bool,
}

impl AreaSummary {
    /// Primary image, else the cover image, else the first image.
    pub fn new(area: Area, images: &[Image]) -> Self {
        let primary_image = images
            .iter()
            .find(|img| img.is_primary)
            .map(|img| img.image.clone())
            .or_else(|| area.cover_image.clone())
            .or_else(|| representative(images).map(|img| img.image.clone()));

        Self {
            id: area.id,
            name: area.name,
            description: area.description,
            primary_image,
            properties_count: area.properties_count,
            average_price: area.average_price,
            featured: area.featured,
        }
    }
}

/// Detail representation of an area with all children
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub images: Vec<Image>,
    pub perks: Vec<AreaPerk>,
    pub guide: Option<AreaGuide>,
    pub properties_count: i32,
    #[schema(value_type = String)]
    pub average_price: Decimal,
    pub featured: bool,
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AreaDetail {
    pub fn new(area: Area, images: Vec<Image>, perks: Vec<AreaPerk>, guide: Option<AreaGuide>) -> Self {
        Self {
            id: area.id,
            name: area.name,
            description: area.description,
            cover_image: area.cover_image,
            images,
            perks,
            guide,
            properties_count: area.properties_count,
            average_price: area.average_price,
            featured: area.featured,
            latitude: area.latitude,
            longitude: area.longitude,
            created_at: area.created_at,
            updated_at: area.updated_at,
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Query filters for the area list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AreaFilter {
    pub featured: Option<bool>,
    /// Substring match on name or description
    pub search: Option<String>,
    /// `name`, `properties_count` or `average_price`, `-` prefix for descending
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSortField {
    Name,
    PropertiesCount,
    AveragePrice,
}

impl FromStr for AreaSortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "properties_count" => Ok(Self::PropertiesCount),
            "average_price" => Ok(Self::AveragePrice),
            other => Err(AppError::validation(format!("Cannot order areas by '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn draft() -> AreaDraft {
        AreaDraft {
            name: "Palm Jumeirah".to_string(),
            description: "Luxury artificial island".to_string(),
            featured: true,
            latitude: Some(dec("25.112500")),
            longitude: Some(dec("55.138900")),
            perks: vec![],
            guide_data: None,
        }
    }

    #[test]
    fn test_stats_for_three_prices() {
        let stats = AreaStats::from_prices(&[dec("100.00"), dec("200.00"), dec("300.00")]);
        assert_eq!(stats.properties_count, 3);
        assert_eq!(stats.average_price, dec("200.00"));
    }

    #[test]
    fn test_stats_for_empty_area() {
        let stats = AreaStats::from_prices(&[]);
        assert_eq!(stats.properties_count, 0);
        assert_eq!(stats.average_price, Decimal::ZERO);
    }

    #[test]
    fn test_stats_keep_cent_precision() {
        let stats = AreaStats::from_prices(&[dec("100.00"), dec("100.00"), dec("100.01")]);
        assert_eq!(stats.average_price, dec("100.00"));

        let stats = AreaStats::from_prices(&[dec("0.10"), dec("0.20")]);
        assert_eq!(stats.average_price, dec("0.15"));
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().check().is_ok());

        let mut bad = draft();
        bad.name = " ".to_string();
        bad.latitude = Some(dec("91"));
        let details = bad.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("name"));
        assert!(details.contains_key("latitude"));
    }

    #[test]
    fn test_empty_perk_list_does_not_replace() {
        let mut patch = AreaPatch::default();
        assert!(patch.replacement_perks().is_none());

        patch.perks = Some(vec![]);
        assert!(patch.replacement_perks().is_none());

        patch.perks = Some(vec![PerkSpec {
            name: "Beach".to_string(),
            description: String::new(),
        }]);
        assert_eq!(patch.replacement_perks().unwrap().len(), 1);
    }

    #[test]
    fn test_summary_image_fallbacks() {
        let area = Area {
            id: Uuid::new_v4(),
            name: "Downtown".to_string(),
            description: "Burj Khalifa".to_string(),
            cover_image: Some("/media/area_images/cover.jpg".to_string()),
            properties_count: 0,
            average_price: Decimal::ZERO,
            featured: false,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let image = Image {
            id: Uuid::new_v4(),
            image: "/media/area_images/other.jpg".to_string(),
            is_primary: false,
            created_at: Utc::now(),
        };

        let summary = AreaSummary::new(area.clone(), &[image.clone()]);
        assert_eq!(summary.primary_image.as_deref(), Some("/media/area_images/cover.jpg"));

        let mut no_cover = area;
        no_cover.cover_image = None;
        let summary = AreaSummary::new(no_cover, &[image]);
        assert_eq!(summary.primary_image.as_deref(), Some("/media/area_images/other.jpg"));
    }
}
