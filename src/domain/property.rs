//! Property aggregate: a listing with its images and feature relations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::media::{representative, Image};
use super::user::AgentResponse;
use super::validation::{double_option, FieldChecks};
use crate::config::MAX_NAME_LENGTH;
use crate::errors::{AppError, AppResult};

text_enum! {
    /// Kind of real estate
    PropertyType {
        Apartment => "apartment",
        Villa => "villa",
        Penthouse => "penthouse",
        Commercial => "commercial",
        OffPlan => "off_plan",
    }
}

text_enum! {
    /// Market status of a listing
    PropertyStatus {
        ForSale => "for_sale",
        ForRent => "for_rent",
        Sold => "sold",
        Rented => "rented",
        UnderOffer => "under_offer",
    }
}

/// Property root entity
#[derive(Debug, Clone)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: i32,
    pub agent_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shared lookup row, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Feature {
    pub id: Uuid,
    pub name: String,
}

// =============================================================================
// Write inputs
// =============================================================================

/// Fields for creating a property
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PropertyDraft {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    #[schema(example = "Marina Gate 2BR with sea view")]
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    #[schema(value_type = String, example = "2500000.00")]
    pub price: Decimal,
    #[validate(range(min = 0, max = 32767, message = "Bedrooms must be a positive number"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 32767, message = "Bathrooms must be a positive number"))]
    pub bathrooms: i32,
    #[validate(range(min = 0, message = "Area must be a positive number"))]
    pub area_sqm: i32,
    /// Defaults to the acting agent when omitted
    pub agent_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: String,
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub is_featured: bool,
    /// Feature names, created on first use
    #[serde(default)]
    pub features: Vec<String>,
}

impl PropertyDraft {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.not_blank("title", &self.title);
        checks.not_blank("description", &self.description);
        checks.not_blank("address", &self.address);
        checks.money("price", &self.price);
        if let Some(lat) = &self.latitude {
            checks.coordinate("latitude", lat, 90);
        }
        if let Some(lng) = &self.longitude {
            checks.coordinate("longitude", lng, 180);
        }
        check_features(&mut checks, &self.features);
        checks.finish()
    }

    pub fn feature_names(&self) -> Vec<String> {
        distinct_names(&self.features)
    }
}

/// Partial update of a property; absent fields keep their values
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PropertyPatch {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, max = 32767, message = "Bedrooms must be a positive number"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 32767, message = "Bathrooms must be a positive number"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0, message = "Area must be a positive number"))]
    pub area_sqm: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub agent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub area_id: Option<Option<Uuid>>,
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub longitude: Option<Option<Decimal>>,
    pub is_featured: Option<bool>,
    /// Replaces every feature relation when non-empty
    pub features: Option<Vec<String>>,
}

impl PropertyPatch {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if let Some(title) = &self.title {
            checks.not_blank("title", title);
        }
        if let Some(description) = &self.description {
            checks.not_blank("description", description);
        }
        if let Some(address) = &self.address {
            checks.not_blank("address", address);
        }
        if let Some(price) = &self.price {
            checks.money("price", price);
        }
        if let Some(Some(lat)) = &self.latitude {
            checks.coordinate("latitude", lat, 90);
        }
        if let Some(Some(lng)) = &self.longitude {
            checks.coordinate("longitude", lng, 180);
        }
        if let Some(features) = &self.features {
            check_features(&mut checks, features);
        }
        checks.finish()
    }

    /// The feature set to install, if this update replaces features at all.
    pub fn replacement_features(&self) -> Option<Vec<String>> {
        self.features
            .as_deref()
            .filter(|names| !names.is_empty())
            .map(distinct_names)
    }
}

fn check_features(checks: &mut FieldChecks, names: &[String]) {
    for name in names {
        if name.trim().is_empty() {
            checks.fail("features", "required", "Feature names may not be blank");
        } else if name.chars().count() as u64 > MAX_NAME_LENGTH {
            checks.fail("features", "length", "Feature names must be at most 100 characters");
        }
    }
}

/// Trimmed names in first-seen order without repeats.
fn distinct_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

// =============================================================================
// Read shapes
// =============================================================================

/// List representation of a property
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertySummary {
    pub id: Uuid,
    pub title: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: i32,
    pub address: String,
    pub primary_image: Option<String>,
    pub agent_name: Option<String>,
    pub area_name: Option<String>,
    pub is_featured: bool,
    pub features: Vec<String>,
}

impl PropertySummary {
    pub fn new(
        property: Property,
        images: &[Image],
        agent_name: Option<String>,
        area_name: Option<String>,
        features: Vec<String>,
    ) -> Self {
        Self {
            id: property.id,
            title: property.title,
            property_type: property.property_type,
            status: property.status,
            price: property.price,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area_sqm: property.area_sqm,
            address: property.address,
            primary_image: representative(images).map(|img| img.image.clone()),
            agent_name,
            area_name,
            is_featured: property.is_featured,
            features,
        }
    }
}

/// Detail representation of a property with all children
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: i32,
    pub agent: Option<AgentResponse>,
    pub area_id: Option<Uuid>,
    pub area_name: Option<String>,
    pub address: String,
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Decimal>,
    pub is_featured: bool,
    pub images: Vec<Image>,
    pub features: Vec<String>,
    pub is_favorited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyDetail {
    pub fn new(
        property: Property,
        images: Vec<Image>,
        features: Vec<String>,
        agent: Option<AgentResponse>,
        area_name: Option<String>,
        is_favorited: bool,
    ) -> Self {
        Self {
            id: property.id,
            title: property.title,
            description: property.description,
            property_type: property.property_type,
            status: property.status,
            price: property.price,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area_sqm: property.area_sqm,
            agent,
            area_id: property.area_id,
            area_name,
            address: property.address,
            latitude: property.latitude,
            longitude: property.longitude,
            is_featured: property.is_featured,
            images,
            features,
            is_favorited,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Query filters for the property list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PropertyFilter {
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    /// Substring match on title, description, address or area name
    pub search: Option<String>,
    /// `price`, `created_at`, `bedrooms`, `bathrooms` or `area_sqm`, `-` prefix for descending
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySortField {
    Price,
    CreatedAt,
    Bedrooms,
    Bathrooms,
    AreaSqm,
}

impl FromStr for PropertySortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Self::Price),
            "created_at" => Ok(Self::CreatedAt),
            "bedrooms" => Ok(Self::Bedrooms),
            "bathrooms" => Ok(Self::Bathrooms),
            "area_sqm" => Ok(Self::AreaSqm),
            other => Err(AppError::validation(format!("Cannot order properties by '{}'", other))),
        }
    }
}
