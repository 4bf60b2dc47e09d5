//! Favorites and inquiries: the buyer-side records attached to properties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::property::PropertySummary;
use super::validation::FieldChecks;
use crate::errors::AppResult;

/// A user's bookmark on a property, unique per (property, user)
#[derive(Debug, Clone)]
pub struct Favorite {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// Explicit favorite creation
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewFavorite {
    #[serde(alias = "property")]
    pub property_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub property_details: PropertySummary,
}

impl FavoriteResponse {
    pub fn new(favorite: Favorite, property_details: PropertySummary) -> Self {
        Self {
            id: favorite.id,
            user_id: favorite.user_id,
            created_at: favorite.created_at,
            property_details,
        }
    }
}

/// Contact request sent about a property
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub is_processed: bool,
}

/// Inquiry submission; anyone may send one
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewInquiry {
    #[serde(alias = "property")]
    pub property_id: Uuid,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[schema(example = "Sara Ahmed")]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "sara@example.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: String,
    #[schema(example = "Is the unit still available for viewing this week?")]
    pub message: String,
}

impl NewInquiry {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.not_blank("name", &self.name);
        checks.not_blank("message", &self.message);
        checks.finish()
    }
}

/// Processing flag update
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InquiryUpdate {
    pub is_processed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub is_processed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Inquiry> for InquiryResponse {
    fn from(inquiry: Inquiry) -> Self {
        Self {
            id: inquiry.id,
            property_id: inquiry.property_id,
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            is_processed: inquiry.is_processed,
            created_at: inquiry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_serializes_as_status() {
        assert_eq!(
            serde_json::to_value(FavoriteToggle::Added).unwrap(),
            serde_json::json!({ "status": "added" })
        );
        assert_eq!(
            serde_json::to_value(FavoriteToggle::Removed).unwrap(),
            serde_json::json!({ "status": "removed" })
        );
    }

    #[test]
    fn test_inquiry_validation() {
        let inquiry: NewInquiry = serde_json::from_value(serde_json::json!({
            "property": Uuid::new_v4(),
            "name": "Sara",
            "email": "not-an-email",
            "message": " "
        }))
        .unwrap();

        let details = inquiry.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("email"));
        assert!(details.contains_key("message"));
        assert_eq!(inquiry.phone, "");
    }
}
