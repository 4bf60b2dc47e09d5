//! User and agent domain entities and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::property::PropertyStatus;
use super::role::{Role, RoleSet};
use super::validation::{round_money, FieldChecks};
use crate::errors::AppResult;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Lowercase the domain part of an address, keep the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Account registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "buyer@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Must repeat `password`
    #[schema(example = "SecurePass123!")]
    pub password2: String,
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    #[schema(example = "Layla")]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    #[schema(example = "Haddad")]
    pub last_name: String,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    #[schema(example = "+971501234567")]
    pub phone_number: Option<String>,
}

impl RegisterUser {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if self.password != self.password2 {
            checks.fail("password", "mismatch", "Password fields didn't match.");
        }
        checks.finish()
    }
}

/// Profile fields a user may change
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 150, message = "First name may not be blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150, message = "Last name may not be blank"))]
    pub last_name: Option<String>,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone_number: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "buyer@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, roles: &RoleSet) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            profile_picture: user.profile_picture,
            roles: roles.to_vec(),
            created_at: user.created_at,
        }
    }
}

/// Short author block embedded in reports and blog posts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for AuthorSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

// =============================================================================
// Agents
// =============================================================================

/// Agent profile attached to a user account
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: String,
    pub specialties: String,
    pub years_of_experience: i32,
    pub listings_count: i32,
    pub sales_volume: Decimal,
}

/// Derived agent counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AgentStats {
    pub listings_count: i32,
    #[schema(value_type = String)]
    pub sales_volume: Decimal,
}

impl AgentStats {
    /// Listings are every assigned property; volume sums the sold ones.
    pub fn from_listings(listings: &[(PropertyStatus, Decimal)]) -> Self {
        let sales_volume = listings
            .iter()
            .filter(|(status, _)| *status == PropertyStatus::Sold)
            .map(|(_, price)| *price)
            .sum();

        Self {
            listings_count: listings.len() as i32,
            sales_volume: round_money(sales_volume),
        }
    }
}

/// Agent profile creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AgentDraft {
    pub user_id: Uuid,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Specialties must be at most 255 characters"))]
    pub specialties: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 32767, message = "Years of experience must be positive"))]
    pub years_of_experience: i32,
}

/// Agent profile update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AgentPatch {
    pub bio: Option<String>,
    #[validate(length(max = 255, message = "Specialties must be at most 255 characters"))]
    pub specialties: Option<String>,
    #[validate(range(min = 0, max = 32767, message = "Years of experience must be positive"))]
    pub years_of_experience: Option<i32>,
}

/// Agent with the contact details of its user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: String,
    pub specialties: String,
    pub years_of_experience: i32,
    pub listings_count: i32,
    #[schema(value_type = String, example = "12500000.00")]
    pub sales_volume: Decimal,
}

impl AgentResponse {
    pub fn new(agent: Agent, user: User) -> Self {
        Self {
            id: agent.id,
            user_id: agent.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            profile_picture: user.profile_picture,
            bio: agent.bio,
            specialties: agent.specialties,
            years_of_experience: agent.years_of_experience,
            listings_count: agent.listings_count,
            sales_volume: agent.sales_volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterUser {
        RegisterUser {
            email: "agent@example.com".to_string(),
            password: "agentpassword".to_string(),
            password2: "agentpassword".to_string(),
            first_name: "Omar".to_string(),
            last_name: "Khalil".to_string(),
            phone_number: None,
        }
    }

    #[test]
    fn test_email_domain_is_lowercased() {
        assert_eq!(normalize_email(" Omar.K@Example.COM "), "Omar.K@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_password_confirmation_must_match() {
        assert!(registration().check().is_ok());

        let mut mismatch = registration();
        mismatch.password2 = "different-password".to_string();
        let details = mismatch.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("password"));
    }

    #[test]
    fn test_agent_stats_only_count_sold_volume() {
        let listings = vec![
            (PropertyStatus::Sold, Decimal::new(150_000_000, 2)),
            (PropertyStatus::ForSale, Decimal::new(90_000_000, 2)),
            (PropertyStatus::Sold, Decimal::new(50_000, 2)),
        ];
        let stats = AgentStats::from_listings(&listings);

        assert_eq!(stats.listings_count, 3);
        assert_eq!(stats.sales_volume, Decimal::new(150_050_000, 2));
        assert_eq!(AgentStats::from_listings(&[]).sales_volume, Decimal::ZERO);
    }
}
