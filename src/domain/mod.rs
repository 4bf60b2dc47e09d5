//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns:
//! entities, write inputs with their validation, read shapes,
//! derived-value arithmetic and the access policy.

/// Declares a closed set of values stored as text columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::errors::AppError::validation(format!(
                        "\"{}\" is not a valid choice",
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod area;
pub mod engagement;
pub mod insight;
pub mod media;
pub mod password;
pub mod policy;
pub mod property;
pub mod role;
pub mod user;
pub mod validation;

pub use area::{
    Area, AreaDetail, AreaDraft, AreaFilter, AreaGuide, AreaPatch, AreaPerk, AreaSortField,
    AreaStats, AreaSummary, GuideData, PerkSpec,
};
pub use engagement::{
    Favorite, FavoriteResponse, FavoriteToggle, Inquiry, InquiryResponse, InquiryUpdate,
    NewFavorite, NewInquiry,
};
pub use insight::{
    resolve_slug, slugify, BlogFilter, BlogPost, BlogPostDraft, BlogPostPatch, BlogPostResponse,
    MarketReport, MarketReportDraft, MarketReportPatch, MarketReportResponse, MarketStatistic,
    MarketStatisticDraft, MarketStatisticPatch, MarketTrend, MarketTrendDraft, MarketTrendPatch,
    MarketTrendResponse, ReportFilter, StatisticFilter, TrendDirection, TrendFilter, TrendPeriod,
};
pub use media::{Image, PrimaryPolicy};
pub use password::Password;
pub use policy::{Action, Actor, BlogScope, InquiryScope, Principal, ProfileScope, Target};
pub use property::{
    Feature, Property, PropertyDetail, PropertyDraft, PropertyFilter, PropertyPatch,
    PropertySortField, PropertyStatus, PropertySummary, PropertyType,
};
pub use role::{Role, RoleSet};
pub use user::{
    normalize_email, Agent, AgentDraft, AgentPatch, AgentResponse, AgentStats, AuthorSummary,
    ProfileUpdate, RegisterUser, User, UserResponse,
};
