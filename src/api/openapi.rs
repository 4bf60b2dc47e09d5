//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    area_handler, auth_handler, market_handler, property_handler, user_handler,
};
use crate::domain::{
    AgentDraft, AgentPatch, AgentResponse, AgentStats, AreaDetail, AreaDraft, AreaGuide, AreaPatch,
    AreaPerk, AreaStats, AreaSummary, AuthorSummary, BlogPostDraft, BlogPostPatch,
    BlogPostResponse, FavoriteResponse, FavoriteToggle, Feature, GuideData, Image,
    InquiryResponse, InquiryUpdate, MarketReportDraft, MarketReportPatch, MarketReportResponse,
    MarketStatistic, MarketStatisticDraft, MarketStatisticPatch, MarketTrendDraft,
    MarketTrendPatch, MarketTrendResponse, NewFavorite, NewInquiry, PerkSpec, ProfileUpdate,
    PropertyDetail, PropertyDraft, PropertyPatch, PropertyStatus, PropertySummary, PropertyType,
    RegisterUser, Role, TrendDirection, TrendPeriod, UserResponse,
};
use crate::services::TokenResponse;
use crate::types::{
    AgentPage, AreaPage, BlogPage, FavoritePage, InquiryPage, PaginationMeta, PropertyPage,
    ReportPage, TrendPage, UserPage,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Realty API",
        version = "0.1.0",
        description = "Real-estate marketplace: areas, properties, accounts and market insights",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        user_handler::current_roles,
        user_handler::list_profiles,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::grant_role,
        user_handler::revoke_role,
        user_handler::list_agents,
        user_handler::get_agent,
        user_handler::create_agent,
        user_handler::update_agent,
        user_handler::delete_agent,
        user_handler::update_agent_stats,
        area_handler::list_areas,
        area_handler::featured_areas,
        area_handler::get_area,
        area_handler::create_area,
        area_handler::update_area,
        area_handler::delete_area,
        area_handler::update_area_stats,
        property_handler::list_properties,
        property_handler::get_property,
        property_handler::create_property,
        property_handler::update_property,
        property_handler::delete_property,
        property_handler::add_images,
        property_handler::update_image,
        property_handler::delete_image,
        property_handler::list_features,
        property_handler::toggle_favorite,
        property_handler::list_favorites,
        property_handler::add_favorite,
        property_handler::remove_favorite,
        property_handler::list_inquiries,
        property_handler::create_inquiry,
        property_handler::update_inquiry,
        property_handler::delete_inquiry,
        market_handler::list_reports,
        market_handler::get_report,
        market_handler::create_report,
        market_handler::update_report,
        market_handler::delete_report,
        market_handler::list_trends,
        market_handler::get_trend,
        market_handler::create_trend,
        market_handler::update_trend,
        market_handler::delete_trend,
        market_handler::list_posts,
        market_handler::get_post,
        market_handler::create_post,
        market_handler::update_post,
        market_handler::delete_post,
        market_handler::list_statistics,
        market_handler::get_statistic,
        market_handler::create_statistic,
        market_handler::update_statistic,
        market_handler::delete_statistic,
    ),
    components(
        schemas(
            // Accounts
            Role,
            RegisterUser,
            ProfileUpdate,
            UserResponse,
            AuthorSummary,
            AgentDraft,
            AgentPatch,
            AgentResponse,
            AgentStats,
            TokenResponse,
            auth_handler::LoginRequest,
            user_handler::RoleGrant,
            // Areas
            AreaDraft,
            AreaPatch,
            AreaSummary,
            AreaDetail,
            AreaPerk,
            AreaGuide,
            AreaStats,
            PerkSpec,
            GuideData,
            Image,
            // Properties
            PropertyType,
            PropertyStatus,
            PropertyDraft,
            PropertyPatch,
            PropertySummary,
            PropertyDetail,
            Feature,
            property_handler::ImageBatch,
            property_handler::ImageUpdate,
            NewFavorite,
            FavoriteResponse,
            FavoriteToggle,
            NewInquiry,
            InquiryUpdate,
            InquiryResponse,
            // Market
            MarketReportDraft,
            MarketReportPatch,
            MarketReportResponse,
            TrendPeriod,
            TrendDirection,
            MarketTrendDraft,
            MarketTrendPatch,
            MarketTrendResponse,
            BlogPostDraft,
            BlogPostPatch,
            BlogPostResponse,
            MarketStatistic,
            MarketStatisticDraft,
            MarketStatisticPatch,
            // Pages
            PaginationMeta,
            AreaPage,
            PropertyPage,
            FavoritePage,
            InquiryPage,
            UserPage,
            AgentPage,
            ReportPage,
            TrendPage,
            BlogPage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Profiles and role assignments"),
        (name = "Agents", description = "Agent profiles"),
        (name = "Areas", description = "Areas with images, perks and guides"),
        (name = "Properties", description = "Listings, images and features"),
        (name = "Favorites", description = "Per-user saved properties"),
        (name = "Inquiries", description = "Contact requests about properties"),
        (name = "Market", description = "Reports, price trends and statistics"),
        (name = "Blog", description = "Blog posts")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
