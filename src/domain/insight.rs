//! Market insight content: reports, price trends, blog posts and headline statistics.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::property::PropertyType;
use super::user::AuthorSummary;
use super::validation::FieldChecks;
use crate::config::{CURRENCY_SCALE, MAX_TAG_LENGTH};
use crate::errors::AppResult;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));
static VALID_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// URL slug for a title: ASCII only, lowercase, hyphen separated.
///
/// "Dubai Market Q1 2024: Prices Up!" becomes "dubai-market-q1-2024-prices-up".
pub fn slugify(title: &str) -> String {
    let ascii: String = title.chars().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let joined = SLUG_SEPARATORS.replace_all(cleaned.trim(), "-");
    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Given slug if any, else one derived from the title.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(title),
    }
}

fn check_slug(checks: &mut FieldChecks, slug: &str) {
    if !VALID_SLUG.is_match(slug) {
        checks.fail(
            "slug",
            "invalid",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens",
        );
    }
}

// =============================================================================
// Market reports
// =============================================================================

#[derive(Debug, Clone)]
pub struct MarketReport {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub author_id: Uuid,
    pub cover_image: Option<String>,
    pub published_date: NaiveDate,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MarketReportDraft {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    #[schema(example = "Dubai Residential Market Q1 2024")]
    pub title: String,
    /// Generated from the title when omitted
    #[validate(length(max = 255, message = "Slug must be at most 255 characters"))]
    pub slug: Option<String>,
    pub summary: String,
    pub content: String,
    pub published_date: NaiveDate,
    #[serde(default)]
    pub is_featured: bool,
}

impl MarketReportDraft {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.not_blank("title", &self.title);
        checks.not_blank("summary", &self.summary);
        checks.not_blank("content", &self.content);
        check_slug(&mut checks, &resolve_slug(self.slug.as_deref(), &self.title));
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MarketReportPatch {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Slug must be at most 255 characters"))]
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub is_featured: Option<bool>,
}

impl MarketReportPatch {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if let Some(title) = &self.title {
            checks.not_blank("title", title);
        }
        if let Some(slug) = &self.slug {
            check_slug(&mut checks, slug);
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarketReportResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub author_details: AuthorSummary,
    pub cover_image: Option<String>,
    pub published_date: NaiveDate,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketReportResponse {
    pub fn new(report: MarketReport, author: AuthorSummary) -> Self {
        Self {
            id: report.id,
            title: report.title,
            slug: report.slug,
            summary: report.summary,
            content: report.content,
            author_details: author,
            cover_image: report.cover_image,
            published_date: report.published_date,
            is_featured: report.is_featured,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    pub is_featured: Option<bool>,
    /// Substring match on title or summary
    pub search: Option<String>,
}

// =============================================================================
// Market trends
// =============================================================================

text_enum! {
    /// Length of the period a trend row summarises
    TrendPeriod {
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
    }
}

text_enum! {
    TrendDirection {
        Up => "up",
        Down => "down",
        Stable => "stable",
    }
}

#[derive(Debug, Clone)]
pub struct MarketTrend {
    pub id: Uuid,
    pub area_id: Uuid,
    pub property_type: PropertyType,
    pub period: TrendPeriod,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    pub average_price: Decimal,
    pub price_change: Decimal,
    pub trend_direction: TrendDirection,
    pub sales_volume: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MarketTrendDraft {
    #[serde(alias = "area")]
    pub area_id: Uuid,
    pub property_type: PropertyType,
    pub period: TrendPeriod,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    #[schema(value_type = String, example = "1850000.00")]
    pub average_price: Decimal,
    /// Percentage change over the previous period
    #[schema(value_type = String, example = "4.25")]
    pub price_change: Decimal,
    pub trend_direction: TrendDirection,
    #[validate(range(min = 0, message = "Sales volume must be a positive number"))]
    pub sales_volume: i32,
}

impl MarketTrendDraft {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.money("average_price", &self.average_price);
        check_percent(&mut checks, &self.price_change);
        if self.period_end_date < self.period_start_date {
            checks.fail(
                "period_end_date",
                "range",
                "Period end date cannot be before its start date",
            );
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MarketTrendPatch {
    #[serde(alias = "area")]
    pub area_id: Option<Uuid>,
    pub property_type: Option<PropertyType>,
    pub period: Option<TrendPeriod>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub average_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_change: Option<Decimal>,
    pub trend_direction: Option<TrendDirection>,
    #[validate(range(min = 0, message = "Sales volume must be a positive number"))]
    pub sales_volume: Option<i32>,
}

impl MarketTrendPatch {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if let Some(price) = &self.average_price {
            checks.money("average_price", price);
        }
        if let Some(change) = &self.price_change {
            check_percent(&mut checks, change);
        }
        checks.finish()
    }
}

/// Percent with at most 3 integer digits and 2 decimals, sign allowed.
fn check_percent(checks: &mut FieldChecks, value: &Decimal) {
    if value.abs() >= Decimal::from(1000) || value.normalize().scale() > CURRENCY_SCALE {
        checks.fail(
            "price_change",
            "range",
            "Price change must have at most 3 digits and 2 decimal places",
        );
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarketTrendResponse {
    pub id: Uuid,
    pub area_id: Uuid,
    pub area_name: String,
    pub property_type: PropertyType,
    pub period: TrendPeriod,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    #[schema(value_type = String)]
    pub average_price: Decimal,
    #[schema(value_type = String)]
    pub price_change: Decimal,
    pub trend_direction: TrendDirection,
    pub sales_volume: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketTrendResponse {
    pub fn new(trend: MarketTrend, area_name: String) -> Self {
        Self {
            id: trend.id,
            area_id: trend.area_id,
            area_name,
            property_type: trend.property_type,
            period: trend.period,
            period_start_date: trend.period_start_date,
            period_end_date: trend.period_end_date,
            average_price: trend.average_price,
            price_change: trend.price_change,
            trend_direction: trend.trend_direction,
            sales_volume: trend.sales_volume,
            created_at: trend.created_at,
            updated_at: trend.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendFilter {
    pub area_id: Option<Uuid>,
    pub property_type: Option<PropertyType>,
    pub period: Option<TrendPeriod>,
    pub trend_direction: Option<TrendDirection>,
}

// =============================================================================
// Blog posts
// =============================================================================

#[derive(Debug, Clone)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_id: Uuid,
    pub cover_image: Option<String>,
    pub published_date: NaiveDate,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BlogPostDraft {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    #[schema(example = "Five things to check before buying off-plan")]
    pub title: String,
    #[validate(length(max = 255, message = "Slug must be at most 255 characters"))]
    pub slug: Option<String>,
    pub excerpt: String,
    pub content: String,
    pub published_date: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

impl BlogPostDraft {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        checks.not_blank("title", &self.title);
        checks.not_blank("excerpt", &self.excerpt);
        checks.not_blank("content", &self.content);
        check_slug(&mut checks, &resolve_slug(self.slug.as_deref(), &self.title));
        check_tags(&mut checks, &self.tags);
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BlogPostPatch {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Slug must be at most 255 characters"))]
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl BlogPostPatch {
    pub fn check(&self) -> AppResult<()> {
        let mut checks = FieldChecks::start(self.validate());
        if let Some(title) = &self.title {
            checks.not_blank("title", title);
        }
        if let Some(slug) = &self.slug {
            check_slug(&mut checks, slug);
        }
        if let Some(tags) = &self.tags {
            check_tags(&mut checks, tags);
        }
        checks.finish()
    }
}

fn check_tags(checks: &mut FieldChecks, tags: &[String]) {
    if tags.iter().any(|tag| tag.chars().count() > MAX_TAG_LENGTH) {
        checks.fail("tags", "length", "Tags must be at most 50 characters");
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_details: AuthorSummary,
    pub cover_image: Option<String>,
    pub published_date: NaiveDate,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPostResponse {
    pub fn new(post: BlogPost, author: AuthorSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            author_details: author,
            cover_image: post.cover_image,
            published_date: post.published_date,
            tags: post.tags,
            is_published: post.is_published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogFilter {
    /// Substring match on title or excerpt
    pub search: Option<String>,
    /// Only posts carrying this tag
    pub tag: Option<String>,
}

// =============================================================================
// Market statistics
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarketStatistic {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub description: String,
    pub icon: String,
    pub is_featured: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MarketStatisticDraft {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    #[schema(example = "Average price per sqft")]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Value must be 1 to 100 characters"))]
    #[schema(example = "AED 1,450")]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 32767, message = "Display order must be a positive number"))]
    pub display_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MarketStatisticPatch {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Value must be 1 to 100 characters"))]
    pub value: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: Option<String>,
    pub is_featured: Option<bool>,
    #[validate(range(min = 0, max = 32767, message = "Display order must be a positive number"))]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticFilter {
    pub is_featured: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dubai Market Q1 2024: Prices Up!"), "dubai-market-q1-2024-prices-up");
        assert_eq!(slugify("  Off-Plan   vs  Ready  "), "off-plan-vs-ready");
        assert_eq!(slugify("Café Culture"), "caf-culture");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_explicit_slug_wins() {
        assert_eq!(resolve_slug(Some("q1-report"), "Anything"), "q1-report");
        assert_eq!(resolve_slug(Some("  "), "Marina Living"), "marina-living");
        assert_eq!(resolve_slug(None, "Marina Living"), "marina-living");
    }

    #[test]
    fn test_report_without_sluggable_title_is_rejected() {
        let draft = MarketReportDraft {
            title: "???".to_string(),
            slug: None,
            summary: "s".to_string(),
            content: "c".to_string(),
            published_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            is_featured: false,
        };
        let details = draft.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("slug"));
    }

    #[test]
    fn test_trend_checks_dates_and_percent() {
        let draft: MarketTrendDraft = serde_json::from_value(serde_json::json!({
            "area": Uuid::new_v4(),
            "property_type": "apartment",
            "period": "quarterly",
            "period_start_date": "2024-04-01",
            "period_end_date": "2024-03-31",
            "average_price": "1850000.00",
            "price_change": "1200.5",
            "trend_direction": "up",
            "sales_volume": 320
        }))
        .unwrap();

        let details = draft.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("period_end_date"));
        assert!(details.contains_key("price_change"));
    }

    #[test]
    fn test_blog_draft_defaults_to_published() {
        let draft: BlogPostDraft = serde_json::from_value(serde_json::json!({
            "title": "Moving to JVC",
            "excerpt": "e",
            "content": "c",
            "published_date": "2024-05-01",
            "tags": ["community", "x".repeat(51)]
        }))
        .unwrap();

        assert!(draft.is_published);
        let details = draft.check().unwrap_err().field_details().unwrap();
        assert!(details.contains_key("tags"));
    }
}
