//! Market reports, trends, blog posts and statistics.

mod common;

use chrono::NaiveDate;
use common::{money, upload, TestApp};
use realty_api::domain::{
    Actor, BlogFilter, BlogPostDraft, BlogPostPatch, MarketReportDraft, MarketReportPatch,
    MarketStatisticDraft, MarketStatisticPatch, MarketTrendDraft, PropertyType, ReportFilter,
    StatisticFilter, TrendDirection, TrendFilter, TrendPeriod,
};
use realty_api::errors::AppError;
use realty_api::services::ServiceContainer;
use realty_api::types::PaginationParams;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn report(title: &str) -> MarketReportDraft {
    MarketReportDraft {
        title: title.to_string(),
        slug: None,
        summary: "Prices kept climbing".to_string(),
        content: "Full analysis".to_string(),
        published_date: date(2024, 4, 1),
        is_featured: false,
    }
}

fn post(title: &str, is_published: bool) -> BlogPostDraft {
    BlogPostDraft {
        title: title.to_string(),
        slug: None,
        excerpt: "Short version".to_string(),
        content: "Long version".to_string(),
        published_date: date(2024, 5, 2),
        tags: vec!["buying".to_string()],
        is_published,
    }
}

fn trend(area_id: Uuid) -> MarketTrendDraft {
    MarketTrendDraft {
        area_id,
        property_type: PropertyType::Apartment,
        period: TrendPeriod::Quarterly,
        period_start_date: date(2024, 1, 1),
        period_end_date: date(2024, 3, 31),
        average_price: money("1850000.00"),
        price_change: money("4.25"),
        trend_direction: TrendDirection::Up,
        sales_volume: 320,
    }
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_report_slug_is_derived_and_unique() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let insights = app.services.insights();

    let created = insights
        .create_report(&admin, report("Dubai Market Q1 2024"), Some(upload("cover.png")))
        .await
        .expect("report created");
    assert_eq!(created.slug, "dubai-market-q1-2024");
    assert_eq!(created.cover_image.as_deref(), Some("/media/report_covers/cover.png"));
    assert_eq!(Some(created.author_details.id), admin.user_id());

    let duplicate = insights
        .create_report(&admin, report("Dubai market: Q1 2024"), None)
        .await;
    match duplicate {
        Err(AppError::Conflict(what)) => assert!(what.contains("slug")),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.slug)),
    }

    let fetched = insights.get_report("dubai-market-q1-2024").await.expect("by slug");
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn test_report_update_and_delete_by_slug() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let insights = app.services.insights();
    insights.create_report(&admin, report("Rental outlook"), None).await.unwrap();

    let updated = insights
        .update_report(
            &admin,
            "rental-outlook",
            MarketReportPatch {
                slug: Some("rental-outlook-2024".to_string()),
                is_featured: Some(true),
                ..MarketReportPatch::default()
            },
            None,
        )
        .await
        .expect("updated");
    assert_eq!(updated.slug, "rental-outlook-2024");
    assert!(updated.is_featured);

    let featured = insights
        .list_reports(
            ReportFilter {
                is_featured: Some(true),
                ..ReportFilter::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(featured.meta.total, 1);

    assert!(matches!(
        insights.get_report("rental-outlook").await,
        Err(AppError::NotFound)
    ));
    insights.delete_report(&admin, "rental-outlook-2024").await.expect("deleted");
    assert!(matches!(
        insights.delete_report(&admin, "rental-outlook-2024").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_reports_are_staff_written() {
    let app = TestApp::new().await;
    let user = app.user("reader@example.com", &[]).await;

    let result = app.services.insights().create_report(&user, report("Mine"), None).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

// =============================================================================
// Trends
// =============================================================================

#[tokio::test]
async fn test_trend_carries_area_name_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "Dubai Hills").await;
    let insights = app.services.insights();

    let created = insights.create_trend(&admin, trend(area_id)).await.expect("trend created");
    assert_eq!(created.area_name, "Dubai Hills");

    let duplicate = insights.create_trend(&admin, trend(area_id)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let listed = insights
        .list_trends(
            TrendFilter {
                area_id: Some(area_id),
                ..TrendFilter::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(listed.meta.total, 1);
}

#[tokio::test]
async fn test_trend_validation() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "Arabian Ranches").await;
    let insights = app.services.insights();

    let mut backwards = trend(area_id);
    backwards.period_end_date = date(2023, 12, 31);
    let err = insights.create_trend(&admin, backwards).await.expect_err("rejected");
    assert!(err.field_details().unwrap().contains_key("period_end_date"));

    let err = insights
        .create_trend(&admin, trend(Uuid::new_v4()))
        .await
        .expect_err("unknown area");
    assert!(err.field_details().unwrap().contains_key("area_id"));
}

// =============================================================================
// Blog
// =============================================================================

#[tokio::test]
async fn test_drafts_are_hidden_from_everyone_but_author_and_staff() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let author = app.user("author@example.com", &[]).await;
    let reader = app.user("reader@example.com", &[]).await;
    let insights = app.services.insights();

    insights
        .create_post(&author, post("Published piece", true), None)
        .await
        .unwrap();
    let draft = insights
        .create_post(&author, post("Work in progress", false), None)
        .await
        .unwrap();
    assert_eq!(Some(draft.author_details.id), author.user_id());

    let params = PaginationParams::default;
    let public = insights
        .list_posts(&Actor::Anonymous, BlogFilter::default(), params())
        .await
        .unwrap();
    assert_eq!(public.meta.total, 1);
    let staff = insights
        .list_posts(&admin, BlogFilter::default(), params())
        .await
        .unwrap();
    assert_eq!(staff.meta.total, 2);

    assert!(matches!(
        insights.get_post(&reader, &draft.slug).await,
        Err(AppError::NotFound)
    ));
    assert!(insights.get_post(&author, &draft.slug).await.is_ok());
    assert!(insights.get_post(&admin, &draft.slug).await.is_ok());
}

#[tokio::test]
async fn test_only_author_or_staff_edit_posts() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let author = app.user("author@example.com", &[]).await;
    let other = app.user("other@example.com", &[]).await;
    let insights = app.services.insights();

    let created = insights
        .create_post(&author, post("Buying off-plan", true), None)
        .await
        .unwrap();

    let patch = BlogPostPatch {
        excerpt: Some("Edited".to_string()),
        ..BlogPostPatch::default()
    };
    assert!(matches!(
        insights.update_post(&other, &created.slug, patch.clone(), None).await,
        Err(AppError::Forbidden)
    ));
    let edited = insights
        .update_post(&author, &created.slug, patch, Some(upload("new.png")))
        .await
        .unwrap();
    assert_eq!(edited.excerpt, "Edited");
    assert_eq!(edited.cover_image.as_deref(), Some("/media/blog_covers/new.png"));

    assert!(matches!(
        insights.delete_post(&other, &created.slug).await,
        Err(AppError::Forbidden)
    ));
    insights.delete_post(&admin, &created.slug).await.expect("staff deletes");
}

#[tokio::test]
async fn test_anonymous_cannot_write_posts() {
    let app = TestApp::new().await;

    let result = app
        .services
        .insights()
        .create_post(&Actor::Anonymous, post("Nope", true), None)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_blog_filter_by_tag() {
    let app = TestApp::new().await;
    let author = app.user("author@example.com", &[]).await;
    let insights = app.services.insights();

    let mut tagged = post("Renting guide", true);
    tagged.tags = vec!["renting".to_string(), "guide".to_string()];
    insights.create_post(&author, tagged, None).await.unwrap();
    insights.create_post(&author, post("Buying guide", true), None).await.unwrap();

    let renting = insights
        .list_posts(
            &Actor::Anonymous,
            BlogFilter {
                tag: Some("renting".to_string()),
                ..BlogFilter::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(renting.meta.total, 1);
    assert_eq!(renting.data[0].title, "Renting guide");
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_statistics_are_ordered_and_filtered() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let insights = app.services.insights();

    for (name, order, featured) in [("Rental yield", 2, true), ("Price per sqft", 1, true), ("Listings", 3, false)] {
        insights
            .create_statistic(
                &admin,
                MarketStatisticDraft {
                    name: name.to_string(),
                    value: "42".to_string(),
                    description: String::new(),
                    icon: "chart".to_string(),
                    is_featured: featured,
                    display_order: order,
                },
            )
            .await
            .unwrap();
    }

    let featured = insights
        .list_statistics(StatisticFilter { is_featured: Some(true) })
        .await
        .unwrap();
    let names: Vec<&str> = featured.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Price per sqft", "Rental yield"]);

    let id = featured[0].id;
    let updated = insights
        .update_statistic(
            &admin,
            id,
            MarketStatisticPatch {
                value: Some("AED 1,450".to_string()),
                ..MarketStatisticPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.value, "AED 1,450");

    let invalid = insights
        .update_statistic(
            &admin,
            id,
            MarketStatisticPatch {
                name: Some(String::new()),
                ..MarketStatisticPatch::default()
            },
        )
        .await;
    assert!(invalid.unwrap_err().field_details().unwrap().contains_key("name"));

    insights.delete_statistic(&admin, id).await.unwrap();
    assert!(matches!(insights.get_statistic(id).await, Err(AppError::NotFound)));
}
