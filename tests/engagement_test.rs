//! Favorites and inquiries.

mod common;

use common::{property_draft, TestApp};
use realty_api::domain::{Actor, FavoriteToggle, InquiryUpdate, NewFavorite, NewInquiry};
use realty_api::errors::AppError;
use realty_api::services::ServiceContainer;
use realty_api::types::PaginationParams;
use uuid::Uuid;

fn inquiry(property_id: Uuid, email: &str) -> NewInquiry {
    NewInquiry {
        property_id,
        name: "Sara Ahmed".to_string(),
        email: email.to_string(),
        phone: "+971500000000".to_string(),
        message: "Is it still available?".to_string(),
    }
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let buyer = app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let favorites = app.services.favorites();

    assert_eq!(
        favorites.toggle(&buyer, listing.id).await.unwrap(),
        FavoriteToggle::Added
    );
    assert_eq!(
        favorites.list(&buyer, PaginationParams::default()).await.unwrap().meta.total,
        1
    );
    assert_eq!(
        favorites.toggle(&buyer, listing.id).await.unwrap(),
        FavoriteToggle::Removed
    );
    assert_eq!(
        favorites.list(&buyer, PaginationParams::default()).await.unwrap().meta.total,
        0
    );
}

#[tokio::test]
async fn test_concurrent_toggles_never_duplicate() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let buyer = app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let favorites = app.services.favorites();

    let (first, second) = tokio::join!(
        favorites.toggle(&buyer, listing.id),
        favorites.toggle(&buyer, listing.id)
    );
    let mut outcomes = vec![first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|o| *o == FavoriteToggle::Removed);
    assert_eq!(outcomes, vec![FavoriteToggle::Added, FavoriteToggle::Removed]);

    let page = favorites.list(&buyer, PaginationParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_concurrent_adds_return_the_same_favorite() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let buyer = app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let favorites = app.services.favorites();

    let (first, second) = tokio::join!(
        favorites.add(&buyer, NewFavorite { property_id: listing.id }),
        favorites.add(&buyer, NewFavorite { property_id: listing.id })
    );
    assert_eq!(first.unwrap().id, second.unwrap().id);

    let page = favorites.list(&buyer, PaginationParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].property_details.title, "Loft");
}

#[tokio::test]
async fn test_toggle_unknown_property_is_not_found() {
    let app = TestApp::new().await;
    let buyer = app.user("buyer@example.com", &[]).await;

    let result = app.services.favorites().toggle(&buyer, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_anonymous_cannot_toggle() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;

    let result = app
        .services
        .favorites()
        .toggle(&Actor::Anonymous, listing.id)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_other_users_favorites_are_invisible() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let owner = app.user("owner@example.com", &[]).await;
    let stranger = app.user("stranger@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let favorites = app.services.favorites();

    let favorite = favorites
        .add(&owner, NewFavorite { property_id: listing.id })
        .await
        .unwrap();

    let page = favorites.list(&stranger, PaginationParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 0);

    let result = favorites.remove(&stranger, favorite.id).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    favorites.remove(&owner, favorite.id).await.expect("owner removes");
}

// =============================================================================
// Inquiries
// =============================================================================

#[tokio::test]
async fn test_anonymous_inquiry_is_accepted() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;

    let created = app
        .services
        .inquiries()
        .create(&Actor::Anonymous, inquiry(listing.id, "guest@example.com"))
        .await
        .expect("inquiry created");
    assert!(!created.is_processed);

    let all = app.services.inquiries().list(&admin, PaginationParams::default()).await.unwrap();
    assert_eq!(all.meta.total, 1);
}

#[tokio::test]
async fn test_inquiry_validation_reports_fields() {
    let app = TestApp::new().await;

    let mut bad = inquiry(Uuid::new_v4(), "not-an-email");
    bad.message = " ".to_string();
    let err = app
        .services
        .inquiries()
        .create(&Actor::Anonymous, bad)
        .await
        .expect_err("rejected");
    let fields = err.field_details().expect("field errors");
    assert!(fields.contains_key("email"));

    let err = app
        .services
        .inquiries()
        .create(&Actor::Anonymous, inquiry(Uuid::new_v4(), "ok@example.com"))
        .await
        .expect_err("unknown property");
    assert!(err.field_details().expect("field errors").contains_key("property_id"));
}

#[tokio::test]
async fn test_inquiry_scopes_follow_role() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let agent = app.agent("agent@example.com", &admin).await;
    let buyer = app.user("buyer@example.com", &[]).await;
    let other_buyer = app.user("other@example.com", &[]).await;

    let agents_listing = app.property(&agent, property_draft("Agent's", "100.00", None)).await;
    let house_listing = app.property(&admin, property_draft("House", "100.00", None)).await;

    let inquiries = app.services.inquiries();
    inquiries
        .create(&buyer, inquiry(agents_listing.id, "buyer@example.com"))
        .await
        .unwrap();
    inquiries
        .create(&other_buyer, inquiry(house_listing.id, "other@example.com"))
        .await
        .unwrap();
    inquiries
        .create(&agent, inquiry(house_listing.id, "agent@example.com"))
        .await
        .unwrap();

    let params = PaginationParams::default();
    assert_eq!(inquiries.list(&admin, params.clone()).await.unwrap().meta.total, 3);
    // Inquiries on the agent's listings plus the one the agent sent
    assert_eq!(inquiries.list(&agent, params.clone()).await.unwrap().meta.total, 2);
    assert_eq!(inquiries.list(&buyer, params.clone()).await.unwrap().meta.total, 1);
    assert_eq!(inquiries.list(&other_buyer, params.clone()).await.unwrap().meta.total, 1);

    let anonymous = inquiries.list(&Actor::Anonymous, params).await;
    assert!(matches!(anonymous, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_only_staff_or_assigned_agent_process_inquiries() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let agent = app.agent("agent@example.com", &admin).await;
    let outsider = app.agent("outsider@example.com", &admin).await;
    let buyer = app.user("buyer@example.com", &[]).await;

    let listing = app.property(&agent, property_draft("Agent's", "100.00", None)).await;
    let inquiries = app.services.inquiries();
    let sent = inquiries
        .create(&buyer, inquiry(listing.id, "buyer@example.com"))
        .await
        .unwrap();

    let processed = InquiryUpdate { is_processed: true };
    assert!(matches!(
        inquiries.update(&buyer, sent.id, processed.clone()).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        inquiries.update(&outsider, sent.id, processed.clone()).await,
        Err(AppError::Forbidden)
    ));

    let updated = inquiries.update(&agent, sent.id, processed).await.unwrap();
    assert!(updated.is_processed);

    inquiries.delete(&admin, sent.id).await.expect("staff deletes");
    assert!(matches!(
        inquiries.delete(&admin, sent.id).await,
        Err(AppError::NotFound)
    ));
}
