//! Property aggregate: composite writes, image sub-actions, features,
//! listing filters and agent stats.

mod common;

use common::{money, property_draft, upload, TestApp};
use realty_api::domain::{PropertyFilter, PropertyPatch, PropertyStatus, PropertyType, Role};
use realty_api::errors::AppError;
use realty_api::infra::MockBlobStore;
use realty_api::services::ServiceContainer;
use realty_api::types::PaginationParams;
use uuid::Uuid;

fn names(features: &[String]) -> Vec<&str> {
    features.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_create_attaches_deduplicated_features_and_primary_image() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let mut draft = property_draft("Marina Gate 2BR", "2500000.00", None);
    draft.features = vec![
        "Sea View".to_string(),
        "Gym".to_string(),
        " Sea View ".to_string(),
    ];

    let detail = app
        .services
        .properties()
        .create(&admin, draft, vec![upload("front.jpg"), upload("kitchen.jpg")])
        .await
        .expect("property created");

    assert_eq!(names(&detail.features), vec!["Gym", "Sea View"]);
    assert_eq!(detail.images.len(), 2);
    assert_eq!(detail.images.iter().filter(|i| i.is_primary).count(), 1);
    assert_eq!(detail.images[0].image, "/media/property_images/front.jpg");

    let catalogue = app.services.properties().features().await.expect("features");
    assert_eq!(catalogue.len(), 2);
}

#[tokio::test]
async fn test_features_are_shared_between_properties() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    for title in ["One", "Two"] {
        let mut draft = property_draft(title, "100.00", None);
        draft.features = vec!["Parking".to_string()];
        app.property(&admin, draft).await;
    }

    let catalogue = app.services.properties().features().await.expect("features");
    assert_eq!(catalogue.len(), 1);
    assert_eq!(catalogue[0].name, "Parking");
}

#[tokio::test]
async fn test_agent_defaults_to_acting_agent() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let agent = app.agent("agent@example.com", &admin).await;

    let detail = app
        .property(&agent, property_draft("Agent listing", "900.00", None))
        .await;

    let assigned = detail.agent.expect("agent assigned");
    assert_eq!(Some(assigned.id), agent.agent_id());
    assert_eq!(assigned.email, "agent@example.com");
}

#[tokio::test]
async fn test_unknown_area_is_a_field_error_and_nothing_is_uploaded() {
    let mut blobs = MockBlobStore::new();
    blobs.expect_store().never();
    let app = TestApp::with_blobs(blobs).await;
    let admin = app.admin().await;

    let err = app
        .services
        .properties()
        .create(
            &admin,
            property_draft("Orphan", "100.00", Some(Uuid::new_v4())),
            vec![upload("x.jpg")],
        )
        .await
        .expect_err("unknown area rejected");

    let fields = err.field_details().expect("field errors");
    assert!(fields.contains_key("area_id"));
}

#[tokio::test]
async fn test_plain_user_cannot_create_property() {
    let app = TestApp::new().await;
    let buyer = app.user("buyer@example.com", &[]).await;

    let result = app
        .services
        .properties()
        .create(&buyer, property_draft("Nope", "1.00", None), Vec::new())
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_update_replaces_features_only_when_non_empty() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let properties = app.services.properties();

    let mut draft = property_draft("Villa", "5000000.00", None);
    draft.features = vec!["Garden".to_string(), "Pool".to_string()];
    let created = app.property(&admin, draft).await;

    let kept = properties
        .update(
            &admin,
            created.id,
            PropertyPatch {
                features: Some(Vec::new()),
                status: Some(PropertyStatus::UnderOffer),
                ..PropertyPatch::default()
            },
            Vec::new(),
        )
        .await
        .expect("updated");
    assert_eq!(names(&kept.features), vec!["Garden", "Pool"]);
    assert_eq!(kept.status, PropertyStatus::UnderOffer);

    let replaced = properties
        .update(
            &admin,
            created.id,
            PropertyPatch {
                features: Some(vec!["Terrace".to_string()]),
                ..PropertyPatch::default()
            },
            Vec::new(),
        )
        .await
        .expect("updated");
    assert_eq!(names(&replaced.features), vec!["Terrace"]);
}

#[tokio::test]
async fn test_add_images_with_primary_demotes_existing_primary() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let properties = app.services.properties();

    let created = properties
        .create(
            &admin,
            property_draft("Penthouse", "12000000.00", None),
            vec![upload("old.jpg")],
        )
        .await
        .expect("created");

    let added = properties
        .add_images(&admin, created.id, vec![upload("new.jpg"), upload("more.jpg")], true)
        .await
        .expect("images added");
    assert!(added[0].is_primary);
    assert!(!added[1].is_primary);

    let detail = properties.get(&admin, created.id).await.expect("detail");
    let primaries: Vec<&str> = detail
        .images
        .iter()
        .filter(|i| i.is_primary)
        .map(|i| i.image.as_str())
        .collect();
    assert_eq!(primaries, vec!["/media/property_images/new.jpg"]);
}

#[tokio::test]
async fn test_add_images_requires_assigned_agent_or_staff() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let owner = app.agent("owner@example.com", &admin).await;
    let other = app.agent("other@example.com", &admin).await;

    let listing = app.property(&owner, property_draft("Owned", "100.00", None)).await;
    let properties = app.services.properties();

    let denied = properties
        .add_images(&other, listing.id, vec![upload("a.jpg")], false)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let allowed = properties
        .add_images(&owner, listing.id, vec![upload("a.jpg")], false)
        .await
        .expect("assigned agent may upload");
    assert_eq!(allowed.len(), 1);

    let empty = properties.add_images(&owner, listing.id, Vec::new(), false).await;
    assert!(empty.unwrap_err().field_details().is_some());
}

#[tokio::test]
async fn test_promoting_an_image_keeps_a_single_primary() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let properties = app.services.properties();

    let created = properties
        .create(
            &admin,
            property_draft("Duplex", "750000.00", None),
            vec![upload("1.jpg"), upload("2.jpg")],
        )
        .await
        .expect("created");
    let second = created
        .images
        .iter()
        .find(|i| !i.is_primary)
        .expect("non-primary image")
        .id;

    let promoted = properties
        .update_image(&admin, second, true)
        .await
        .expect("promoted");
    assert!(promoted.is_primary);

    let detail = properties.get(&admin, created.id).await.expect("detail");
    assert_eq!(detail.images.iter().filter(|i| i.is_primary).count(), 1);
    assert_eq!(detail.images[0].id, second);

    properties.delete_image(&admin, second).await.expect("deleted");
    let missing = properties.delete_image(&admin, second).await;
    assert!(matches!(missing, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_list_filters_and_orders_by_price() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "Marina").await;

    let mut villa = property_draft("Villa", "300.00", Some(area_id));
    villa.property_type = PropertyType::Villa;
    app.property(&admin, villa).await;
    app.property(&admin, property_draft("Flat A", "200.00", Some(area_id))).await;
    app.property(&admin, property_draft("Flat B", "100.00", None)).await;

    let page = app
        .services
        .properties()
        .list(
            PropertyFilter {
                area_id: Some(area_id),
                ordering: Some("price".to_string()),
                ..PropertyFilter::default()
            },
            PaginationParams::default(),
        )
        .await
        .expect("listed");
    let titles: Vec<&str> = page.data.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Flat A", "Villa"]);
    assert_eq!(page.data[0].area_name.as_deref(), Some("Marina"));

    let villas = app
        .services
        .properties()
        .list(
            PropertyFilter {
                property_type: Some(PropertyType::Villa),
                ..PropertyFilter::default()
            },
            PaginationParams::default(),
        )
        .await
        .expect("listed");
    assert_eq!(villas.meta.total, 1);

    let bad_order = app
        .services
        .properties()
        .list(
            PropertyFilter {
                ordering: Some("-nonsense".to_string()),
                ..PropertyFilter::default()
            },
            PaginationParams::default(),
        )
        .await;
    assert!(bad_order.is_err());
}

#[tokio::test]
async fn test_detail_reports_viewer_favorite() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let buyer = app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;

    app.services.favorites().toggle(&buyer, listing.id).await.expect("toggled");

    let seen_by_buyer = app.services.properties().get(&buyer, listing.id).await.expect("detail");
    assert!(seen_by_buyer.is_favorited);
    let seen_by_admin = app.services.properties().get(&admin, listing.id).await.expect("detail");
    assert!(!seen_by_admin.is_favorited);
}

#[tokio::test]
async fn test_agent_stats_count_listings_and_sum_sold_prices() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let agent = app.agent("seller@example.com", &admin).await;
    let agent_id = agent.agent_id().expect("agent profile");

    let mut sold = property_draft("Sold one", "1000.50", None);
    sold.status = PropertyStatus::Sold;
    app.property(&agent, sold).await;
    let mut sold_too = property_draft("Sold two", "499.50", None);
    sold_too.status = PropertyStatus::Sold;
    app.property(&agent, sold_too).await;
    app.property(&agent, property_draft("Still listed", "99999.00", None)).await;

    let stats = app
        .services
        .agents()
        .update_stats(&admin, agent_id)
        .await
        .expect("recomputed");
    assert_eq!(stats.listings_count, 3);
    assert_eq!(stats.sales_volume, money("1500.00"));

    let profile = app.services.agents().get(agent_id).await.expect("agent");
    assert_eq!(profile.listings_count, 3);
    assert_eq!(profile.sales_volume, money("1500.00"));

    let forbidden = app.services.agents().update_stats(&agent, agent_id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_role_revocation_applies_to_next_sign_in() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let agent = app.user("temp@example.com", &[Role::Agent]).await;
    let user_id = agent.user_id().expect("signed in");

    app.services
        .users()
        .revoke_role(&admin, user_id, Role::Agent)
        .await
        .expect("revoked");

    let again = app.sign_in("temp@example.com").await;
    let result = app
        .services
        .properties()
        .create(&again, property_draft("Too late", "1.00", None), Vec::new())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_concurrent_creates_share_one_new_feature() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let properties = app.services.properties();

    let mut first = property_draft("Sky Villa", "9000000.00", None);
    first.features = vec!["Infinity Pool".to_string()];
    let mut second = property_draft("Cliff House", "7000000.00", None);
    second.features = vec!["Infinity Pool".to_string()];

    let (a, b) = tokio::join!(
        properties.create(&admin, first, Vec::new()),
        properties.create(&admin, second, Vec::new())
    );
    assert_eq!(names(&a.expect("first created").features), vec!["Infinity Pool"]);
    assert_eq!(names(&b.expect("second created").features), vec!["Infinity Pool"]);

    let catalogue = properties.features().await.expect("features");
    assert_eq!(catalogue.len(), 1);
    assert_eq!(catalogue[0].name, "Infinity Pool");
}

#[tokio::test]
async fn test_create_without_images_has_no_primary() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let detail = app
        .services
        .properties()
        .create(&admin, property_draft("Bare shell", "350000.00", None), Vec::new())
        .await
        .expect("created");
    assert!(detail.images.is_empty());

    let page = app
        .services
        .properties()
        .list(PropertyFilter::default(), PaginationParams::default())
        .await
        .expect("listed");
    assert_eq!(page.data[0].primary_image, None);
}

#[tokio::test]
async fn test_delete_property() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let listing = app.property(&admin, property_draft("Gone soon", "1.00", None)).await;
    let properties = app.services.properties();

    properties.delete(&admin, listing.id).await.expect("deleted");
    assert!(matches!(
        properties.get(&admin, listing.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        properties.delete(&admin, listing.id).await,
        Err(AppError::NotFound)
    ));
}
