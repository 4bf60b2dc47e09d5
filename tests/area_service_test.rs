//! Area aggregate: composite writes, rollback and derived stats.

mod common;

use common::{area_draft, money, property_draft, upload, TestApp};
use realty_api::domain::{AreaFilter, AreaPatch, GuideData, PerkSpec, Role};
use realty_api::errors::AppError;
use realty_api::infra::{MockBlobStore, UnitOfWork};
use realty_api::services::ServiceContainer;
use realty_api::types::PaginationParams;

fn perk(name: &str) -> PerkSpec {
    PerkSpec {
        name: name.to_string(),
        description: format!("{} nearby", name),
    }
}

async fn area_count(app: &TestApp) -> u64 {
    app.services
        .areas()
        .list(AreaFilter::default(), PaginationParams::default())
        .await
        .expect("list areas")
        .meta
        .total
}

#[tokio::test]
async fn test_create_area_writes_images_perks_and_guide_together() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let mut draft = area_draft("Dubai Marina");
    draft.perks = vec![perk("Beach"), perk("Metro")];
    draft.guide_data = Some(GuideData {
        content: Some("Waterfront living".to_string()),
        schools: Some("Two international schools".to_string()),
        ..GuideData::default()
    });

    let detail = app
        .services
        .areas()
        .create(
            &admin,
            draft,
            vec![upload("first.jpg"), upload("second.jpg")],
            Some(upload("cover.jpg")),
        )
        .await
        .expect("area created");

    assert_eq!(detail.images.len(), 2);
    assert!(detail.images[0].is_primary);
    assert!(!detail.images[1].is_primary);
    assert_eq!(detail.cover_image.as_deref(), Some("/media/area_images/cover.jpg"));
    assert_eq!(detail.perks.len(), 2);

    let guide = detail.guide.expect("guide created");
    assert_eq!(guide.content, "Waterfront living");
    assert_eq!(guide.schools, "Two international schools");
    assert_eq!(guide.lifestyle, "");
}

#[tokio::test]
async fn test_failed_upload_leaves_no_area_behind() {
    let mut blobs = MockBlobStore::new();
    blobs.expect_store().returning(|upload, _| {
        if upload.file_name == "broken.jpg" {
            Err(AppError::storage("disk full"))
        } else {
            Ok(format!("/media/{}", upload.file_name))
        }
    });
    let app = TestApp::with_blobs(blobs).await;
    let admin = app.admin().await;

    let result = app
        .services
        .areas()
        .create(
            &admin,
            area_draft("Jumeirah"),
            vec![upload("ok.jpg"), upload("broken.jpg")],
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(area_count(&app).await, 0);
}

#[tokio::test]
async fn test_failure_inside_transaction_rolls_back_parent_row() {
    let app = TestApp::new().await;
    let draft = area_draft("Palm Jumeirah");

    let result: Result<(), AppError> = app
        .uow
        .transaction(move |tx| {
            Box::pin(async move {
                let area = tx.areas().insert(&draft, None).await?;
                tx.areas().add_perks(area.id, &[perk("Marina")]).await?;
                Err::<(), _>(AppError::internal("child write failed"))
            })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(area_count(&app).await, 0);
}

#[tokio::test]
async fn test_update_replaces_perks_only_when_list_is_non_empty() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let areas = app.services.areas();

    let mut draft = area_draft("Downtown");
    draft.perks = vec![perk("Mall"), perk("Opera")];
    let created = areas
        .create(&admin, draft, vec![upload("a.jpg")], None)
        .await
        .expect("area created");

    let untouched = areas
        .update(
            &admin,
            created.id,
            AreaPatch {
                perks: Some(Vec::new()),
                description: Some("Updated".to_string()),
                ..AreaPatch::default()
            },
            vec![upload("b.jpg")],
            None,
        )
        .await
        .expect("update succeeds");
    assert_eq!(untouched.perks.len(), 2);
    assert_eq!(untouched.description, "Updated");
    assert_eq!(untouched.images.len(), 2);
    assert_eq!(untouched.images.iter().filter(|i| i.is_primary).count(), 1);

    let replaced = areas
        .update(
            &admin,
            created.id,
            AreaPatch {
                perks: Some(vec![perk("Fountain")]),
                ..AreaPatch::default()
            },
            Vec::new(),
            None,
        )
        .await
        .expect("update succeeds");
    let names: Vec<&str> = replaced.perks.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Fountain"]);
}

#[tokio::test]
async fn test_update_guide_keeps_absent_sections() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let areas = app.services.areas();

    let mut draft = area_draft("Business Bay");
    draft.guide_data = Some(GuideData {
        content: Some("Canal views".to_string()),
        transportation: Some("Metro".to_string()),
        ..GuideData::default()
    });
    let created = areas.create(&admin, draft, Vec::new(), None).await.expect("created");

    let updated = areas
        .update(
            &admin,
            created.id,
            AreaPatch {
                guide_data: Some(GuideData {
                    content: Some("Canal and skyline views".to_string()),
                    ..GuideData::default()
                }),
                ..AreaPatch::default()
            },
            Vec::new(),
            None,
        )
        .await
        .expect("updated");

    let guide = updated.guide.expect("guide kept");
    assert_eq!(guide.content, "Canal and skyline views");
    assert_eq!(guide.transportation, "Metro");
}

#[tokio::test]
async fn test_update_unknown_area_is_not_found_before_upload() {
    let mut blobs = MockBlobStore::new();
    blobs.expect_store().never();
    let app = TestApp::with_blobs(blobs).await;
    let admin = app.admin().await;

    let result = app
        .services
        .areas()
        .update(
            &admin,
            uuid::Uuid::new_v4(),
            AreaPatch::default(),
            vec![upload("x.jpg")],
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_non_staff_cannot_write_areas() {
    let app = TestApp::new().await;
    let agent_role = app.user("someone@example.com", &[Role::Agent]).await;

    let result = app
        .services
        .areas()
        .create(&agent_role, area_draft("Al Barsha"), Vec::new(), None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
    assert_eq!(area_count(&app).await, 0);
}

#[tokio::test]
async fn test_blank_name_is_a_field_error() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let err = app
        .services
        .areas()
        .create(&admin, area_draft("   "), Vec::new(), None)
        .await
        .expect_err("blank name rejected");

    let fields = err.field_details().expect("field errors");
    assert!(fields.contains_key("name"));
}

#[tokio::test]
async fn test_update_stats_recomputes_count_and_average() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "JVC").await;

    app.property(&admin, property_draft("Studio", "100.00", Some(area_id))).await;
    app.property(&admin, property_draft("Loft", "300.00", Some(area_id))).await;
    app.property(&admin, property_draft("Elsewhere", "999.00", None)).await;

    // Stats only move on an explicit trigger
    let before = app.services.areas().get(area_id).await.expect("area");
    assert_eq!(before.properties_count, 0);

    let stats = app
        .services
        .areas()
        .update_stats(&admin, area_id)
        .await
        .expect("recomputed");
    assert_eq!(stats.properties_count, 2);
    assert_eq!(stats.average_price, money("200.00"));

    let after = app.services.areas().get(area_id).await.expect("area");
    assert_eq!(after.properties_count, 2);
    assert_eq!(after.average_price, money("200.00"));
}

#[tokio::test]
async fn test_recompute_all_areas_resets_empty_areas() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let full = app.area(&admin, "Full").await;
    let empty = app.area(&admin, "Empty").await;
    app.property(&admin, property_draft("One", "250.50", Some(full))).await;

    let count = app.services.stats().recompute_all_areas().await.expect("recomputed");
    assert_eq!(count, 2);

    let full = app.services.areas().get(full).await.expect("area");
    assert_eq!(full.properties_count, 1);
    assert_eq!(full.average_price, money("250.50"));

    let empty = app.services.areas().get(empty).await.expect("area");
    assert_eq!(empty.properties_count, 0);
    assert_eq!(empty.average_price, money("0"));
}

#[tokio::test]
async fn test_featured_lists_only_featured_areas() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let mut featured = area_draft("Bluewaters");
    featured.featured = true;
    app.services
        .areas()
        .create(&admin, featured, Vec::new(), None)
        .await
        .expect("created");
    app.area(&admin, "Al Quoz").await;

    let listed = app.services.areas().featured().await.expect("featured");
    let names: Vec<&str> = listed.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Bluewaters"]);
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "Al Furjan").await;

    for (title, price) in [("One", "100.00"), ("Two", "200.00"), ("Three", "300.00")] {
        app.property(&admin, property_draft(title, price, Some(area_id))).await;
    }

    let areas = app.services.areas();
    let first = areas.update_stats(&admin, area_id).await.expect("recomputed");
    let second = areas.update_stats(&admin, area_id).await.expect("recomputed again");

    assert_eq!(first.properties_count, 3);
    assert_eq!(first.average_price, money("200.00"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_delete_area() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let area_id = app.area(&admin, "Meydan").await;
    let areas = app.services.areas();

    areas.delete(&admin, area_id).await.expect("deleted");
    assert!(matches!(areas.get(area_id).await, Err(AppError::NotFound)));
    assert!(matches!(
        areas.delete(&admin, area_id).await,
        Err(AppError::NotFound)
    ));
}
