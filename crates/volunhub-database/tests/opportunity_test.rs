//! Integration tests for the opportunity catalog.

mod helpers;

use volunhub_core::error::ErrorKind;
use volunhub_entity::opportunity::{OpportunityFilter, UpdateOpportunity};

#[tokio::test]
async fn test_create_and_fetch_with_skills() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let org = app.create_organization("Harbor Kitchen").await;

    let mut input = helpers::new_opportunity(org.id, "Soup Night", 40);
    input.required_skills = vec!["cooking".into(), "serving".into(), "cooking".into()];
    let created = app.store.opportunities.create_opportunity(input).await.unwrap();

    let fetched = app
        .store
        .opportunities
        .get_opportunity_by_id(created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.title, "Soup Night");
    assert_eq!(fetched.points_awarded, 40);
    assert_eq!(fetched.required_skills, vec!["cooking", "serving"]);
}

#[tokio::test]
async fn test_volunteers_cannot_post() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let volunteer = app.create_volunteer("Not An Org").await;

    let err = app
        .store
        .opportunities
        .create_opportunity(helpers::new_opportunity(volunteer.id, "Rogue Event", 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .store
        .opportunities
        .create_opportunity(helpers::new_opportunity(uuid::Uuid::new_v4(), "Orphan Event", 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_negative_points_rejected() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let org = app.create_organization("Negative Org").await;

    let err = app
        .store
        .opportunities
        .create_opportunity(helpers::new_opportunity(org.id, "Bad Points", -10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_listing_filters_are_and_combined() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let org = app.create_organization("Filter Org").await;
    let marker = helpers::unique_marker();

    let mut garden = helpers::new_opportunity(org.id, &format!("Garden {marker}"), 10);
    garden.category = "Environment".into();
    garden.location = "Porto Riverside".into();
    let garden = app.store.opportunities.create_opportunity(garden).await.unwrap();

    let mut library = helpers::new_opportunity(org.id, "Library Hours", 10);
    library.description = format!("Shelve books ({marker})");
    library.category = "Education".into();
    let library = app.store.opportunities.create_opportunity(library).await.unwrap();

    let by_keyword = app
        .store
        .opportunities
        .get_opportunities(&OpportunityFilter {
            keyword: Some(marker.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = by_keyword.iter().map(|o| o.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&garden.id) && ids.contains(&library.id));
    assert_eq!(ids[0], library.id, "newest first");

    let narrowed = app
        .store
        .opportunities
        .get_opportunities(&OpportunityFilter {
            keyword: Some(marker.clone()),
            category: Some("Environment".into()),
            location: Some("riverside".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].id, garden.id);

    let blank_category = app
        .store
        .opportunities
        .get_opportunities(&OpportunityFilter {
            keyword: Some(marker),
            category: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(blank_category.len(), 2);

    let owned = app
        .store
        .opportunities
        .get_opportunities(&OpportunityFilter::for_organization(org.id))
        .await
        .unwrap();
    assert_eq!(owned.len(), 2);
}

#[tokio::test]
async fn test_update_refreshes_timestamp_and_replaces_skills() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let org = app.create_organization("Update Org").await;

    let mut input = helpers::new_opportunity(org.id, "Park Cleanup", 20);
    input.required_skills = vec!["lifting".into()];
    let created = app.store.opportunities.create_opportunity(input).await.unwrap();

    let updated = app
        .store
        .opportunities
        .update_opportunity(
            created.id,
            UpdateOpportunity {
                points_awarded: Some(35),
                required_skills: Some(vec!["raking".into(), "sorting".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Park Cleanup");
    assert_eq!(updated.points_awarded, 35);
    assert_eq!(updated.required_skills, vec!["raking", "sorting"]);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_delete_removes_skills_and_applications() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let org = app.create_organization("Delete Org").await;
    let volunteer = app.create_volunteer("Delete Applicant").await;

    let mut input = helpers::new_opportunity(org.id, "Short Lived", 5);
    input.required_skills = vec!["patience".into()];
    let opportunity = app.store.opportunities.create_opportunity(input).await.unwrap();
    app.store
        .applications
        .submit_volunteer_application(volunhub_entity::application::NewApplication {
            opportunity_id: opportunity.id,
            volunteer_id: volunteer.id,
            resume_url: None,
            cover_letter: None,
        })
        .await
        .unwrap();

    app.store
        .opportunities
        .delete_opportunity(opportunity.id)
        .await
        .unwrap();

    assert!(
        app.store
            .opportunities
            .get_opportunity_by_id(opportunity.id)
            .await
            .unwrap()
            .is_none()
    );
    let skills: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM opportunity_skills WHERE opportunity_id = $1")
            .bind(opportunity.id)
            .fetch_one(app.pool())
            .await
            .unwrap();
    assert_eq!(skills, 0);
    assert!(
        app.store
            .applications
            .get_applications_for_volunteer(volunteer.id)
            .await
            .unwrap()
            .is_empty()
    );

    let err = app
        .store
        .opportunities
        .delete_opportunity(opportunity.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
