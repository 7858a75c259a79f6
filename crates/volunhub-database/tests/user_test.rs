//! Integration tests for user accounts.

mod helpers;

use volunhub_core::error::ErrorKind;
use volunhub_entity::stats::VolunteerStats;
use volunhub_entity::user::{UpdateUser, UserRole};

#[tokio::test]
async fn test_create_volunteer_with_attributes_and_seed_badges() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let mut input = helpers::new_user("Ana Lopez", UserRole::Volunteer);
    input.skills = vec!["tutoring".into(), " cooking ".into(), "tutoring".into()];
    input.causes = vec!["education".into()];
    input.badges = vec!["Early Bird".into()];

    let user = app.store.users.create_user(input).await.unwrap();

    assert_eq!(user.skills, vec!["cooking", "tutoring"]);
    assert_eq!(user.causes, vec!["education"]);
    let stats = user.stats.expect("volunteers carry stats");
    assert_eq!(stats.points, 0);
    assert_eq!(stats.hours, 0.0);
    assert_eq!(stats.badges, vec!["Early Bird"]);
}

#[tokio::test]
async fn test_organization_has_no_stats() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let org = app.create_organization("Shoreline Trust").await;
    let loaded = app.store.users.get_user_by_id(org.id).await.unwrap().unwrap();

    assert_eq!(loaded.role, UserRole::Organization);
    assert!(loaded.stats.is_none());
}

#[tokio::test]
async fn test_badges_refused_for_organizations() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let mut input = helpers::new_user("Badge Org", UserRole::Organization);
    input.badges = vec!["Founder".into()];

    let err = app.store.users.create_user(input).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_get_user_by_email_is_case_insensitive() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let user = app.create_volunteer("Case Check").await;
    let found = app
        .store
        .users
        .get_user_by_email(&user.email.to_uppercase())
        .await
        .unwrap()
        .expect("user should be found by upper-cased email");

    assert_eq!(found.id, user.id);
    assert_eq!(found.stats, Some(VolunteerStats::default()));
}

#[tokio::test]
async fn test_missing_user_is_none() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let missing = app
        .store
        .users
        .get_user_by_email(&helpers::unique_email("nobody"))
        .await
        .unwrap();
    assert!(missing.is_none());

    let missing = app.store.users.get_user_by_id(uuid::Uuid::new_v4()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let first = helpers::new_user("Twin", UserRole::Volunteer);
    let mut second = first.clone();
    second.email = first.email.to_uppercase();

    app.store.users.create_user(first).await.unwrap();
    let err = app.store.users.create_user(second).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_user_touches_only_supplied_fields() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let mut input = helpers::new_user("Partial Update", UserRole::Volunteer);
    input.bio = Some("Gardener".into());
    input.skills = vec!["planting".into(), "pruning".into()];
    input.causes = vec!["environment".into()];
    let user = app.store.users.create_user(input).await.unwrap();

    let updated = app
        .store
        .users
        .update_user(
            user.id,
            UpdateUser {
                onboarding_completed: Some(true),
                skills: Some(vec!["composting".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.onboarding_completed);
    assert_eq!(updated.name, "Partial Update");
    assert_eq!(updated.bio.as_deref(), Some("Gardener"));
    assert_eq!(updated.skills, vec!["composting"]);
    assert_eq!(updated.causes, vec!["environment"]);
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn test_update_user_can_clear_skills() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let mut input = helpers::new_user("Clear Skills", UserRole::Volunteer);
    input.skills = vec!["driving".into()];
    let user = app.store.users.create_user(input).await.unwrap();

    let updated = app
        .store
        .users
        .update_user(
            user.id,
            UpdateUser {
                skills: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.skills.is_empty());
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };

    let err = app
        .store
        .users
        .update_user(
            uuid::Uuid::new_v4(),
            UpdateUser {
                name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
}
