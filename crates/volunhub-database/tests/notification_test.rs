//! Integration tests for the notification log.

mod helpers;

use volunhub_core::error::ErrorKind;
use volunhub_database::repositories::notification::FEED_LIMIT;

#[tokio::test]
async fn test_feed_is_newest_first_and_capped() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let user = app.create_volunteer("Busy Inbox").await;

    for i in 0..(FEED_LIMIT + 5) {
        app.store
            .notifications
            .create_notification(user.id, &format!("Update #{i}"), None)
            .await
            .unwrap();
    }

    let feed = app
        .store
        .notifications
        .get_notifications_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(feed.len() as i64, FEED_LIMIT);
    assert_eq!(feed[0].message, format!("Update #{}", FEED_LIMIT + 4));
    assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(feed.iter().all(|n| n.is_unread()));
}

#[tokio::test]
async fn test_mark_read_is_gated_on_owner() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let owner = app.create_volunteer("Owner").await;
    let intruder = app.create_volunteer("Intruder").await;

    let notification = app
        .store
        .notifications
        .create_notification(owner.id, "Your shift starts at 9.", Some("/schedule"))
        .await
        .unwrap();
    assert_eq!(notification.link.as_deref(), Some("/schedule"));

    let err = app
        .store
        .notifications
        .mark_notification_read(notification.id, intruder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.store.notifications.count_unread(owner.id).await.unwrap(), 1);

    app.store
        .notifications
        .mark_notification_read(notification.id, owner.id)
        .await
        .unwrap();
    assert_eq!(app.store.notifications.count_unread(owner.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_mark_all_returns_affected_count() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let user = app.create_volunteer("Bulk Reader").await;
    let bystander = app.create_volunteer("Bystander").await;

    for text in ["One", "Two", "Three"] {
        app.store
            .notifications
            .create_notification(user.id, text, None)
            .await
            .unwrap();
    }
    app.store
        .notifications
        .create_notification(bystander.id, "Untouched", None)
        .await
        .unwrap();

    let changed = app
        .store
        .notifications
        .mark_all_notifications_read(user.id)
        .await
        .unwrap();
    assert_eq!(changed, 3);
    assert_eq!(
        app.store
            .notifications
            .mark_all_notifications_read(user.id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(app.store.notifications.count_unread(bystander.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_notifications_are_rejected() {
    let Some(app) = helpers::TestApp::new().await else {
        return;
    };
    let user = app.create_volunteer("Picky Inbox").await;

    let err = app
        .store
        .notifications
        .create_notification(user.id, "  ", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .store
        .notifications
        .create_notification(uuid::Uuid::new_v4(), "Hello", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
