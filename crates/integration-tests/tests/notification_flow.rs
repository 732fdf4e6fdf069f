//! Notification fan-out and per-recipient management.

use domains::AppError;
use integration_tests::World;

#[tokio::test]
async fn broadcast_reaches_every_account() {
    let world = World::new().await;

    let count = world
        .notifications
        .broadcast(world.admin, "Monsoon notice", "Market closed Friday.")
        .await
        .unwrap();
    assert_eq!(count, 3);

    for caller in [world.admin, world.seller, world.buyer] {
        let inbox = world.notifications.list_for(caller).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Monsoon notice");
        assert_eq!(world.notifications.unread_count(caller).await.unwrap(), 1);
    }
}

#[tokio::test]
async fn broadcast_is_admin_only_and_validates_content() {
    let world = World::new().await;

    let err = world
        .notifications
        .broadcast(world.seller, "Hi", "everyone")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));

    let err = world
        .notifications
        .broadcast(world.admin, "   ", "no title")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Nothing was written by either failed attempt.
    for caller in [world.admin, world.seller, world.buyer] {
        assert!(world.notifications.list_for(caller).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn recipients_manage_only_their_own_notifications() {
    let world = World::new().await;
    world
        .notifications
        .broadcast(world.admin, "Monsoon notice", "Market closed Friday.")
        .await
        .unwrap();

    let inbox = world.notifications.list_for(world.seller).await.unwrap();
    let notice_id = inbox[0].id;

    // Another farmer can neither read-flag nor delete it.
    let err = world
        .notifications
        .mark_read(world.buyer, notice_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));

    world
        .notifications
        .mark_read(world.seller, notice_id)
        .await
        .unwrap();
    assert_eq!(
        world.notifications.unread_count(world.seller).await.unwrap(),
        0
    );

    world
        .notifications
        .delete(world.seller, notice_id)
        .await
        .unwrap();
    assert!(world
        .notifications
        .list_for(world.seller)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn newest_notifications_come_first() {
    let world = World::new().await;
    world
        .notifications
        .broadcast(world.admin, "First", "first body")
        .await
        .unwrap();
    world
        .notifications
        .broadcast(world.admin, "Second", "second body")
        .await
        .unwrap();

    let inbox = world.notifications.list_for(world.buyer).await.unwrap();
    assert_eq!(inbox[0].title, "Second");
    assert_eq!(inbox[1].title, "First");
}
