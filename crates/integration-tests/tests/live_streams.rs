//! Live list views: full-snapshot redelivery driven by the change hub.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use domains::models::AdFilter;
use integration_tests::{draft, World};
use services::live::{self, Change};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn approved_listing_stream_redelivers_full_snapshots() {
    let world = World::new().await;
    let ads = world.ads.clone();
    let mut stream = Box::pin(live::snapshots(
        &world.hub,
        |change| matches!(change, Change::ApprovedAds),
        move || {
            let ads = ads.clone();
            async move { ads.list_approved(&AdFilter::default()).await }
        },
    ));

    // The current state arrives without any change happening first.
    let initial = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert!(initial.is_empty());

    let ad = world
        .ads
        .post_ad(world.seller, draft("45 HP tractor"))
        .await
        .unwrap();
    world.moderation.approve(world.admin, ad.id).await.unwrap();

    let snapshot = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].title, "45 HP tractor");
}

#[tokio::test]
async fn conversation_stream_follows_new_chats_and_messages() {
    let world = World::new().await;
    let ad = world
        .ads
        .post_ad(world.seller, draft("Jersey cow"))
        .await
        .unwrap();
    world.moderation.approve(world.admin, ad.id).await.unwrap();

    let messaging = world.messaging.clone();
    let seller = world.seller;
    let mut stream = Box::pin(live::snapshots(
        &world.hub,
        move |change| matches!(change, Change::Conversations(id) if *id == seller.id),
        move || {
            let messaging = messaging.clone();
            async move { messaging.conversations(seller).await }
        },
    ));
    let initial = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert!(initial.is_empty());

    let conversation = world
        .messaging
        .start_conversation(world.buyer, ad.id)
        .await
        .unwrap();
    let snapshot = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].last_message, None);

    world
        .messaging
        .send_message(world.buyer, conversation.id, "Still available?")
        .await
        .unwrap();
    let snapshot = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(snapshot[0].last_message.as_deref(), Some("Still available?"));
    assert!(snapshot[0].unread_for(seller.id));
}

#[tokio::test]
async fn other_users_changes_do_not_wake_the_stream() {
    let world = World::new().await;
    let notifications = world.notifications.clone();
    let buyer = world.buyer;
    let mut stream = Box::pin(live::snapshots(
        &world.hub,
        move |change| matches!(change, Change::Notifications(id) if *id == buyer.id),
        move || {
            let notifications = notifications.clone();
            async move { notifications.list_for(buyer).await }
        },
    ));
    let initial = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert!(initial.is_empty());

    // An approval notifies the seller only; the buyer's stream stays quiet.
    let ad = world
        .ads
        .post_ad(world.seller, draft("Drip irrigation kit"))
        .await
        .unwrap();
    world.moderation.approve(world.admin, ad.id).await.unwrap();

    let silent = timeout(Duration::from_millis(300), stream.next()).await;
    assert!(silent.is_err());
}
