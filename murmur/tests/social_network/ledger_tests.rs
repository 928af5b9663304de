use crate::support::*;

#[tokio::test]
async fn inbox_lists_newest_first_then_marks_read() {
    let net = network();
    let owner = join(&net, "owner").await;
    let fan = join(&net, "fan").await;
    let post = post_text(&net, &owner, "like me").await;

    net.toggle_follow(&fan, &owner.id).await.unwrap();
    net.toggle_like(&fan, &post.id).await.unwrap();
    assert_eq!(net.unread_count(&owner.id).await.unwrap(), 2);

    let first = net.list_and_mark_read(&owner.id).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].kind, NotificationKind::Like, "newest first");
    assert_eq!(first[1].kind, NotificationKind::Follow);
    assert!(first.iter().all(|n| !n.read), "views carry the pre-mark state");
    assert_eq!(first[0].from.as_ref().map(|f| f.username.as_str()), Some("fan"));
    assert_eq!(first[0].to, owner.id);

    let second = net.list_and_mark_read(&owner.id).await.unwrap();
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|n| n.read));
    assert_eq!(net.unread_count(&owner.id).await.unwrap(), 0);
}

#[tokio::test]
async fn empty_inbox_lists_nothing() {
    let net = network();
    let loner = join(&net, "loner").await;
    assert!(net.list_and_mark_read(&loner.id).await.unwrap().is_empty());
    assert_eq!(net.clear(&loner.id).await.unwrap(), 0);
}

#[tokio::test]
async fn clear_reports_count_and_empties_inbox() {
    let net = network();
    let owner = join(&net, "owner").await;
    for name in ["a", "b", "c"] {
        let fan = join(&net, name).await;
        net.toggle_follow(&fan, &owner.id).await.unwrap();
    }

    assert_eq!(net.clear(&owner.id).await.unwrap(), 3);
    assert!(net.list_and_mark_read(&owner.id).await.unwrap().is_empty());
    assert_eq!(net.clear(&owner.id).await.unwrap(), 0);
}

#[tokio::test]
async fn inboxes_are_isolated() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let carol = join(&net, "carol").await;

    net.toggle_follow(&carol, &alice.id).await.unwrap();
    net.toggle_follow(&carol, &bob.id).await.unwrap();

    net.list_and_mark_read(&alice.id).await.unwrap();
    assert_eq!(net.unread_count(&bob.id).await.unwrap(), 1, "marking alice's inbox leaves bob's alone");

    net.clear(&alice.id).await.unwrap();
    assert_eq!(notifications_for(&net, &bob.id).await.len(), 1);
    assert!(notifications_for(&net, &carol.id).await.is_empty());
}

#[tokio::test]
async fn notification_from_missing_sender_renders_without_summary() {
    let net = network();
    let owner = join(&net, "owner").await;
    let ghost = UserId::generate();
    net.store()
        .insert_notification(&NotificationRecord {
            id: NotificationId::generate(),
            kind: NotificationKind::Follow,
            from: ghost.clone(),
            to: owner.id.clone(),
            read: false,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let listed = net.list_and_mark_read(&owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].from_id, ghost);
    assert!(listed[0].from.is_none());
}

#[tokio::test]
async fn notification_arriving_after_listing_stays_unread() {
    let (net, store) = flaky_network();
    let owner = join(&net, "owner").await;
    let early = join(&net, "early").await;
    let late = join(&net, "late").await;
    net.toggle_follow(&early, &owner.id).await.unwrap();

    store.interleave_next(Interleave::NotifyBeforeMark(NotificationRecord {
        id: NotificationId::generate(),
        kind: NotificationKind::Follow,
        from: late.id.clone(),
        to: owner.id.clone(),
        read: false,
        created_at: Utc::now(),
    }));
    let listed = net.list_and_mark_read(&owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].from_id, early.id);
    assert_eq!(store.inner().notification_count(), 2);

    assert_eq!(net.unread_count(&owner.id).await.unwrap(), 1, "the late one was never listed");
    let next = net.list_and_mark_read(&owner.id).await.unwrap();
    assert_eq!(next[0].from_id, late.id);
    assert!(!next[0].read);
    assert!(next[1].read);
}
