use crate::support::*;

const CROWD: usize = 16;

async fn crowd(net: &TestNetwork, prefix: &str) -> Vec<ActingUser> {
    let mut users = Vec::with_capacity(CROWD);
    for i in 0..CROWD {
        users.push(join(net, &format!("{prefix}{i}")).await);
    }
    users
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_are_all_recorded() {
    let net = network();
    let owner = join(&net, "owner").await;
    let post = post_text(&net, &owner, "popular").await;
    let likers = crowd(&net, "liker").await;

    let handles: Vec<_> = likers
        .iter()
        .cloned()
        .map(|liker| {
            let net = net.clone();
            let post_id = post.id.clone();
            tokio::spawn(async move { net.toggle_like(&liker, &post_id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = net.store().get_post(&post.id).await.unwrap().unwrap();
    assert_eq!(stored.likes.len(), CROWD);
    for liker in &likers {
        assert!(user(&net, &liker.id).await.liked_posts.contains(&post.id));
    }
    assert_eq!(notifications_for(&net, &owner.id).await.len(), CROWD);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_follows_stay_symmetric() {
    let net = network();
    let star = join(&net, "star").await;
    let fans = crowd(&net, "fan").await;

    let handles: Vec<_> = fans
        .iter()
        .cloned()
        .map(|fan| {
            let net = net.clone();
            let target = star.id.clone();
            tokio::spawn(async move { net.toggle_follow(&fan, &target).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), FollowOutcome::Followed);
    }

    let star_record = user(&net, &star.id).await;
    assert_eq!(star_record.followers.len(), CROWD);
    for fan in &fans {
        assert!(user(&net, &fan.id).await.following.contains(&star.id));
    }
    assert!(net.reconcile_edges(&star.id).await.unwrap().is_clean());
    assert_eq!(net.unread_count(&star.id).await.unwrap(), CROWD);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_toggles_from_one_user_stay_symmetric() {
    let net = network();
    let owner = join(&net, "owner").await;
    let clicker = join(&net, "clicker").await;

    for round in 0..CROWD {
        let post = post_text(&net, &owner, &format!("round {round}")).await;
        let clicks: Vec<_> = (0..2)
            .map(|_| {
                let net = net.clone();
                let clicker = clicker.clone();
                let post_id = post.id.clone();
                tokio::spawn(async move { net.toggle_like(&clicker, &post_id).await })
            })
            .collect();
        for click in clicks {
            click.await.unwrap().unwrap();
        }

        let stored = net.store().get_post(&post.id).await.unwrap().unwrap();
        let indexed = user(&net, &clicker.id).await.liked_posts.contains(&post.id);
        assert_eq!(stored.likes.contains(&clicker.id), indexed, "round {round}");
    }

    let notes = notifications_for(&net, &owner.id).await;
    assert!(notes.len() <= CROWD, "at most one like notification per post");
    assert!(notes.iter().all(|n| n.kind == NotificationKind::Like && n.from == clicker.id));
}
