use crate::support::*;

fn texts(feed: &[PostView]) -> Vec<&str> {
    feed.iter().filter_map(|post| post.text.as_deref()).collect()
}

#[tokio::test]
async fn global_feed_is_newest_first() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let base = Utc::now() - Duration::hours(1);

    raw_post(&net, &alice.id, "oldest", base).await;
    raw_post(&net, &bob.id, "newest", base + Duration::minutes(20)).await;
    raw_post(&net, &alice.id, "middle", base + Duration::minutes(10)).await;

    let feed = net.global_feed().await.unwrap();
    assert_eq!(texts(&feed), vec!["newest", "middle", "oldest"]);
    assert!(feed.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));
    assert_eq!(feed[0].owner.as_ref().map(|o| o.username.as_str()), Some("bob"));
}

#[tokio::test]
async fn following_feed_only_shows_followed_authors() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let carol = join(&net, "carol").await;
    let base = Utc::now() - Duration::hours(1);

    raw_post(&net, &bob.id, "b1", base).await;
    raw_post(&net, &carol.id, "c1", base + Duration::minutes(1)).await;
    raw_post(&net, &bob.id, "b2", base + Duration::minutes(2)).await;
    raw_post(&net, &alice.id, "mine", base + Duration::minutes(3)).await;

    assert!(net.following_feed(&alice.id).await.unwrap().is_empty(), "following no one");

    net.toggle_follow(&alice, &bob.id).await.unwrap();
    let feed = net.following_feed(&alice.id).await.unwrap();
    assert_eq!(texts(&feed), vec!["b2", "b1"]);

    net.toggle_follow(&alice, &carol.id).await.unwrap();
    let feed = net.following_feed(&alice.id).await.unwrap();
    assert_eq!(texts(&feed), vec!["b2", "c1", "b1"]);
}

#[tokio::test]
async fn following_feed_for_unknown_viewer_is_not_found() {
    let net = network();
    assert!(net.following_feed(&UserId::generate()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn author_feed_by_username() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    post_text(&net, &alice, "a1").await;
    post_text(&net, &bob, "b1").await;
    post_text(&net, &alice, "a2").await;

    let feed = net.author_feed("alice").await.unwrap();
    assert_eq!(texts(&feed), vec!["a2", "a1"]);
    assert!(feed.iter().all(|post| post.owner_id == alice.id));

    assert!(net.author_feed("Alice").await.is_ok(), "usernames match case-insensitively");
    assert!(net.author_feed("nobody").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn liked_feed_follows_liked_posts_and_skips_deleted() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let keep = post_text(&net, &bob, "keep").await;
    let gone = post_text(&net, &bob, "gone").await;
    post_text(&net, &bob, "ignored").await;

    assert!(net.liked_feed(&alice.id).await.unwrap().is_empty());

    net.toggle_like(&alice, &keep.id).await.unwrap();
    net.toggle_like(&alice, &gone.id).await.unwrap();
    let mut liked = texts(&net.liked_feed(&alice.id).await.unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    liked.sort();
    assert_eq!(liked, vec!["gone", "keep"]);

    net.delete_post(&bob, &gone.id).await.unwrap();
    let feed = net.liked_feed(&alice.id).await.unwrap();
    assert_eq!(texts(&feed), vec!["keep"]);
    assert_eq!(feed[0].likes, vec![alice.id.clone()]);
}

#[tokio::test]
async fn feed_projects_commenters_and_tolerates_missing_users() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let post = post_text(&net, &alice, "hello").await;
    net.append_comment(&bob, &post.id, "hi alice").await.unwrap();

    let ghost = UserId::generate();
    net.store()
        .push_comment(
            &post.id,
            &Comment {
                id: murmur::CommentId::generate(),
                author: ghost.clone(),
                text: "from beyond".to_string(),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    raw_post(&net, &ghost, "orphan", Utc::now() - Duration::days(1)).await;

    let feed = net.global_feed().await.unwrap();
    assert_eq!(texts(&feed), vec!["hello", "orphan"]);

    let comments = &feed[0].comments;
    assert_eq!(comments.len(), 2);
    let commenter = comments[0].author.as_ref().expect("bob projected");
    assert_eq!(commenter.username, "bob");
    assert_eq!(commenter.email, "bob@example.com");
    assert_eq!(comments[1].author_id, ghost);
    assert!(comments[1].author.is_none());

    assert_eq!(feed[1].owner_id, ghost);
    assert!(feed[1].owner.is_none());

    let json = serde_json::to_string(&feed).unwrap();
    assert!(!json.contains("password"));
}
