use crate::support::*;

#[tokio::test]
async fn suggestions_exclude_self_and_followed() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    let mut others = Vec::new();
    for name in ["carol", "dave", "erin", "frank", "grace"] {
        others.push(join(&net, name).await.id);
    }
    net.toggle_follow(&alice, &bob.id).await.unwrap();

    for _ in 0..10 {
        let picks = net.suggest(&alice.id, 3).await.unwrap();
        assert_eq!(picks.len(), 3);
        let ids: HashSet<UserId> = picks.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 3, "no duplicates");
        assert!(!ids.contains(&alice.id));
        assert!(!ids.contains(&bob.id));
        assert!(ids.iter().all(|id| others.contains(id)));
    }
}

#[tokio::test]
async fn suggestions_are_bounded_by_candidates() {
    let net = network();
    let alice = join(&net, "alice").await;
    join(&net, "bob").await;
    join(&net, "carol").await;

    let picks = net.suggest(&alice.id, 10).await.unwrap();
    assert_eq!(picks.len(), 2);
    assert!(net.suggest(&alice.id, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn no_suggestions_when_everyone_is_followed() {
    let net = network();
    let alice = join(&net, "alice").await;
    let bob = join(&net, "bob").await;
    net.toggle_follow(&alice, &bob.id).await.unwrap();

    assert!(net.suggest(&alice.id, 4).await.unwrap().is_empty());
}

#[tokio::test]
async fn default_count_comes_from_network() {
    let net = network();
    let alice = join(&net, "alice").await;
    for i in 0..6 {
        join(&net, &format!("user{i}")).await;
    }
    assert_eq!(net.suggest_default(&alice.id).await.unwrap().len(), 4);

    let net = net.with_suggestion_count(2);
    assert_eq!(net.suggest_default(&alice.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_viewer_is_not_found() {
    let net = network();
    assert!(net.suggest(&UserId::generate(), 4).await.unwrap_err().is_not_found());
}
