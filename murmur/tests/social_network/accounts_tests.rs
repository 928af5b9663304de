use crate::support::*;

#[tokio::test]
async fn signup_returns_public_profile() {
    let net = network();
    let profile = net
        .signup(Signup {
            username: "  alice ".to_string(),
            full_name: " Alice Liddell ".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.full_name, "Alice Liddell");
    assert!(profile.followers.is_empty() && profile.following.is_empty() && profile.liked_posts.is_empty());
    assert!(profile.bio.is_none() && profile.profile_img.is_none());

    let json = serde_json::to_string(&profile).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains("secret1"));

    let stored = user(&net, &profile.id).await;
    assert_ne!(stored.password_hash, "secret1");
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn username_conflict_is_case_insensitive() {
    let net = network();
    join(&net, "alice").await;

    let mut request = signup_request("ALICE");
    request.email = "other@example.com".to_string();
    let err = net.signup(request).await.unwrap_err();
    assert!(matches!(err, SocialError::AlreadyExists { ref field, .. } if field == "username"));
    assert_eq!(net.store().user_count(), 1);
}

#[tokio::test]
async fn email_conflict_reported_after_username() {
    let net = network();
    join(&net, "alice").await;

    let mut request = signup_request("bob");
    request.email = "Alice@Example.com".to_string();
    let err = net.signup(request).await.unwrap_err();
    assert!(matches!(err, SocialError::AlreadyExists { ref field, .. } if field == "email"));

    // both collide: username wins
    let err = net.signup(signup_request("alice")).await.unwrap_err();
    assert!(matches!(err, SocialError::AlreadyExists { ref field, .. } if field == "username"));
}

#[tokio::test]
async fn signup_validates_fields() {
    let net = network();

    let mut bad_email = signup_request("alice");
    bad_email.email = "not-an-email".to_string();
    let err = net.signup(bad_email).await.unwrap_err();
    assert!(err.to_string().contains("invalid email format"));

    let mut short = signup_request("alice");
    short.password = "12345".to_string();
    let err = net.signup(short).await.unwrap_err();
    assert!(err.to_string().contains("at least 6 characters"));

    let mut nameless = signup_request("alice");
    nameless.full_name = "   ".to_string();
    assert!(net.signup(nameless).await.unwrap_err().is_invalid_operation());

    assert!(net.signup(signup_request("bad name")).await.unwrap_err().is_invalid_operation());

    let mut exact = signup_request("alice");
    exact.password = "123456".to_string();
    assert!(net.signup(exact).await.is_ok(), "six characters is enough");
}

#[tokio::test]
async fn profile_lookup_by_username() {
    let net = network();
    let alice = join(&net, "alice").await;

    let profile = net.profile("alice").await.unwrap();
    assert_eq!(profile.id, alice.id);
    assert_eq!(net.profile("ALICE").await.unwrap().id, alice.id);
    assert!(net.profile("nobody").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_applies_non_blank_fields() {
    let net = network();
    let alice = join(&net, "alice").await;

    let updated = net
        .update_profile(
            &alice,
            ProfileUpdate {
                bio: Some("  down the rabbit hole ".to_string()),
                link: Some("https://wonderland.example".to_string()),
                full_name: Some("   ".to_string()),
                email: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("down the rabbit hole"));
    assert_eq!(updated.link.as_deref(), Some("https://wonderland.example"));
    assert_eq!(updated.full_name, "alice tester", "blank keeps current value");
    assert_eq!(updated.email, "alice@example.com");
    assert!(updated.updated_at >= updated.created_at);
}

#[tokio::test]
async fn update_rejects_invalid_values() {
    let net = network();
    let alice = join(&net, "alice").await;

    let bad_link = ProfileUpdate {
        link: Some("nope".to_string()),
        ..Default::default()
    };
    assert!(net.update_profile(&alice, bad_link).await.unwrap_err().is_invalid_operation());

    let bad_email = ProfileUpdate {
        email: Some("still nope".to_string()),
        ..Default::default()
    };
    assert!(net.update_profile(&alice, bad_email).await.unwrap_err().is_invalid_operation());
    assert!(user(&net, &alice.id).await.link.is_none());
}

#[tokio::test]
async fn rename_respects_uniqueness_and_frees_old_name() {
    let net = network();
    let alice = join(&net, "alice").await;
    join(&net, "bob").await;

    let taken = ProfileUpdate {
        username: Some("Bob".to_string()),
        ..Default::default()
    };
    let err = net.update_profile(&alice, taken).await.unwrap_err();
    assert!(matches!(err, SocialError::AlreadyExists { ref field, .. } if field == "username"));

    let rename = ProfileUpdate {
        username: Some("alicia".to_string()),
        ..Default::default()
    };
    net.update_profile(&alice, rename).await.unwrap();
    assert_eq!(net.profile("alicia").await.unwrap().id, alice.id);
    assert!(net.profile("alice").await.unwrap_err().is_not_found());

    join(&net, "alice").await;
}

#[tokio::test]
async fn new_image_replaces_old_asset() {
    let net = network();
    let alice = join(&net, "alice").await;

    let first = net
        .update_profile(
            &alice,
            ProfileUpdate {
                profile_img: Some(PNG.to_vec()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let old_url = first.profile_img.expect("avatar uploaded");
    assert!(net.media().contains(&old_url));

    let second = net
        .update_profile(
            &alice,
            ProfileUpdate {
                profile_img: Some(PNG.to_vec()),
                cover_img: Some(PNG.to_vec()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let new_url = second.profile_img.expect("avatar replaced");
    assert_ne!(old_url, new_url);
    assert!(!net.media().contains(&old_url));
    assert!(net.media().contains(&new_url));
    assert!(second.cover_img.is_some());
    assert_eq!(net.media().len(), 2);
}

#[tokio::test]
async fn update_for_unknown_actor_is_not_found() {
    let net = network();
    let ghost = ActingUser {
        id: UserId::generate(),
        username: "ghost".to_string(),
        following: Default::default(),
    };
    let err = net.update_profile(&ghost, ProfileUpdate::default()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn colliding_update_keeps_current_image_and_discards_upload() {
    let net = network();
    let alice = join(&net, "alice").await;
    join(&net, "bob").await;

    let avatar = net
        .update_profile(
            &alice,
            ProfileUpdate {
                profile_img: Some(PNG.to_vec()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .profile_img
        .expect("avatar uploaded");

    let err = net
        .update_profile(
            &alice,
            ProfileUpdate {
                username: Some("bob".to_string()),
                profile_img: Some(PNG.to_vec()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SocialError::AlreadyExists { ref field, .. } if field == "username"));

    let stored = user(&net, &alice.id).await;
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.profile_img.as_deref(), Some(avatar.as_str()));
    assert!(net.media().contains(&avatar), "stored avatar is still hosted");
    assert_eq!(net.media().len(), 1, "the rejected upload is released");
}
