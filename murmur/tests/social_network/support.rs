pub(crate) use std::{collections::HashSet, sync::Arc};

pub(crate) use chrono::{Duration, Utc};
pub(crate) use murmur::{
    ActingUser, FollowOutcome, MediaError, MediaHost, MemoryMediaHost, MemoryStore, Network, NewPost, NotificationId,
    NotificationKind, PostId, PostView, ProfileUpdate, Signup, SocialError, UserId,
    errors::StoreError,
    store::EntityStore,
    types::{Comment, NotificationRecord, PostQuery, PostRecord, UserRecord, UserSet},
};

use async_trait::async_trait;
use parking_lot::Mutex;

pub(crate) const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub(crate) type TestNetwork<S = MemoryStore, M = MemoryMediaHost> = Network<S, M>;

pub(crate) fn network() -> TestNetwork {
    Network::new(Arc::new(MemoryStore::new()), Arc::new(MemoryMediaHost::new()))
}

pub(crate) fn signup_request(username: &str) -> Signup {
    Signup {
        username: username.to_string(),
        full_name: format!("{username} tester"),
        email: format!("{username}@example.com"),
        password: "password123".to_string(),
    }
}

/// Sign `username` up and return them as an acting user.
pub(crate) async fn join<S: EntityStore, M: MediaHost>(net: &Network<S, M>, username: &str) -> ActingUser {
    let profile = net.signup(signup_request(username)).await.expect("signup");
    net.resolve_actor(&profile.id).await.expect("resolve actor")
}

/// Re-resolve `actor` so `following` reflects the store.
pub(crate) async fn refresh<S: EntityStore, M: MediaHost>(net: &Network<S, M>, actor: &ActingUser) -> ActingUser {
    net.resolve_actor(&actor.id).await.expect("resolve actor")
}

pub(crate) async fn user<S: EntityStore, M: MediaHost>(net: &Network<S, M>, id: &UserId) -> UserRecord {
    net.store().get_user(id).await.expect("get user").expect("user exists")
}

pub(crate) async fn post_text<S: EntityStore, M: MediaHost>(
    net: &Network<S, M>,
    actor: &ActingUser,
    text: &str,
) -> PostView {
    net.create_post(
        actor,
        NewPost {
            text: Some(text.to_string()),
            image: None,
        },
    )
    .await
    .expect("create post")
}

pub(crate) async fn notifications_for<S: EntityStore, M: MediaHost>(
    net: &Network<S, M>,
    id: &UserId,
) -> Vec<NotificationRecord> {
    net.store().list_notifications(id).await.expect("list notifications")
}

/// Insert a post directly into the store, bypassing validation and owner checks.
pub(crate) async fn raw_post<S: EntityStore, M: MediaHost>(
    net: &Network<S, M>,
    owner: &UserId,
    text: &str,
    created_at: chrono::DateTime<Utc>,
) -> PostId {
    let post = PostRecord {
        id: PostId::generate(),
        owner: owner.clone(),
        text: Some(text.to_string()),
        image: None,
        likes: Default::default(),
        comments: Vec::new(),
        created_at,
        updated_at: created_at,
    };
    net.store().insert_post(&post).await.expect("insert post");
    post.id
}

/// Which store call [`FlakyStore`] should fail next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FailPoint {
    PushUserSet(UserSet),
    PullUserSet(UserSet),
    PushLike,
    InsertNotification,
}

/// A write another client slips in just before a chosen call.
#[derive(Debug, Clone)]
pub(crate) enum Interleave {
    /// Delete the post right before `push_like` runs.
    DeletePostBeforeLike(PostId),
    /// Deliver a notification right before `mark_notifications_read` runs.
    NotifyBeforeMark(NotificationRecord),
}

/// Memory store that fails one chosen call, once, or interleaves one foreign write.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    armed: Mutex<Option<FailPoint>>,
    interleave: Mutex<Option<Interleave>>,
}

impl FlakyStore {
    pub(crate) fn fail_next(&self, point: FailPoint) {
        *self.armed.lock() = Some(point);
    }

    pub(crate) fn interleave_next(&self, write: Interleave) {
        *self.interleave.lock() = Some(write);
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn take_interleave(&self, pick: impl Fn(&Interleave) -> bool) -> Option<Interleave> {
        let mut slot = self.interleave.lock();
        if slot.as_ref().is_some_and(pick) { slot.take() } else { None }
    }

    fn trip(&self, point: FailPoint) -> Result<(), StoreError> {
        let mut armed = self.armed.lock();
        if *armed == Some(point) {
            *armed = None;
            return Err(StoreError::Other {
                message: format!("injected failure at {point:?}").into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.inner.insert_user(user).await
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.inner.save_user(user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.get_user(id).await
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.get_users(ids).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.find_user_by_username(username).await
    }

    async fn user_set_contains(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        self.inner.user_set_contains(id, set, member).await
    }

    async fn push_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        self.trip(FailPoint::PushUserSet(set))?;
        self.inner.push_user_set(id, set, member).await
    }

    async fn pull_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        self.trip(FailPoint::PullUserSet(set))?;
        self.inner.pull_user_set(id, set, member).await
    }

    async fn sample_users(&self, exclude: &HashSet<UserId>, count: usize) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.sample_users(exclude, count).await
    }

    async fn insert_post(&self, post: &PostRecord) -> Result<(), StoreError> {
        self.inner.insert_post(post).await
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<PostRecord>, StoreError> {
        self.inner.get_post(id).await
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, StoreError> {
        self.inner.delete_post(id).await
    }

    async fn push_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        self.trip(FailPoint::PushLike)?;
        if let Some(Interleave::DeletePostBeforeLike(gone)) =
            self.take_interleave(|write| matches!(write, Interleave::DeletePostBeforeLike(_)))
        {
            self.inner.delete_post(&gone).await?;
        }
        self.inner.push_like(post, user).await
    }

    async fn pull_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        self.inner.pull_like(post, user).await
    }

    async fn push_comment(&self, post: &PostId, comment: &Comment) -> Result<Option<Vec<Comment>>, StoreError> {
        self.inner.push_comment(post, comment).await
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, StoreError> {
        self.inner.list_posts(query).await
    }

    async fn insert_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError> {
        self.trip(FailPoint::InsertNotification)?;
        self.inner.insert_notification(notification).await
    }

    async fn list_notifications(&self, to: &UserId) -> Result<Vec<NotificationRecord>, StoreError> {
        self.inner.list_notifications(to).await
    }

    async fn mark_notifications_read(&self, to: &UserId, ids: &[NotificationId]) -> Result<u64, StoreError> {
        if let Some(Interleave::NotifyBeforeMark(late)) =
            self.take_interleave(|write| matches!(write, Interleave::NotifyBeforeMark(_)))
        {
            self.inner.insert_notification(&late).await?;
        }
        self.inner.mark_notifications_read(to, ids).await
    }

    async fn delete_notifications(&self, to: &UserId) -> Result<u64, StoreError> {
        self.inner.delete_notifications(to).await
    }
}

pub(crate) fn flaky_network() -> (TestNetwork<FlakyStore>, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::default());
    let net = Network::new(Arc::clone(&store), Arc::new(MemoryMediaHost::new()));
    (net, store)
}

/// Media host whose `destroy` always fails; uploads succeed.
#[derive(Default)]
pub(crate) struct BrokenDestroyMedia {
    inner: MemoryMediaHost,
}

#[async_trait]
impl MediaHost for BrokenDestroyMedia {
    async fn upload(&self, bytes: &[u8]) -> Result<String, MediaError> {
        self.inner.upload(bytes).await
    }

    async fn destroy(&self, _url: &str) -> Result<(), MediaError> {
        Err(MediaError::Rejected {
            message: "media host unavailable".to_string(),
        })
    }
}
