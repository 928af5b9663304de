//! The process-scoped engine handle.
//!
//! A [`Network`] owns the store and media collaborators; every operation of the engine is an
//! `async` method on it, spread over the `graph`, `engagement`, `ledger`, `feed`, `suggest`
//! and `accounts` modules. Construct one per process (or one per test) and pass it around.

use std::{collections::HashMap, sync::Arc};

use log::warn;

use crate::{
    config::{ConfigError, DEFAULT_SUGGESTION_COUNT, Settings},
    errors::{EntityKind, SocialError, SocialResult, StoreError},
    id::UserId,
    media::{DirectoryMediaHost, MediaHost},
    store::{EntityStore, RedisStore},
    types::{ActingUser, ActorSummary, Comment, CommentView, PublicProfile, UserRecord},
};

pub struct Network<S, M> {
    store: Arc<S>,
    media: Arc<M>,
    suggestion_count: usize,
}

impl<S, M> Clone for Network<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            media: Arc::clone(&self.media),
            suggestion_count: self.suggestion_count,
        }
    }
}

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    pub fn new(store: Arc<S>, media: Arc<M>) -> Self {
        Self {
            store,
            media,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
        }
    }

    pub fn with_suggestion_count(mut self, count: usize) -> Self {
        self.suggestion_count = count;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn media(&self) -> &Arc<M> {
        &self.media
    }

    pub fn suggestion_count(&self) -> usize {
        self.suggestion_count
    }

    /// Identity resolution: a fresh snapshot of the caller's id, username and following set.
    pub async fn resolve_actor(&self, id: &UserId) -> SocialResult<ActingUser> {
        let user = self.require_user(id).await?;
        Ok(ActingUser::from(&user))
    }

    /// Resolve the acting user by username.
    pub async fn resolve_actor_by_username(&self, username: &str) -> SocialResult<ActingUser> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| SocialError::not_found(EntityKind::User, username))?;
        Ok(ActingUser::from(&user))
    }

    pub(crate) async fn require_user(&self, id: &UserId) -> SocialResult<UserRecord> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| SocialError::not_found(EntityKind::User, id.as_str()))
    }

    /// Load each distinct user referenced by `ids` once. Unknown ids are absent from the map.
    pub(crate) async fn load_people(
        &self,
        ids: impl IntoIterator<Item = &UserId>,
    ) -> Result<HashMap<UserId, UserRecord>, StoreError> {
        let mut distinct: Vec<UserId> = ids.into_iter().cloned().collect();
        distinct.sort();
        distinct.dedup();
        let users = self.store.get_users(&distinct).await?;
        Ok(users.into_iter().map(|user| (user.id.clone(), user)).collect())
    }
}

/// Project one comment, tolerating a deleted author.
pub(crate) fn comment_view<A>(
    comment: &Comment,
    people: &HashMap<UserId, UserRecord>,
    project: impl Fn(&UserRecord) -> A,
) -> CommentView<A> {
    let author = people.get(&comment.author).map(&project);
    if author.is_none() {
        warn!("comment {} references missing author {}", comment.id, comment.author);
    }
    CommentView {
        id: comment.id.clone(),
        author_id: comment.author.clone(),
        author,
        text: comment.text.clone(),
        created_at: comment.created_at,
    }
}

pub(crate) fn summary(user: &UserRecord) -> ActorSummary {
    ActorSummary::from(user)
}

pub(crate) fn profile(user: &UserRecord) -> PublicProfile {
    PublicProfile::from(user)
}

/// Faults from building a network out of [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Network<RedisStore, DirectoryMediaHost> {
    /// Redis-backed network with a directory media host, as configured by `settings`.
    pub async fn connect(settings: &Settings) -> Result<Self, ConnectError> {
        let store = RedisStore::connect(&settings.redis_url()?, &settings.redis.prefix).await?;
        let media = DirectoryMediaHost::new(settings.media_root()?, settings.media_base_url()?);
        Ok(Self::new(Arc::new(store), Arc::new(media)).with_suggestion_count(settings.suggestions.count))
    }
}
