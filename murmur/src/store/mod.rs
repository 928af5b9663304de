//! Entity store abstraction.
//!
//! The engine never reads-modifies-writes a whole set: every relationship change is a single
//! `push_*`/`pull_*` call that the backend must apply atomically. Multi-step operations
//! (both halves of a follow edge, a like plus its notification) are sequenced by the engine,
//! not by the store.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::{
    errors::StoreError,
    id::{NotificationId, PostId, UserId},
    types::{Comment, NotificationRecord, PostQuery, PostRecord, UserRecord, UserSet},
};

pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Persist a new user. Fails with [`StoreError::Conflict`] when the username or email
    /// (case-insensitive) already belongs to someone else; username is checked first.
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Overwrite the profile fields of an existing user, moving unique index entries when the
    /// username or email changed. Relationship sets on `user` are ignored.
    async fn save_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Batch lookup. Unknown ids are skipped; order follows `ids`.
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn user_set_contains(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError>;

    /// Atomically add `member` to one of the user's sets. Returns `true` if it was absent.
    async fn push_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError>;

    /// Atomically remove `member` from one of the user's sets. Returns `true` if it was present.
    async fn pull_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError>;

    /// Unordered, non-repeating random sample of at most `count` users outside `exclude`.
    async fn sample_users(&self, exclude: &HashSet<UserId>, count: usize) -> Result<Vec<UserRecord>, StoreError>;

    async fn insert_post(&self, post: &PostRecord) -> Result<(), StoreError>;

    async fn get_post(&self, id: &PostId) -> Result<Option<PostRecord>, StoreError>;

    /// Remove the post document with its like set, comment list and index entries.
    /// Returns `false` if the post did not exist. Other users' `liked_posts` are untouched.
    async fn delete_post(&self, id: &PostId) -> Result<bool, StoreError>;

    /// Atomically add `user` to the post's like set. Returns `true` if it was absent.
    async fn push_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError>;

    /// Atomically remove `user` from the post's like set. Returns `true` if it was present.
    async fn pull_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError>;

    /// Atomically append to the comment sequence and return the whole sequence.
    /// `None` when the post no longer exists.
    async fn push_comment(&self, post: &PostId, comment: &Comment) -> Result<Option<Vec<Comment>>, StoreError>;

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, StoreError>;

    async fn insert_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError>;

    /// Notifications addressed to `to`, newest first.
    async fn list_notifications(&self, to: &UserId) -> Result<Vec<NotificationRecord>, StoreError>;

    /// Mark the given notifications as read. Ids that are not in `to`'s inbox are ignored.
    /// Returns how many changed.
    async fn mark_notifications_read(&self, to: &UserId, ids: &[NotificationId]) -> Result<u64, StoreError>;

    /// Delete every notification addressed to `to`. Returns how many were removed.
    async fn delete_notifications(&self, to: &UserId) -> Result<u64, StoreError>;
}
