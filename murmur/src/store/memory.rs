use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::seq::IteratorRandom;

use super::EntityStore;
use crate::{
    errors::StoreError,
    id::{NotificationId, PostId, UserId},
    types::{Comment, NotificationRecord, PostQuery, PostRecord, UserRecord, UserSet},
};

/// In-process store. Each trait method takes the lock once, so a multi-step engine operation
/// interleaves with other callers exactly as it would against a remote backend.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    usernames: HashMap<String, UserId>,
    emails: HashMap<String, UserId>,
    posts: HashMap<PostId, Sequenced<PostRecord>>,
    notifications: HashMap<NotificationId, Sequenced<NotificationRecord>>,
    next_seq: u64,
}

/// Insertion sequence breaks ties between records created within the same instant.
struct Sequenced<T> {
    seq: u64,
    record: T,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn claim_unique(&self, user: &UserRecord) -> Result<(), StoreError> {
        for (field, index, value) in [
            ("username", &self.usernames, &user.username),
            ("email", &self.emails, &user.email),
        ] {
            if let Some(owner) = index.get(&value.to_ascii_lowercase())
                && owner != &user.id
            {
                return Err(StoreError::Conflict {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }

    pub fn notification_count(&self) -> usize {
        self.state.read().notifications.len()
    }
}

fn newest_first<T>(mut items: Vec<&Sequenced<T>>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<&Sequenced<T>> {
    items.sort_by_key(|item| Reverse((created_at(&item.record), item.seq)));
    items
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.users.contains_key(&user.id) {
            return Err(StoreError::Conflict {
                field: "id".to_string(),
                value: user.id.to_string(),
            });
        }
        state.claim_unique(user)?;
        state.usernames.insert(user.username.to_ascii_lowercase(), user.id.clone());
        state.emails.insert(user.email.to_ascii_lowercase(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let Some(existing) = state.users.get(&user.id) else {
            return Err(StoreError::Other {
                message: format!("user {} does not exist", user.id).into(),
            });
        };
        let (old_username, old_email) = (existing.username.to_ascii_lowercase(), existing.email.to_ascii_lowercase());
        state.claim_unique(user)?;
        state.usernames.remove(&old_username);
        state.emails.remove(&old_email);
        state.usernames.insert(user.username.to_ascii_lowercase(), user.id.clone());
        state.emails.insert(user.email.to_ascii_lowercase(), user.id.clone());
        if let Some(stored) = state.users.get_mut(&user.id) {
            stored.username = user.username.clone();
            stored.email = user.email.clone();
            stored.password_hash = user.password_hash.clone();
            stored.full_name = user.full_name.clone();
            stored.bio = user.bio.clone();
            stored.link = user.link.clone();
            stored.profile_img = user.profile_img.clone();
            stored.cover_img = user.cover_img.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.state.read().users.get(id).cloned())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        let state = self.state.read();
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.read();
        Ok(state
            .usernames
            .get(&username.to_ascii_lowercase())
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn user_set_contains(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let state = self.state.read();
        Ok(state.users.get(id).is_some_and(|user| match set {
            UserSet::Followers => user.followers.contains(&UserId::from(member)),
            UserSet::Following => user.following.contains(&UserId::from(member)),
            UserSet::LikedPosts => user.liked_posts.contains(&PostId::from(member)),
        }))
    }

    async fn push_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let Some(user) = state.users.get_mut(id) else {
            return Ok(false);
        };
        Ok(match set {
            UserSet::Followers => user.followers.insert(UserId::from(member)),
            UserSet::Following => user.following.insert(UserId::from(member)),
            UserSet::LikedPosts => user.liked_posts.insert(PostId::from(member)),
        })
    }

    async fn pull_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let Some(user) = state.users.get_mut(id) else {
            return Ok(false);
        };
        Ok(match set {
            UserSet::Followers => user.followers.remove(&UserId::from(member)),
            UserSet::Following => user.following.remove(&UserId::from(member)),
            UserSet::LikedPosts => user.liked_posts.remove(&PostId::from(member)),
        })
    }

    async fn sample_users(&self, exclude: &HashSet<UserId>, count: usize) -> Result<Vec<UserRecord>, StoreError> {
        let state = self.state.read();
        let picked = {
            let mut rng = rand::rng();
            state
                .users
                .values()
                .filter(|user| !exclude.contains(&user.id))
                .choose_multiple(&mut rng, count)
        };
        Ok(picked.into_iter().cloned().collect())
    }

    async fn insert_post(&self, post: &PostRecord) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let seq = state.bump();
        state.posts.insert(
            post.id.clone(),
            Sequenced {
                seq,
                record: post.clone(),
            },
        );
        Ok(())
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<PostRecord>, StoreError> {
        Ok(self.state.read().posts.get(id).map(|slot| slot.record.clone()))
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, StoreError> {
        Ok(self.state.write().posts.remove(id).is_some())
    }

    async fn push_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        Ok(state
            .posts
            .get_mut(post)
            .is_some_and(|slot| slot.record.likes.insert(user.clone())))
    }

    async fn pull_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        Ok(state.posts.get_mut(post).is_some_and(|slot| slot.record.likes.remove(user)))
    }

    async fn push_comment(&self, post: &PostId, comment: &Comment) -> Result<Option<Vec<Comment>>, StoreError> {
        let mut state = self.state.write();
        Ok(state.posts.get_mut(post).map(|slot| {
            slot.record.comments.push(comment.clone());
            slot.record.comments.clone()
        }))
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, StoreError> {
        let state = self.state.read();
        let records = match query {
            PostQuery::All => newest_first(state.posts.values().collect(), |post| post.created_at)
                .into_iter()
                .map(|slot| slot.record.clone())
                .collect(),
            PostQuery::ByOwners(owners) => {
                let owners: HashSet<&UserId> = owners.iter().collect();
                let matching = state
                    .posts
                    .values()
                    .filter(|slot| owners.contains(&slot.record.owner))
                    .collect();
                newest_first(matching, |post| post.created_at)
                    .into_iter()
                    .map(|slot| slot.record.clone())
                    .collect()
            }
            PostQuery::ByIds(ids) => ids
                .iter()
                .filter_map(|id| state.posts.get(id))
                .map(|slot| slot.record.clone())
                .collect(),
        };
        Ok(records)
    }

    async fn insert_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let seq = state.bump();
        state.notifications.insert(
            notification.id.clone(),
            Sequenced {
                seq,
                record: notification.clone(),
            },
        );
        Ok(())
    }

    async fn list_notifications(&self, to: &UserId) -> Result<Vec<NotificationRecord>, StoreError> {
        let state = self.state.read();
        let addressed = state
            .notifications
            .values()
            .filter(|slot| &slot.record.to == to)
            .collect();
        Ok(newest_first(addressed, |n| n.created_at)
            .into_iter()
            .map(|slot| slot.record.clone())
            .collect())
    }

    async fn mark_notifications_read(&self, to: &UserId, ids: &[NotificationId]) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        let mut changed = 0;
        for id in ids {
            if let Some(slot) = state.notifications.get_mut(id)
                && &slot.record.to == to
                && !slot.record.read
            {
                slot.record.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_notifications(&self, to: &UserId) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        let before = state.notifications.len();
        state.notifications.retain(|_, slot| &slot.record.to != to);
        Ok((before - state.notifications.len()) as u64)
    }
}
