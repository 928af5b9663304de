//! Redis backend.
//!
//! Layout under `prefix:service`:
//!
//! * `users:{id}` / `posts:{id}` / `notifications:{id}`: JSON documents without their
//!   relationship sets
//! * `users:unique:{field}:{lower}`: unique index, value is the owning user id
//! * `users:idx:all`: SET of every user id
//! * `rel:{followers|following|liked_posts}:{user}` and `rel:likes:{post}`: relation SETs
//! * `posts:list:comments:{post}`: LIST of JSON comments
//! * `posts:idx:timeline`, `posts:idx:by_owner:{user}`, `notifications:idx:inbox:{user}`:
//!   ZSETs scored by creation time in microseconds
//!
//! Anything touching more than one key is either a Lua script or a `MULTI` pipeline.

use std::{borrow::Cow, collections::HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::IteratorRandom;
use redis::{Client, aio::ConnectionManager, cmd, pipe};
use serde_json::Value;

use super::EntityStore;
use crate::{
    errors::StoreError,
    id::{NotificationId, PostId, UserId},
    keys::{KeyContext, NOTIFICATIONS, POSTS, USERS},
    runtime::{
        commands::{
            CommentAppendCommand, InboxCommand, InboxOp, PostDeleteCommand, RelationCommand, RelationOp, SaveMode,
            UniqueClaim, UserSaveCommand,
        },
        run_script,
        scripts::{
            COMMENT_APPEND_SCRIPT, INBOX_MUTATION_SCRIPT, POST_DELETE_SCRIPT, RELATION_MUTATION_SCRIPT,
            USER_SAVE_SCRIPT,
        },
    },
    types::{Comment, NotificationRecord, PostQuery, PostRecord, UserRecord, UserSet},
};

const SERVICE: &str = "social";
const LIKES: &str = "likes";

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    keys: KeyContext,
}

impl RedisStore {
    /// Open a managed connection to `url`, namespacing every key under `prefix`.
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::with_connection(conn, prefix))
    }

    pub fn with_connection(conn: ConnectionManager, prefix: &str) -> Self {
        Self {
            conn,
            keys: KeyContext::new(prefix, SERVICE),
        }
    }

    pub fn keys(&self) -> &KeyContext {
        &self.keys
    }

    /// Delete every key under this store's prefix. Returns the number of keys removed.
    pub async fn cleanup(&self) -> Result<u64, StoreError> {
        const SCAN_COUNT: usize = 1000;
        let mut conn = self.conn.clone();
        let pattern = self.keys.pattern();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    fn user_set_key(&self, id: &str, set: UserSet) -> String {
        self.keys.relation(set.alias(), id)
    }

    fn comments_key(&self, post: &str) -> String {
        self.keys.list(POSTS, "comments", post)
    }

    fn timeline_key(&self) -> String {
        self.keys.index(POSTS, "timeline")
    }

    fn owner_index_key(&self, owner: &str) -> String {
        self.keys.owned_index(POSTS, "by_owner", owner)
    }

    fn inbox_key(&self, to: &str) -> String {
        self.keys.owned_index(NOTIFICATIONS, "inbox", to)
    }

    async fn save(&self, user: &UserRecord, mode: SaveMode) -> Result<(), StoreError> {
        let mut doc = user.clone();
        doc.followers.clear();
        doc.following.clear();
        doc.liked_posts.clear();

        let unique = [("username", &user.username), ("email", &user.email)]
            .into_iter()
            .map(|(field, value)| UniqueClaim {
                field,
                value: value.clone(),
                key: self.keys.unique(USERS, field, value),
                prefix: self.keys.unique(USERS, field, ""),
            })
            .collect();

        let command = UserSaveCommand {
            mode,
            entity_id: user.id.to_string(),
            entity_key: self.keys.entity(USERS, user.id.as_str()),
            members_key: self.keys.index(USERS, "all"),
            payload_json: serde_json::to_string(&doc)?,
            unique,
        };
        let mut conn = self.conn.clone();
        run_script(&mut conn, &USER_SAVE_SCRIPT, &command).await?;
        Ok(())
    }

    async fn mutate_relation(&self, owner_key: String, set_key: String, member: &str, op: RelationOp) -> Result<bool, StoreError> {
        let command = RelationCommand {
            op,
            owner_key,
            set_key,
            member,
        };
        let mut conn = self.conn.clone();
        let reply = run_script(&mut conn, &RELATION_MUTATION_SCRIPT, &command).await?;
        Ok(reply.get("changed").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn load_users(&self, ids: &[String]) -> Result<Vec<UserRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let doc_keys: Vec<String> = ids.iter().map(|id| self.keys.entity(USERS, id)).collect();
        let docs: Vec<Option<String>> = cmd("MGET").arg(&doc_keys).query_async(&mut conn).await?;

        let mut sets = pipe();
        for id in ids {
            for set in UserSet::ALL {
                sets.cmd("SMEMBERS").arg(self.user_set_key(id, set));
            }
        }
        let members: Vec<Vec<String>> = sets.query_async(&mut conn).await?;

        let mut users = Vec::with_capacity(ids.len());
        for (doc, chunk) in docs.into_iter().zip(members.chunks(UserSet::ALL.len())) {
            let Some(doc) = doc else { continue };
            let mut user: UserRecord = serde_json::from_str(&doc)?;
            user.followers = chunk[0].iter().map(|id| UserId::from(id.as_str())).collect();
            user.following = chunk[1].iter().map(|id| UserId::from(id.as_str())).collect();
            user.liked_posts = chunk[2].iter().map(|id| PostId::from(id.as_str())).collect();
            users.push(user);
        }
        Ok(users)
    }

    async fn load_posts(&self, ids: &[String]) -> Result<Vec<PostRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let doc_keys: Vec<String> = ids.iter().map(|id| self.keys.entity(POSTS, id)).collect();
        let docs: Vec<Option<String>> = cmd("MGET").arg(&doc_keys).query_async(&mut conn).await?;

        let mut related = pipe();
        for id in ids {
            related.cmd("SMEMBERS").arg(self.keys.relation(LIKES, id));
            related.cmd("LRANGE").arg(self.comments_key(id)).arg(0).arg(-1);
        }
        let lists: Vec<Vec<String>> = related.query_async(&mut conn).await?;

        let mut posts = Vec::with_capacity(ids.len());
        for (doc, chunk) in docs.into_iter().zip(lists.chunks(2)) {
            let Some(doc) = doc else { continue };
            let mut post: PostRecord = serde_json::from_str(&doc)?;
            post.likes = chunk[0].iter().map(|id| UserId::from(id.as_str())).collect();
            post.comments = decode_comments(&chunk[1])?;
            posts.push(post);
        }
        Ok(posts)
    }

    async fn newest_ids(&self, index_key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = cmd("ZREVRANGE").arg(index_key).arg(0).arg(-1).query_async(&mut conn).await?;
        Ok(ids)
    }
}

fn score(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64
}

fn decode_comments(raw: &[String]) -> Result<Vec<Comment>, StoreError> {
    raw.iter()
        .map(|entry| serde_json::from_str(entry).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl EntityStore for RedisStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.save(user, SaveMode::Insert).await?;

        let mut conn = self.conn.clone();
        let mut sets = pipe();
        sets.atomic();
        let mut pending = false;
        for set in UserSet::ALL {
            let members = user.set(set);
            if !members.is_empty() {
                sets.cmd("SADD").arg(self.user_set_key(user.id.as_str(), set)).arg(members).ignore();
                pending = true;
            }
        }
        if pending {
            sets.query_async::<()>(&mut conn).await?;
        }
        Ok(())
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.save(user, SaveMode::Save).await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load_users(&[id.to_string()]).await?.into_iter().next())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        let ids: Vec<String> = ids.iter().map(UserId::to_string).collect();
        self.load_users(&ids).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let owner: Option<String> = cmd("GET")
            .arg(self.keys.unique(USERS, "username", username))
            .query_async(&mut conn)
            .await?;
        match owner {
            Some(id) => Ok(self.load_users(&[id]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn user_set_contains(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let present: bool = cmd("SISMEMBER")
            .arg(self.user_set_key(id.as_str(), set))
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(present)
    }

    async fn push_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let owner_key = self.keys.entity(USERS, id.as_str());
        self.mutate_relation(owner_key, self.user_set_key(id.as_str(), set), member, RelationOp::Add)
            .await
    }

    async fn pull_user_set(&self, id: &UserId, set: UserSet, member: &str) -> Result<bool, StoreError> {
        let owner_key = self.keys.entity(USERS, id.as_str());
        self.mutate_relation(owner_key, self.user_set_key(id.as_str(), set), member, RelationOp::Remove)
            .await
    }

    async fn sample_users(&self, exclude: &HashSet<UserId>, count: usize) -> Result<Vec<UserRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let all: Vec<String> = cmd("SMEMBERS").arg(self.keys.index(USERS, "all")).query_async(&mut conn).await?;
        let picked: Vec<String> = {
            let mut rng = rand::rng();
            all.into_iter()
                .filter(|id| !exclude.contains(&UserId::from(id.as_str())))
                .choose_multiple(&mut rng, count)
        };
        self.load_users(&picked).await
    }

    async fn insert_post(&self, post: &PostRecord) -> Result<(), StoreError> {
        let mut doc = post.clone();
        doc.likes.clear();
        doc.comments.clear();
        let id = post.id.as_str();

        let mut conn = self.conn.clone();
        let mut write = pipe();
        write.atomic();
        write
            .cmd("SET")
            .arg(self.keys.entity(POSTS, id))
            .arg(serde_json::to_string(&doc)?)
            .ignore();
        write
            .cmd("ZADD")
            .arg(self.timeline_key())
            .arg(score(post.created_at))
            .arg(id)
            .ignore();
        write
            .cmd("ZADD")
            .arg(self.owner_index_key(post.owner.as_str()))
            .arg(score(post.created_at))
            .arg(id)
            .ignore();
        if !post.likes.is_empty() {
            let likes: Vec<&str> = post.likes.iter().map(UserId::as_str).collect();
            write.cmd("SADD").arg(self.keys.relation(LIKES, id)).arg(likes).ignore();
        }
        if !post.comments.is_empty() {
            let comments = post
                .comments
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            write.cmd("RPUSH").arg(self.comments_key(id)).arg(comments).ignore();
        }
        write.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<PostRecord>, StoreError> {
        Ok(self.load_posts(&[id.to_string()]).await?.into_iter().next())
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, StoreError> {
        let command = PostDeleteCommand {
            entity_id: id.to_string(),
            entity_key: self.keys.entity(POSTS, id.as_str()),
            likes_key: self.keys.relation(LIKES, id.as_str()),
            comments_key: self.comments_key(id.as_str()),
            timeline_key: self.timeline_key(),
            owner_index_prefix: self.owner_index_key(""),
        };
        let mut conn = self.conn.clone();
        let reply = run_script(&mut conn, &POST_DELETE_SCRIPT, &command).await?;
        Ok(reply.get("deleted").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn push_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        let owner_key = self.keys.entity(POSTS, post.as_str());
        self.mutate_relation(owner_key, self.keys.relation(LIKES, post.as_str()), user.as_str(), RelationOp::Add)
            .await
    }

    async fn pull_like(&self, post: &PostId, user: &UserId) -> Result<bool, StoreError> {
        let owner_key = self.keys.entity(POSTS, post.as_str());
        self.mutate_relation(owner_key, self.keys.relation(LIKES, post.as_str()), user.as_str(), RelationOp::Remove)
            .await
    }

    async fn push_comment(&self, post: &PostId, comment: &Comment) -> Result<Option<Vec<Comment>>, StoreError> {
        let command = CommentAppendCommand {
            entity_key: self.keys.entity(POSTS, post.as_str()),
            comments_key: self.comments_key(post.as_str()),
            comment_json: serde_json::to_string(comment)?,
        };
        let mut conn = self.conn.clone();
        let reply = run_script(&mut conn, &COMMENT_APPEND_SCRIPT, &command).await?;
        if !reply.get("exists").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(None);
        }
        let raw: Vec<String> = match reply.get("comments") {
            Some(Value::Array(entries)) => entries.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
            // cjson encodes an empty table as an object
            _ => Vec::new(),
        };
        decode_comments(&raw).map(Some)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, StoreError> {
        let ids = match query {
            PostQuery::All => self.newest_ids(&self.timeline_key()).await?,
            PostQuery::ByOwners(owners) => {
                let mut conn = self.conn.clone();
                let mut scored: Vec<(f64, String)> = Vec::new();
                for owner in owners {
                    let entries: Vec<(String, f64)> = cmd("ZRANGE")
                        .arg(self.owner_index_key(owner.as_str()))
                        .arg(0)
                        .arg(-1)
                        .arg("WITHSCORES")
                        .query_async(&mut conn)
                        .await?;
                    scored.extend(entries.into_iter().map(|(id, score)| (score, id)));
                }
                // same ordering ZREVRANGE applies: score, then member, both descending
                scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
                scored.dedup_by(|a, b| a.1 == b.1);
                scored.into_iter().map(|(_, id)| id).collect()
            }
            PostQuery::ByIds(ids) => ids.iter().map(PostId::to_string).collect(),
        };
        self.load_posts(&ids).await
    }

    async fn insert_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError> {
        let id = notification.id.as_str();
        let mut conn = self.conn.clone();
        pipe()
            .atomic()
            .cmd("SET")
            .arg(self.keys.entity(NOTIFICATIONS, id))
            .arg(serde_json::to_string(notification)?)
            .ignore()
            .cmd("ZADD")
            .arg(self.inbox_key(notification.to.as_str()))
            .arg(score(notification.created_at))
            .arg(id)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn list_notifications(&self, to: &UserId) -> Result<Vec<NotificationRecord>, StoreError> {
        let ids = self.newest_ids(&self.inbox_key(to.as_str())).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let keys: Vec<String> = ids.iter().map(|id| self.keys.entity(NOTIFICATIONS, id)).collect();
        let docs: Vec<Option<String>> = cmd("MGET").arg(&keys).query_async(&mut conn).await?;
        docs.into_iter()
            .flatten()
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .collect()
    }

    async fn mark_notifications_read(&self, to: &UserId, ids: &[NotificationId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = ids.iter().map(|id| id.as_str().to_string()).collect();
        self.mutate_inbox(to, InboxOp::MarkRead, ids).await
    }

    async fn delete_notifications(&self, to: &UserId) -> Result<u64, StoreError> {
        self.mutate_inbox(to, InboxOp::Delete, Vec::new()).await
    }
}

impl RedisStore {
    async fn mutate_inbox(&self, to: &UserId, op: InboxOp, ids: Vec<String>) -> Result<u64, StoreError> {
        let command = InboxCommand {
            op,
            ids,
            inbox_key: self.inbox_key(to.as_str()),
            entity_prefix: self.keys.entity(NOTIFICATIONS, ""),
        };
        let mut conn = self.conn.clone();
        let reply = run_script(&mut conn, &INBOX_MUTATION_SCRIPT, &command).await?;
        reply.get("changed").and_then(Value::as_u64).ok_or_else(|| StoreError::Other {
            message: Cow::Borrowed("inbox script returned no count"),
        })
    }
}
