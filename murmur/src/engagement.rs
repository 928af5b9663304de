//! Posts and what other users do with them: likes, comments and deletion.
//!
//! A like is stored twice, in the post's `likes` set and in the liker's `liked_posts` index.
//! Like writes the index first and unlike pulls the post side first, so a fault between the two
//! halves always leaves `liked_posts` as the superset; [`Network::reconcile_edges`] repairs it.

use chrono::Utc;
use log::{debug, error, warn};

use crate::{
    errors::{EntityKind, SocialError, SocialResult},
    id::{CommentId, PostId, UserId},
    media::MediaHost,
    service::{Network, comment_view, summary},
    store::EntityStore,
    types::{ActingUser, ActorSummary, Comment, CommentView, NewPost, NotificationKind, PostRecord, PostView, UserSet},
    validators::non_blank,
};

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// Publish a post. Text is trimmed; a post needs text or an image.
    pub async fn create_post(&self, actor: &ActingUser, new_post: NewPost) -> SocialResult<PostView> {
        let text = non_blank(new_post.text.as_deref());
        let image_bytes = new_post.image.filter(|bytes| !bytes.is_empty());
        if text.is_none() && image_bytes.is_none() {
            return Err(SocialError::invalid("post must have text or an image"));
        }
        let owner = self.require_user(&actor.id).await?;

        let image = match image_bytes {
            Some(bytes) => Some(self.media().upload(&bytes).await?),
            None => None,
        };

        let now = Utc::now();
        let post = PostRecord {
            id: PostId::generate(),
            owner: owner.id.clone(),
            text,
            image,
            likes: Default::default(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.store().insert_post(&post).await {
            if let Some(url) = &post.image
                && let Err(media_err) = self.media().destroy(url).await
            {
                warn!("orphaned upload {url} after failed post insert: {media_err}");
            }
            return Err(err.into());
        }

        debug!("{} created post {}", actor.id, post.id);
        let people = [(owner.id.clone(), owner)].into_iter().collect();
        Ok(self.post_view(post, &people))
    }

    /// Like `post` if `actor` has not liked it yet, unlike otherwise. Returns the resulting likers.
    ///
    /// Every like emits one `like` notification to the post owner, including self-likes.
    /// Unlike emits nothing and leaves earlier notifications in place. A post deleted while the
    /// toggle runs is reported as `NotFound`.
    pub async fn toggle_like(&self, actor: &ActingUser, post_id: &PostId) -> SocialResult<Vec<UserId>> {
        let post = self.require_post(post_id).await?;
        let liked = post.likes.contains(&actor.id);

        if liked {
            self.store().pull_like(post_id, &actor.id).await?;
            self.store()
                .pull_user_set(&actor.id, UserSet::LikedPosts, post_id.as_str())
                .await
                .map_err(|err| {
                    error!(
                        "unlike {} -> {post_id}: post likes updated but liked_posts of {} failed: {err}; \
                         needs reconciliation (reconcile {})",
                        actor.id, actor.id, actor.id
                    );
                    SocialError::from(err)
                })?;
            debug!("{} unliked {post_id}", actor.id);
        } else {
            self.store()
                .push_user_set(&actor.id, UserSet::LikedPosts, post_id.as_str())
                .await?;
            let added = self.store().push_like(post_id, &actor.id).await.map_err(|err| {
                error!(
                    "like {} -> {post_id}: liked_posts of {} updated but post likes failed: {err}; \
                     needs reconciliation (reconcile {})",
                    actor.id, actor.id, actor.id
                );
                SocialError::from(err)
            })?;
            if !added && self.store().get_post(post_id).await?.is_none() {
                return Err(self.undo_dangling_like(actor, post_id).await);
            }
            if added && let Err(err) = self.record(NotificationKind::Like, &actor.id, &post.owner).await {
                error!(
                    "like {} -> {post_id} stored but its notification failed: {err}; needs reconciliation",
                    actor.id
                );
                return Err(err);
            }
            debug!("{} liked {post_id}", actor.id);
        }

        match self.store().get_post(post_id).await? {
            Some(current) => Ok(current.likes.into_iter().collect()),
            None => {
                warn!("post {post_id} was deleted during like toggle by {}", actor.id);
                Err(SocialError::not_found(EntityKind::Post, post_id.as_str()))
            }
        }
    }

    /// The post vanished between the index write and the like: take the index entry back.
    async fn undo_dangling_like(&self, actor: &ActingUser, post_id: &PostId) -> SocialError {
        warn!("post {post_id} was deleted before {} could like it", actor.id);
        if let Err(err) = self
            .store()
            .pull_user_set(&actor.id, UserSet::LikedPosts, post_id.as_str())
            .await
        {
            error!(
                "like {} -> {post_id}: post is gone and liked_posts of {} could not be restored: {err}",
                actor.id, actor.id
            );
            return err.into();
        }
        SocialError::not_found(EntityKind::Post, post_id.as_str())
    }

    /// Append a comment and return the whole thread in append order.
    pub async fn append_comment(
        &self,
        actor: &ActingUser,
        post_id: &PostId,
        text: &str,
    ) -> SocialResult<Vec<CommentView<ActorSummary>>> {
        let Some(text) = non_blank(Some(text)) else {
            return Err(SocialError::invalid("comment text required"));
        };
        let comment = Comment {
            id: CommentId::generate(),
            author: actor.id.clone(),
            text,
            created_at: Utc::now(),
        };

        let comments = self
            .store()
            .push_comment(post_id, &comment)
            .await?
            .ok_or_else(|| SocialError::not_found(EntityKind::Post, post_id.as_str()))?;
        debug!("{} commented on {post_id} ({} comments)", actor.id, comments.len());

        let people = self.load_people(comments.iter().map(|c| &c.author)).await?;
        Ok(comments
            .iter()
            .map(|comment| comment_view(comment, &people, summary))
            .collect())
    }

    /// Delete a post owned by `actor`, releasing its image first.
    ///
    /// A media failure aborts the delete. Likes indexes and notifications that reference the
    /// post are left dangling.
    pub async fn delete_post(&self, actor: &ActingUser, post_id: &PostId) -> SocialResult<()> {
        let post = self.require_post(post_id).await?;
        if post.owner != actor.id {
            return Err(SocialError::invalid("only owner may delete"));
        }
        if let Some(url) = &post.image {
            self.media().destroy(url).await?;
        }
        if !self.store().delete_post(post_id).await? {
            warn!("post {post_id} was already gone at delete");
        }
        debug!("{} deleted post {post_id}", actor.id);
        Ok(())
    }

    pub(crate) async fn require_post(&self, id: &PostId) -> SocialResult<PostRecord> {
        self.store()
            .get_post(id)
            .await?
            .ok_or_else(|| SocialError::not_found(EntityKind::Post, id.as_str()))
    }
}
