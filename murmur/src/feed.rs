//! Feed assembly. Every listing projects owners and commenters to [`PublicProfile`]; a
//! reference to a user that no longer exists renders as `None` instead of failing the listing.

use std::collections::HashMap;

use log::warn;

use crate::{
    errors::{EntityKind, SocialError, SocialResult},
    id::UserId,
    media::MediaHost,
    service::{Network, comment_view, profile},
    store::EntityStore,
    types::{PostQuery, PostRecord, PostView, UserRecord},
};

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// All posts, newest first.
    pub async fn global_feed(&self) -> SocialResult<Vec<PostView>> {
        self.assemble(PostQuery::All).await
    }

    /// Posts by everyone `viewer` follows, newest first. Empty when following no one.
    pub async fn following_feed(&self, viewer: &UserId) -> SocialResult<Vec<PostView>> {
        let viewer = self.require_user(viewer).await?;
        if viewer.following.is_empty() {
            return Ok(Vec::new());
        }
        self.assemble(PostQuery::ByOwners(viewer.following.into_iter().collect()))
            .await
    }

    /// Posts by `username`, newest first.
    pub async fn author_feed(&self, username: &str) -> SocialResult<Vec<PostView>> {
        let author = self
            .store()
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| SocialError::not_found(EntityKind::User, username))?;
        self.assemble(PostQuery::ByOwners(vec![author.id])).await
    }

    /// Posts `user` has liked, in store order. Deleted posts are skipped.
    pub async fn liked_feed(&self, user: &UserId) -> SocialResult<Vec<PostView>> {
        let user = self.require_user(user).await?;
        if user.liked_posts.is_empty() {
            return Ok(Vec::new());
        }
        self.assemble(PostQuery::ByIds(user.liked_posts.into_iter().collect()))
            .await
    }

    async fn assemble(&self, query: PostQuery) -> SocialResult<Vec<PostView>> {
        let posts = self.store().list_posts(&query).await?;
        let people = self
            .load_people(
                posts
                    .iter()
                    .flat_map(|post| std::iter::once(&post.owner).chain(post.comments.iter().map(|c| &c.author))),
            )
            .await?;
        Ok(posts.into_iter().map(|post| self.post_view(post, &people)).collect())
    }

    pub(crate) fn post_view(&self, post: PostRecord, people: &HashMap<UserId, UserRecord>) -> PostView {
        let owner = people.get(&post.owner).map(profile);
        if owner.is_none() {
            warn!("post {} references missing owner {}", post.id, post.owner);
        }
        let comments = post
            .comments
            .iter()
            .map(|comment| comment_view(comment, people, profile))
            .collect();
        PostView {
            id: post.id,
            owner_id: post.owner,
            owner,
            text: post.text,
            image: post.image,
            likes: post.likes.into_iter().collect(),
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
