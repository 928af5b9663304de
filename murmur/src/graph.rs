//! Follow edges.
//!
//! An edge is stored twice: in the follower's `following` set and in the followee's `followers`
//! set. Both halves are written by [`Network::toggle_follow`] in a fixed order (followee side
//! first). The pair is not atomic, so a fault between the halves leaves the graph asymmetric;
//! that case is logged at `error` level and can be repaired with [`Network::reconcile_edges`].

use log::{debug, error, info};

use crate::{
    errors::{SocialError, SocialResult, StoreError},
    id::{PostId, UserId},
    media::MediaHost,
    service::Network,
    store::EntityStore,
    types::{ActingUser, FollowOutcome, NotificationKind, ReconcileReport, UserSet},
};

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// Follow `target` if `actor` does not follow them yet, unfollow otherwise.
    ///
    /// A follow emits one `follow` notification to `target`; an unfollow emits nothing.
    pub async fn toggle_follow(&self, actor: &ActingUser, target: &UserId) -> SocialResult<FollowOutcome> {
        if target == &actor.id {
            return Err(SocialError::invalid("cannot follow self"));
        }
        self.require_user(target).await?;

        let following = self
            .store()
            .user_set_contains(&actor.id, UserSet::Following, target.as_str())
            .await?;

        if following {
            self.store()
                .pull_user_set(target, UserSet::Followers, actor.id.as_str())
                .await?;
            self.second_half(
                actor,
                target,
                "unfollow",
                self.store().pull_user_set(&actor.id, UserSet::Following, target.as_str()),
            )
            .await?;
            debug!("{} unfollowed {target}", actor.id);
            return Ok(FollowOutcome::Unfollowed);
        }

        let added_follower = self
            .store()
            .push_user_set(target, UserSet::Followers, actor.id.as_str())
            .await?;
        let added_following = self
            .second_half(
                actor,
                target,
                "follow",
                self.store().push_user_set(&actor.id, UserSet::Following, target.as_str()),
            )
            .await?;

        // neither side changed: a concurrent toggle already notified
        if (added_follower || added_following)
            && let Err(err) = self.record(NotificationKind::Follow, &actor.id, target).await
        {
            error!(
                "follow {} -> {target} stored but its notification failed: {err}; needs reconciliation",
                actor.id
            );
            return Err(err);
        }
        debug!("{} followed {target}", actor.id);
        Ok(FollowOutcome::Followed)
    }

    async fn second_half(
        &self,
        actor: &ActingUser,
        target: &UserId,
        action: &str,
        write: impl Future<Output = Result<bool, StoreError>>,
    ) -> SocialResult<bool> {
        write.await.map_err(|err| {
            error!(
                "{action} {} -> {target}: followers of {target} updated but following of {} failed: {err}; \
                 needs reconciliation (reconcile {target})",
                actor.id, actor.id
            );
            SocialError::from(err)
        })
    }

    /// Restore the missing half of every asymmetric edge touching `user`, and the missing like
    /// for every post listed in the user's `liked_posts`.
    ///
    /// Only additions are made; an edge present on one side is never removed.
    pub async fn reconcile_edges(&self, user: &UserId) -> SocialResult<ReconcileReport> {
        let record = self.require_user(user).await?;
        let mut report = ReconcileReport::default();

        for followee in &record.following {
            if !self
                .store()
                .user_set_contains(followee, UserSet::Followers, user.as_str())
                .await?
                && self
                    .store()
                    .push_user_set(followee, UserSet::Followers, user.as_str())
                    .await?
            {
                report.followers_restored.push(followee.clone());
            }
        }

        for follower in &record.followers {
            if !self
                .store()
                .user_set_contains(follower, UserSet::Following, user.as_str())
                .await?
                && self
                    .store()
                    .push_user_set(follower, UserSet::Following, user.as_str())
                    .await?
            {
                report.following_restored.push(follower.clone());
            }
        }

        for post in &record.liked_posts {
            if self.restore_like(post, user).await? {
                report.likes_restored.push(post.clone());
            }
        }

        if report.is_clean() {
            debug!("edges of {user} already symmetric");
        } else {
            info!(
                "reconciled {user}: {} followers, {} following, {} likes restored",
                report.followers_restored.len(),
                report.following_restored.len(),
                report.likes_restored.len()
            );
        }
        Ok(report)
    }

    async fn restore_like(&self, post: &PostId, user: &UserId) -> SocialResult<bool> {
        match self.store().get_post(post).await? {
            // the post was deleted; a dangling liked_posts entry is tolerated
            None => Ok(false),
            Some(existing) if existing.likes.contains(user) => Ok(false),
            Some(_) => Ok(self.store().push_like(post, user).await?),
        }
    }
}
