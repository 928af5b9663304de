use std::collections::HashSet;

use log::debug;

use crate::{
    errors::SocialResult,
    id::UserId,
    media::MediaHost,
    service::{Network, profile},
    store::EntityStore,
    types::PublicProfile,
};

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// Up to `count` random users that `viewer` does not follow, never the viewer.
    ///
    /// An empty result means there is no one left to suggest.
    pub async fn suggest(&self, viewer: &UserId, count: usize) -> SocialResult<Vec<PublicProfile>> {
        let viewer = self.require_user(viewer).await?;
        let mut exclude: HashSet<UserId> = viewer.following.iter().cloned().collect();
        exclude.insert(viewer.id.clone());

        let sample = self.store().sample_users(&exclude, count).await?;
        debug!("suggested {} of {count} users to {}", sample.len(), viewer.id);

        let mut seen = HashSet::new();
        Ok(sample
            .iter()
            .filter(|user| !exclude.contains(&user.id) && seen.insert(user.id.clone()))
            .take(count)
            .map(profile)
            .collect())
    }

    /// [`suggest`](Self::suggest) with the configured count.
    pub async fn suggest_default(&self, viewer: &UserId) -> SocialResult<Vec<PublicProfile>> {
        self.suggest(viewer, self.suggestion_count()).await
    }
}
