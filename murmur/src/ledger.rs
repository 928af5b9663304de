//! Notification ledger: fan-out records for follows and likes, and the owner's inbox.

use chrono::Utc;
use log::{debug, warn};

use crate::{
    errors::SocialResult,
    id::{NotificationId, UserId},
    media::MediaHost,
    service::{Network, summary},
    store::EntityStore,
    types::{NotificationKind, NotificationRecord, NotificationView},
};

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// Append one unread notification from `from` to `to`.
    pub(crate) async fn record(&self, kind: NotificationKind, from: &UserId, to: &UserId) -> SocialResult<NotificationRecord> {
        let notification = NotificationRecord {
            id: NotificationId::generate(),
            kind,
            from: from.clone(),
            to: to.clone(),
            read: false,
            created_at: Utc::now(),
        };
        self.store().insert_notification(&notification).await?;
        debug!("notified {to} of {} from {from}", kind.as_str());
        Ok(notification)
    }

    /// Every notification addressed to `owner`, newest first, then mark the listed ones read.
    ///
    /// The returned views carry the read state as it was before this call. A notification that
    /// arrives between the listing and the mark stays unread for the next call.
    pub async fn list_and_mark_read(&self, owner: &UserId) -> SocialResult<Vec<NotificationView>> {
        let notifications = self.store().list_notifications(owner).await?;
        let people = self.load_people(notifications.iter().map(|n| &n.from)).await?;
        let unread: Vec<NotificationId> = notifications.iter().filter(|n| !n.read).map(|n| n.id.clone()).collect();

        let views: Vec<NotificationView> = notifications
            .into_iter()
            .map(|n| {
                let from = people.get(&n.from).map(summary);
                if from.is_none() {
                    warn!("notification {} references missing sender {}", n.id, n.from);
                }
                NotificationView {
                    id: n.id,
                    kind: n.kind,
                    from_id: n.from,
                    from,
                    to: n.to,
                    read: n.read,
                    created_at: n.created_at,
                }
            })
            .collect();

        let marked = self.store().mark_notifications_read(owner, &unread).await?;
        debug!("marked {marked} notifications read for {owner}");
        Ok(views)
    }

    /// Delete every notification addressed to `owner`. Returns how many were removed.
    pub async fn clear(&self, owner: &UserId) -> SocialResult<u64> {
        let removed = self.store().delete_notifications(owner).await?;
        debug!("cleared {removed} notifications for {owner}");
        Ok(removed)
    }

    pub async fn unread_count(&self, owner: &UserId) -> SocialResult<usize> {
        let notifications = self.store().list_notifications(owner).await?;
        Ok(notifications.iter().filter(|n| !n.read).count())
    }
}
