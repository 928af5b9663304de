//! murmur: social graph, engagement and feed engine.
//!
//! Users follow each other, like and comment on posts, and receive notifications for follows and
//! likes. All operations hang off a [`Network`] handle that owns an [`EntityStore`] backend
//! (in-memory or Redis) and a [`MediaHost`] for uploaded images.
//!
//! Relationship writes that touch two records (a follow edge, a like plus its back-reference)
//! are sequenced, not transactional. Partial failures are logged for reconciliation and can be
//! repaired with [`Network::reconcile_edges`].

pub mod accounts;
pub mod config;
pub mod engagement;
pub mod errors;
pub mod feed;
pub mod graph;
pub mod id;
pub mod keys;
pub mod ledger;
pub mod media;
pub mod runtime;
pub mod service;
pub mod store;
pub mod suggest;
pub mod types;
pub mod validators;

pub use config::Settings;
pub use errors::{EntityKind, MediaError, SocialError, SocialResult, StoreError};
pub use id::{CommentId, NotificationId, PostId, UserId};
pub use media::{DirectoryMediaHost, MediaHost, MemoryMediaHost};
pub use service::{ConnectError, Network};
pub use store::{EntityStore, MemoryStore, RedisStore};
pub use types::{
    ActingUser, ActorSummary, CommentView, FollowOutcome, NewPost, NotificationKind, NotificationView, PostView,
    ProfileUpdate, PublicProfile, ReconcileReport, Signup,
};
