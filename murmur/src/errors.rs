use std::{borrow::Cow, fmt};

use thiserror::Error;

/// Kinds of entity a [`SocialError::NotFound`] can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Post,
    Notification,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Post => "post",
            EntityKind::Notification => "notification",
        };
        f.write_str(name)
    }
}

/// Top-level error type returned by every murmur operation.
#[derive(Debug, Error)]
pub enum SocialError {
    /// Referenced user, post or username does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The request violates a precondition (self-follow, non-owner delete, empty comment ...).
    #[error("invalid operation: {message}")]
    InvalidOperation { message: Cow<'static, str> },

    /// A unique field collides with an existing user.
    #[error("{field} '{value}' already exists")]
    AlreadyExists { field: String, value: String },

    /// The media collaborator failed to upload or destroy an asset.
    #[error("media error: {0}")]
    Media(#[from] MediaError),

    /// Underlying persistence fault. Never retried by this layer.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl SocialError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidOperation { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }
}

impl From<StoreError> for SocialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field, value } => Self::AlreadyExists { field, value },
            other => Self::Store(other),
        }
    }
}

/// Faults raised by an [`EntityStore`](crate::store::EntityStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A unique index already points at another entity.
    #[error("unique constraint violation on {field}: '{value}'")]
    Conflict { field: String, value: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Faults raised by a [`MediaHost`](crate::media::MediaHost).
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The host refused the request.
    #[error("media host rejected the request: {message}")]
    Rejected { message: String },
}

pub type SocialResult<T> = Result<T, SocialError>;
