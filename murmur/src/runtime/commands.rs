use serde::Serialize;

use crate::errors::StoreError;

/// Whether [`UserSaveCommand`] creates a document or overwrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    Insert,
    Save,
}

/// One case-insensitive unique index entry the save must claim.
#[derive(Debug, Serialize)]
pub struct UniqueClaim {
    pub field: &'static str,
    pub value: String,
    /// Full index key for the new value.
    pub key: String,
    /// Key prefix; the script appends the lower-cased previous value to release it.
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct UserSaveCommand {
    pub mode: SaveMode,
    pub entity_id: String,
    pub entity_key: String,
    pub members_key: String,
    pub payload_json: String,
    /// Checked in order; the first collision is reported.
    pub unique: Vec<UniqueClaim>,
}

#[derive(Debug, Serialize)]
pub struct PostDeleteCommand {
    pub entity_id: String,
    pub entity_key: String,
    pub likes_key: String,
    pub comments_key: String,
    pub timeline_key: String,
    pub owner_index_prefix: String,
}

#[derive(Debug, Serialize)]
pub struct CommentAppendCommand {
    pub entity_key: String,
    pub comments_key: String,
    pub comment_json: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationOp {
    Add,
    Remove,
}

/// Membership change on a relation set, guarded by the existence of `owner_key`.
#[derive(Debug, Serialize)]
pub struct RelationCommand<'a> {
    pub op: RelationOp,
    pub owner_key: String,
    pub set_key: String,
    pub member: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxOp {
    MarkRead,
    Delete,
}

#[derive(Debug, Serialize)]
pub struct InboxCommand {
    pub op: InboxOp,
    /// Notifications to mark read. Ignored by `delete`, which empties the whole inbox.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    pub inbox_key: String,
    pub entity_prefix: String,
}

pub(crate) fn encode<T: Serialize>(command: &T) -> Result<String, StoreError> {
    serde_json::to_string(command).map_err(|err| StoreError::Other {
        message: format!("failed to serialize command: {err}").into(),
    })
}
