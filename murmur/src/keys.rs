/// Key-construction helpers for the Redis layout.
///
/// Every key starts with `prefix:service`, so a whole deployment (or a single test namespace)
/// can be dropped with one `SCAN MATCH prefix:*`.
#[derive(Debug, Clone)]
pub struct KeyContext {
    pub prefix: String,
    pub service: String,
}

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const NOTIFICATIONS: &str = "notifications";

impl KeyContext {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }

    /// JSON document of one entity.
    pub fn entity(&self, collection: &str, entity_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, entity_id)
    }

    /// Set-valued relation owned by `left_id` (followers, following, likes ...).
    pub fn relation(&self, alias: &str, left_id: &str) -> String {
        format!("{}:{}:rel:{}:{}", self.prefix, self.service, alias, left_id)
    }

    /// Unique index entry: lower-cased value -> owning entity id.
    pub fn unique(&self, collection: &str, field: &str, value: &str) -> String {
        format!(
            "{}:{}:{}:unique:{}:{}",
            self.prefix,
            self.service,
            collection,
            field,
            value.to_ascii_lowercase()
        )
    }

    /// Collection-wide index (member set or sorted timeline).
    pub fn index(&self, collection: &str, name: &str) -> String {
        format!("{}:{}:{}:idx:{}", self.prefix, self.service, collection, name)
    }

    /// Index scoped to one owner, e.g. a user's posts or inbox.
    pub fn owned_index(&self, collection: &str, name: &str, owner_id: &str) -> String {
        format!("{}:{}:{}:idx:{}:{}", self.prefix, self.service, collection, name, owner_id)
    }

    /// Append-only list attached to an entity (a post's comments).
    pub fn list(&self, collection: &str, name: &str, entity_id: &str) -> String {
        format!("{}:{}:{}:list:{}:{}", self.prefix, self.service, collection, name, entity_id)
    }

    /// Pattern matching every key of this context.
    pub fn pattern(&self) -> String {
        format!("{}:{}:*", self.prefix, self.service)
    }
}
