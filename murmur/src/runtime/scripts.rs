use redis::Script;
use std::sync::LazyLock;

pub const USER_SAVE_SCRIPT_BODY: &str = include_str!("../../lua/user_save.lua");
pub const POST_DELETE_SCRIPT_BODY: &str = include_str!("../../lua/post_delete.lua");
pub const COMMENT_APPEND_SCRIPT_BODY: &str = include_str!("../../lua/comment_append.lua");
pub const RELATION_MUTATION_SCRIPT_BODY: &str = include_str!("../../lua/relation_mutation.lua");
pub const INBOX_MUTATION_SCRIPT_BODY: &str = include_str!("../../lua/inbox_mutation.lua");

pub static USER_SAVE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(USER_SAVE_SCRIPT_BODY));
pub static POST_DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(POST_DELETE_SCRIPT_BODY));
pub static COMMENT_APPEND_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(COMMENT_APPEND_SCRIPT_BODY));
pub static RELATION_MUTATION_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(RELATION_MUTATION_SCRIPT_BODY));
pub static INBOX_MUTATION_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(INBOX_MUTATION_SCRIPT_BODY));
