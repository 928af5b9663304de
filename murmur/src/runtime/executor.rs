use std::borrow::Cow;

use redis::{Script, aio::ConnectionLike};
use serde::Serialize;
use serde_json::Value;

use crate::{errors::StoreError, runtime::commands::encode};

/// Invoke `script` with the JSON-encoded `command` as its only argument and decode the reply.
///
/// Scripts report failures as `{"error": code, ...}`; those are mapped onto [`StoreError`].
pub async fn run_script<C, T>(conn: &mut C, script: &Script, command: &T) -> Result<Value, StoreError>
where
    C: ConnectionLike + Send,
    T: Serialize,
{
    let payload = encode(command)?;

    let mut invocation = script.prepare_invoke();
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await?;

    let value: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Other {
        message: Cow::Owned(format!("failed to parse lua response: {err}")),
    })?;

    if let Some(error) = value.get("error") {
        return Err(map_script_error(error, &value));
    }
    Ok(value)
}

fn map_script_error(error: &Value, value: &Value) -> StoreError {
    let field_str = |name: &str| value.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    match error.as_str() {
        Some("conflict") => StoreError::Conflict {
            field: field_str("field"),
            value: field_str("value"),
        },
        Some("entity_not_found") => StoreError::Other {
            message: Cow::Owned(format!("entity not found: {}", field_str("entity_id"))),
        },
        Some(other) => StoreError::Other {
            message: Cow::Owned(other.to_string()),
        },
        None => StoreError::Other {
            message: Cow::Borrowed("lua_error"),
        },
    }
}
