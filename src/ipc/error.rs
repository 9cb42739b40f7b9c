use crate::store::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Store failures pass through unchanged; only the code is attached.
pub fn store_err(id: &str, e: StoreError) -> serde_json::Value {
    let code = e.code();
    tracing::warn!(request_id = id, code, error = %e, "store request failed");
    err(id, code, e.to_string(), None)
}
