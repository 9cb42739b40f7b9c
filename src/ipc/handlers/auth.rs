use crate::auth;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::StoreError;
use serde_json::json;

fn credentials(req: &Request) -> Result<(String, String), serde_json::Value> {
    Ok((required_str(req, "username")?, required_str(req, "password")?))
}

fn handle_auth_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let (username, password) = match credentials(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match auth::register(conn, &username, &password) {
        Ok(()) => {
            tracing::info!(username = %username.trim(), "account registered");
            ok(&req.id, json!({ "username": username.trim() }))
        }
        Err(StoreError::Conflict(_)) => err(
            &req.id,
            "username_taken",
            "username already exists",
            Some(json!({ "username": username.trim() })),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_auth_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let (username, password) = match credentials(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match auth::verify_login(conn, &username, &password) {
        Ok(true) => ok(&req.id, json!({ "username": username.trim() })),
        Ok(false) => {
            tracing::warn!(username = %username.trim(), "login rejected");
            err(&req.id, "login_failed", "wrong username or password", None)
        }
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.register" => Some(handle_auth_register(state, req)),
        "auth.login" => Some(handle_auth_login(state, req)),
        _ => None,
    }
}
