use crate::ipc::error::{err, ok};
use crate::ipc::helpers::merge_filter_update;
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;

fn filters_json(state: &AppState) -> serde_json::Value {
    json!({
        "filters": state.filters,
        "unconstrained": state.filters.is_unconstrained(),
        "scope": {
            "className": report::class_scope(&state.filters),
            "courseName": report::course_scope(&state.filters),
        }
    })
}

fn handle_filters_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, filters_json(state))
}

fn handle_filters_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    match merge_filter_update(&state.filters, &req.params) {
        Ok(next) => {
            tracing::debug!(?next, "filters updated");
            state.filters = next;
            ok(&req.id, filters_json(state))
        }
        Err(m) => err(&req.id, "bad_params", m, None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "filters.get" => Some(handle_filters_get(state, req)),
        "filters.set" => Some(handle_filters_set(state, req)),
        _ => None,
    }
}
