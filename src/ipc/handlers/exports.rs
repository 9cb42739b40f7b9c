use crate::analytics;
use crate::export;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{db_conn, optional_str, resolve_filters};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;
use std::path::PathBuf;

fn handle_exports_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let spec = match resolve_filters(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let out_path = match optional_str(req, "outPath") {
        Some(p) => PathBuf::from(p),
        None => match state.workspace.as_ref() {
            Some(ws) => export::default_export_path(ws, chrono::Local::now().date_naive()),
            None => return err(&req.id, "no_workspace", "select a workspace first", None),
        },
    };

    let rows = match analytics::filtered_records(conn, &spec) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let stats = analytics::compute_stats(&rows);
    let text = report::format_stats_report(&spec, &stats);

    match export::write_csv_report(&out_path, &text, &rows) {
        Ok(summary) => {
            tracing::info!(path = %summary.path.display(), rows = summary.row_count, "csv exported");
            ok(
                &req.id,
                json!({
                    "path": summary.path.to_string_lossy(),
                    "rowCount": summary.row_count,
                }),
            )
        }
        Err(e) => err(&req.id, "export_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exports.csv" => Some(handle_exports_csv(state, req)),
        _ => None,
    }
}
