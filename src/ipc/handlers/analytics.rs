use crate::analytics;
use crate::db;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{db_conn, optional_str, resolve_filters};
use crate::ipc::types::{AppState, Request};
use crate::model::Bucket;
use crate::report;
use serde_json::json;

fn handle_analytics_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let spec = match resolve_filters(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subset = match analytics::filtered_records(conn, &spec) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let stats = analytics::compute_stats(&subset);
    ok(
        &req.id,
        json!({
            "filters": spec,
            "stats": stats,
            "display": {
                "avg": report::fmt_1dp(stats.avg),
                "passRate": report::fmt_1dp(stats.pass_rate),
                "excellenceRate": report::fmt_1dp(stats.excellence_rate),
            },
            "empty": stats.count == 0,
            "report": report::format_stats_report(&spec, &stats),
        }),
    )
}

/// The pair comes from a stored record when `recordId` is given, else from the name fields.
fn trend_identity(state: &AppState, req: &Request) -> Result<(String, String), serde_json::Value> {
    if let Some(record_id) = optional_str(req, "recordId") {
        let conn = db_conn(state, req)?;
        let rec = db::get_record(conn, &record_id).map_err(|e| store_err(&req.id, e))?;
        return Ok((rec.student_name, rec.course_name));
    }
    match (
        optional_str(req, "studentName"),
        optional_str(req, "courseName"),
    ) {
        (Some(name), Some(course)) => Ok((name, course)),
        _ => Err(err(
            &req.id,
            "bad_params",
            "select a record or provide studentName and courseName",
            None,
        )),
    }
}

fn handle_analytics_trend(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let (student_name, course_name) = match trend_identity(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let points = match analytics::trend_for(conn, &student_name, &course_name) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };

    let found = !points.is_empty();
    let (message, detail_text) = if found {
        (
            serde_json::Value::Null,
            json!(report::trend_detail(&student_name, &course_name, &points)),
        )
    } else {
        (
            json!(report::trend_not_found_message(&student_name, &course_name)),
            serde_json::Value::Null,
        )
    };
    let entries: Vec<serde_json::Value> = points
        .iter()
        .map(|p| {
            json!({
                "index": p.index,
                "score": p.score,
                "examDate": p.exam_date,
                "detail": report::trend_entry_line(p),
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "studentName": student_name,
            "courseName": course_name,
            "found": found,
            "message": message,
            "title": report::trend_title(&student_name, &course_name),
            "seriesName": report::trend_series_name(&student_name, &course_name),
            "axis": { "yMin": 0, "yMax": 100, "xTitle": "考试次数", "yTitle": "成绩 (分)" },
            "points": entries,
            "detailText": detail_text,
        }),
    )
}

fn handle_analytics_distribution(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let spec = match resolve_filters(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subset = match analytics::filtered_records(conn, &spec) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let buckets = analytics::bucketize(&subset);
    let slices: Vec<serde_json::Value> = Bucket::ALL
        .iter()
        .filter_map(|b| {
            buckets.get(b).map(|count| {
                json!({
                    "bucket": b.key(),
                    "label": b.label(),
                    "count": count,
                })
            })
        })
        .collect();
    let empty = buckets.is_empty();
    let message = if empty {
        json!(report::DISTRIBUTION_EMPTY_MESSAGE)
    } else {
        serde_json::Value::Null
    };
    ok(
        &req.id,
        json!({
            "filters": spec,
            "total": subset.len(),
            "empty": empty,
            "message": message,
            "title": report::distribution_title(&spec),
            "slices": slices,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.stats" => Some(handle_analytics_stats(state, req)),
        "analytics.trend" => Some(handle_analytics_trend(state, req)),
        "analytics.distribution" => Some(handle_analytics_distribution(state, req)),
        _ => None,
    }
}
