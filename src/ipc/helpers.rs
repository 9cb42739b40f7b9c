use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::model::{label_to_filter, FilterSpec, ALL_CLASSES_LABEL, ALL_COURSES_LABEL};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn parse_score(req: &Request, v: &serde_json::Value) -> Result<i64, serde_json::Value> {
    v.as_i64().ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            "score must be an integer",
            Some(json!({ "score": v })),
        )
    })
}

pub fn parse_date(req: &Request, raw: &str) -> Result<NaiveDate, serde_json::Value> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        err(
            &req.id,
            "bad_params",
            "examDate must be a YYYY-MM-DD date",
            Some(json!({ "examDate": raw })),
        )
    })
}

/// One filter dimension: null, "" or the sentinel label mean no constraint.
fn parse_dimension(v: &serde_json::Value, sentinel: &str) -> Result<Option<String>, String> {
    if v.is_null() {
        return Ok(None);
    }
    match v.as_str() {
        Some(s) => Ok(label_to_filter(s, sentinel)),
        None => Err("filter values must be string or null".to_string()),
    }
}

fn dimension_label<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<&'a str, String> {
    match obj.get(key) {
        None => Ok(""),
        Some(v) if v.is_null() => Ok(""),
        Some(v) => v
            .as_str()
            .ok_or_else(|| format!("filters.{} must be string or null", key)),
    }
}

pub fn parse_filter_spec(v: &serde_json::Value) -> Result<FilterSpec, String> {
    let Some(obj) = v.as_object() else {
        return Err("filters must be an object".to_string());
    };
    Ok(FilterSpec::from_labels(
        dimension_label(obj, "className")?,
        dimension_label(obj, "courseName")?,
    ))
}

/// Apply a partial update: absent keys keep the current dimension.
pub fn merge_filter_update(current: &FilterSpec, v: &serde_json::Value) -> Result<FilterSpec, String> {
    let Some(obj) = v.as_object() else {
        return Err("params must be an object".to_string());
    };
    let mut next = current.clone();
    if let Some(c) = obj.get("className") {
        next.class_filter = parse_dimension(c, ALL_CLASSES_LABEL)?;
    }
    if let Some(c) = obj.get("courseName") {
        next.course_filter = parse_dimension(c, ALL_COURSES_LABEL)?;
    }
    Ok(next)
}

/// Explicit `params.filters` wins; otherwise the session filter applies.
pub fn resolve_filters(state: &AppState, req: &Request) -> Result<FilterSpec, serde_json::Value> {
    match req.params.get("filters") {
        None => Ok(state.filters.clone()),
        Some(v) if v.is_null() => Ok(state.filters.clone()),
        Some(v) => parse_filter_spec(v).map_err(|m| err(&req.id, "bad_params", m, None)),
    }
}
