use crate::db;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{db_conn, parse_date, parse_score, required_str, resolve_filters};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewScoreRecord, RecordPatch, ALL_CLASSES_LABEL, ALL_COURSES_LABEL};
use serde_json::json;

fn parse_new_record(req: &Request) -> Result<NewScoreRecord, serde_json::Value> {
    let student_name = required_str(req, "studentName")?;
    let student_class = required_str(req, "studentClass")?;
    let course_name = required_str(req, "courseName")?;
    let Some(score_v) = req.params.get("score") else {
        return Err(err(&req.id, "bad_params", "missing score", None));
    };
    let score = parse_score(req, score_v)?;
    let exam_date = parse_date(req, &required_str(req, "examDate")?)?;
    Ok(NewScoreRecord {
        student_name,
        student_class,
        course_name,
        score,
        exam_date,
    })
}

fn handle_records_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let new_rec = match parse_new_record(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match db::insert_record(conn, &new_rec) {
        Ok(rec) => {
            tracing::info!(id = %rec.id, student = %rec.student_name, course = %rec.course_name, "record added");
            ok(&req.id, json!({ "id": rec.id, "record": rec }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_records_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let mut patch = RecordPatch::default();
    if let Some(v) = req.params.get("score").filter(|v| !v.is_null()) {
        match parse_score(req, v) {
            Ok(s) => patch.score = Some(s),
            Err(e) => return e,
        }
    }
    if let Some(v) = req.params.get("examDate").filter(|v| !v.is_null()) {
        let Some(raw) = v.as_str() else {
            return err(
                &req.id,
                "bad_params",
                "examDate must be a YYYY-MM-DD string",
                Some(json!({ "examDate": v })),
            );
        };
        match parse_date(req, raw) {
            Ok(d) => patch.exam_date = Some(d),
            Err(e) => return e,
        }
    }

    match db::update_record(conn, &id, &patch) {
        Ok(rec) => {
            tracing::info!(id = %rec.id, "record updated");
            ok(&req.id, json!({ "record": rec }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match db::delete_record(conn, &id) {
        Ok(()) => {
            tracing::info!(id = %id, "record deleted");
            ok(&req.id, json!({ "ok": true }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let spec = match resolve_filters(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match db::list_records(conn, &spec) {
        Ok(records) => ok(
            &req.id,
            json!({
                "filters": spec,
                "count": records.len(),
                "records": records,
            }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_records_distinct(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let classes = match db::distinct_classes(conn) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let courses = match db::distinct_courses(conn) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let class_options: Vec<&str> = std::iter::once(ALL_CLASSES_LABEL)
        .chain(classes.iter().map(|s| s.as_str()))
        .collect();
    let course_options: Vec<&str> = std::iter::once(ALL_COURSES_LABEL)
        .chain(courses.iter().map(|s| s.as_str()))
        .collect();
    ok(
        &req.id,
        json!({
            "classes": classes,
            "courses": courses,
            "classOptions": class_options,
            "courseOptions": course_options,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.add" => Some(handle_records_add(state, req)),
        "records.update" => Some(handle_records_update(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        "records.list" => Some(handle_records_list(state, req)),
        "records.distinct" => Some(handle_records_distinct(state, req)),
        _ => None,
    }
}
