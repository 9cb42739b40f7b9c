mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("scorebook-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("workspacePath").map(|v| v.is_null()).unwrap_or(false));

    let before = request(&mut stdin, &mut reader, "2", "records.list", json!({}));
    assert_eq!(error_code(&before), Some("no_workspace"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "records.add",
        json!({
            "studentName": "Alice",
            "studentClass": "C1",
            "courseName": "Math",
            "score": 80,
            "examDate": "2024-03-01"
        }),
    );
    let record_id = added.get("id").and_then(|v| v.as_str()).expect("id").to_string();

    let calls = vec![
        ("filters.get", json!({})),
        ("filters.set", json!({ "className": "C1" })),
        ("records.list", json!({})),
        ("records.distinct", json!({})),
        ("records.update", json!({ "id": record_id, "score": 81 })),
        ("analytics.stats", json!({})),
        ("analytics.trend", json!({ "recordId": record_id })),
        ("analytics.distribution", json!({})),
        (
            "exports.csv",
            json!({ "outPath": workspace.join("smoke.csv").to_string_lossy() }),
        ),
        ("auth.register", json!({ "username": "smoke", "password": "pw" })),
        ("auth.login", json!({ "username": "smoke", "password": "pw" })),
        ("records.delete", json!({ "id": record_id })),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let id = format!("call-{}", i);
        let _ = request_ok(&mut stdin, &mut reader, &id, method, params);
    }

    let unknown = request(&mut stdin, &mut reader, "99", "classes.list", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_lines_get_bad_json_and_the_loop_continues() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(error_code(&v), Some("bad_json"));

    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    drop(stdin);
    let _ = child.wait();
}
