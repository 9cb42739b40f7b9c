use crate::model::{FilterSpec, NewScoreRecord, RecordPatch, ScoreRecord};
use crate::store::{RecordSource, StoreError};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

pub const DB_FILE_NAME: &str = "scorebook.sqlite3";

const RECORD_COLUMNS: &str = "id, student_name, student_class, course_name, score, exam_date";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS score_records(
            id TEXT PRIMARY KEY,
            student_name TEXT NOT NULL,
            student_class TEXT NOT NULL,
            course_name TEXT NOT NULL,
            score INTEGER NOT NULL CHECK(score >= 0 AND score <= 100),
            exam_date TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_score_records_class ON score_records(student_class)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_score_records_course ON score_records(course_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_score_records_pair ON score_records(student_name, course_name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            username TEXT PRIMARY KEY,
            salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// A row as stored, with `exam_date` still as text.
struct RawRecord {
    id: String,
    student_name: String,
    student_class: String,
    course_name: String,
    score: i64,
    exam_date: String,
}

fn raw_from_row(r: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: r.get(0)?,
        student_name: r.get(1)?,
        student_class: r.get(2)?,
        course_name: r.get(3)?,
        score: r.get(4)?,
        exam_date: r.get(5)?,
    })
}

impl RawRecord {
    fn into_record(self) -> Result<ScoreRecord, StoreError> {
        let exam_date = match NaiveDate::parse_from_str(&self.exam_date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                return Err(StoreError::Corrupt {
                    id: self.id,
                    column: "exam_date",
                    value: self.exam_date,
                })
            }
        };
        Ok(ScoreRecord {
            id: self.id,
            student_name: self.student_name,
            student_class: self.student_class,
            course_name: self.course_name,
            score: self.score,
            exam_date,
        })
    }
}

fn collect_records(raw: Vec<RawRecord>) -> Result<Vec<ScoreRecord>, StoreError> {
    raw.into_iter().map(RawRecord::into_record).collect()
}

fn validate_score(score: i64) -> Result<(), StoreError> {
    if !(0..=100).contains(&score) {
        return Err(StoreError::Invalid(format!(
            "score must be between 0 and 100, got {}",
            score
        )));
    }
    Ok(())
}

fn validate_new_record(rec: &NewScoreRecord) -> Result<(), StoreError> {
    for (field, value) in [
        ("studentName", &rec.student_name),
        ("studentClass", &rec.student_class),
        ("courseName", &rec.course_name),
    ] {
        if value.trim().is_empty() {
            return Err(StoreError::Invalid(format!("{} must not be empty", field)));
        }
    }
    validate_score(rec.score)
}

fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

pub fn insert_record(conn: &Connection, rec: &NewScoreRecord) -> Result<ScoreRecord, StoreError> {
    validate_new_record(rec)?;
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO score_records(id, student_name, student_class, course_name, score, exam_date, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            rec.student_name.trim(),
            rec.student_class.trim(),
            rec.course_name.trim(),
            rec.score,
            rec.exam_date,
            now_timestamp()
        ],
    )?;
    get_record(conn, &id)
}

pub fn get_record(conn: &Connection, id: &str) -> Result<ScoreRecord, StoreError> {
    let sql = format!("SELECT {} FROM score_records WHERE id = ?", RECORD_COLUMNS);
    conn.query_row(&sql, [id], raw_from_row)
        .optional()?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?
        .into_record()
}

pub fn update_record(
    conn: &Connection,
    id: &str,
    patch: &RecordPatch,
) -> Result<ScoreRecord, StoreError> {
    if patch.is_empty() {
        return Err(StoreError::Invalid(
            "nothing to update: provide score and/or examDate".to_string(),
        ));
    }
    if let Some(score) = patch.score {
        validate_score(score)?;
    }
    // Unknown ids are NotFound, never a silent no-op.
    get_record(conn, id)?;

    let tx = conn.unchecked_transaction()?;
    if let Some(score) = patch.score {
        tx.execute(
            "UPDATE score_records SET score = ?, updated_at = ? WHERE id = ?",
            params![score, now_timestamp(), id],
        )?;
    }
    if let Some(date) = patch.exam_date {
        tx.execute(
            "UPDATE score_records SET exam_date = ?, updated_at = ? WHERE id = ?",
            params![date, now_timestamp(), id],
        )?;
    }
    tx.commit()?;
    get_record(conn, id)
}

pub fn delete_record(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let n = conn.execute("DELETE FROM score_records WHERE id = ?", [id])?;
    if n == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Records matching `spec`, in insertion order. Filter values are bound, never spliced.
pub fn list_records(conn: &Connection, spec: &FilterSpec) -> Result<Vec<ScoreRecord>, StoreError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(c) = spec.class_filter.as_ref() {
        clauses.push("student_class = ?");
        values.push(Value::Text(c.clone()));
    }
    if let Some(c) = spec.course_filter.as_ref() {
        clauses.push("course_name = ?");
        values.push(Value::Text(c.clone()));
    }
    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM score_records {} ORDER BY rowid",
        RECORD_COLUMNS, where_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), raw_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    collect_records(rows)
}

pub fn list_records_for_pair(
    conn: &Connection,
    student_name: &str,
    course_name: &str,
) -> Result<Vec<ScoreRecord>, StoreError> {
    let sql = format!(
        "SELECT {} FROM score_records
         WHERE student_name = ? AND course_name = ?
         ORDER BY rowid",
        RECORD_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([student_name, course_name], raw_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    collect_records(rows)
}

pub fn distinct_classes(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT student_class FROM score_records ORDER BY student_class")?;
    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn distinct_courses(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT course_name FROM score_records ORDER BY course_name")?;
    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl RecordSource for Connection {
    fn snapshot(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        list_records(self, &FilterSpec::all())
    }

    fn snapshot_for_pair(
        &self,
        student_name: &str,
        course_name: &str,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        list_records_for_pair(self, student_name, course_name)
    }
}
