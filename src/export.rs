use crate::model::ScoreRecord;
use anyhow::Context;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const CSV_HEADER: &str = "序号,学生姓名,班级,课程名称,成绩,考试时间";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub row_count: usize,
}

pub fn default_export_path(workspace: &Path, today: NaiveDate) -> PathBuf {
    workspace.join(format!("成绩统计报表_{}.csv", today.format("%Y%m%d")))
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Report block, a blank line, then the filtered table with 1-based ordinals.
pub fn render_csv(report: &str, rows: &[ScoreRecord]) -> String {
    let mut out = String::new();
    out.push_str(report);
    out.push_str("\n\n");
    out.push_str(CSV_HEADER);
    out.push('\n');
    for (i, r) in rows.iter().enumerate() {
        let line = [
            (i + 1).to_string(),
            csv_field(&r.student_name),
            csv_field(&r.student_class),
            csv_field(&r.course_name),
            r.score.to_string(),
            r.exam_date.format("%Y-%m-%d").to_string(),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn write_csv_report(
    out_path: &Path,
    report: &str,
    rows: &[ScoreRecord],
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let mut file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    file.write_all(render_csv(report, rows).as_bytes())
        .context("failed to write csv report")?;
    file.flush().context("failed to flush csv report")?;

    Ok(ExportSummary {
        path: out_path.to_path_buf(),
        row_count: rows.len(),
    })
}
