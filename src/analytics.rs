use crate::model::{Bucket, FilterSpec, ScoreRecord};
use crate::store::{RecordSource, StoreError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const PASS_THRESHOLD: i64 = 60;
pub const EXCELLENT_THRESHOLD: i64 = 85;

/// Records matching `spec`, in the order they were given.
pub fn apply_filter<'a>(records: &'a [ScoreRecord], spec: &FilterSpec) -> Vec<&'a ScoreRecord> {
    records.iter().filter(|r| spec.matches(r)).collect()
}

/// Aggregate statistics over a subset. All fields are zero for an empty subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub count: usize,
    pub avg: f64,
    pub max: i64,
    pub min: i64,
    pub pass_rate: f64,
    pub excellence_rate: f64,
}

pub fn compute_stats<'a, I>(subset: I) -> Stats
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let mut count: usize = 0;
    let mut sum: i64 = 0;
    let mut max = i64::MIN;
    let mut min = i64::MAX;
    let mut passed: usize = 0;
    let mut excellent: usize = 0;

    for r in subset {
        count += 1;
        sum += r.score;
        max = max.max(r.score);
        min = min.min(r.score);
        if r.score >= PASS_THRESHOLD {
            passed += 1;
        }
        if r.score >= EXCELLENT_THRESHOLD {
            excellent += 1;
        }
    }

    if count == 0 {
        return Stats::default();
    }

    let n = count as f64;
    Stats {
        count,
        avg: sum as f64 / n,
        max,
        min,
        pass_rate: 100.0 * passed as f64 / n,
        excellence_rate: 100.0 * excellent as f64 / n,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Zero-based exam ordinal; dates are not evenly spaced so this is the x axis.
    pub index: usize,
    pub score: i64,
    pub exam_date: NaiveDate,
}

/// Chronological score series for one student in one course.
///
/// Same-day exams keep their store order (stable sort).
pub fn build_trend(records: &[ScoreRecord], student_name: &str, course_name: &str) -> Vec<TrendPoint> {
    let mut matched: Vec<&ScoreRecord> = records
        .iter()
        .filter(|r| r.student_name == student_name && r.course_name == course_name)
        .collect();
    matched.sort_by_key(|r| r.exam_date);
    matched
        .into_iter()
        .enumerate()
        .map(|(index, r)| TrendPoint {
            index,
            score: r.score,
            exam_date: r.exam_date,
        })
        .collect()
}

/// Counts per tier. Tiers with no records are absent from the map.
pub fn bucketize<'a, I>(subset: I) -> BTreeMap<Bucket, usize>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let mut out = BTreeMap::new();
    for r in subset {
        *out.entry(Bucket::for_score(r.score)).or_insert(0) += 1;
    }
    out
}

/// Snapshot `source` and narrow it with `spec`.
pub fn filtered_records<S>(source: &S, spec: &FilterSpec) -> Result<Vec<ScoreRecord>, StoreError>
where
    S: RecordSource + ?Sized,
{
    let all = source.snapshot()?;
    Ok(apply_filter(&all, spec).into_iter().cloned().collect())
}

pub fn trend_for<S>(source: &S, student_name: &str, course_name: &str) -> Result<Vec<TrendPoint>, StoreError>
where
    S: RecordSource + ?Sized,
{
    let records = source.snapshot_for_pair(student_name, course_name)?;
    Ok(build_trend(&records, student_name, course_name))
}
