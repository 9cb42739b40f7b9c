use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel label the class picker shows for "no class constraint".
pub const ALL_CLASSES_LABEL: &str = "全部班级";
/// Sentinel label the course picker shows for "no course constraint".
pub const ALL_COURSES_LABEL: &str = "全部课程";

/// One exam result as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: String,
    pub student_name: String,
    pub student_class: String,
    pub course_name: String,
    pub score: i64,
    pub exam_date: NaiveDate,
}

/// A record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScoreRecord {
    pub student_name: String,
    pub student_class: String,
    pub course_name: String,
    pub score: i64,
    pub exam_date: NaiveDate,
}

/// Field-level correction of an existing record. Identity fields are never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub score: Option<i64>,
    pub exam_date: Option<NaiveDate>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.exam_date.is_none()
    }
}

/// Pair of optional exact-match constraints. `None` matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    #[serde(rename = "className")]
    pub class_filter: Option<String>,
    #[serde(rename = "courseName")]
    pub course_filter: Option<String>,
}

impl FilterSpec {
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a spec from the picker labels, mapping the sentinels to "no constraint".
    pub fn from_labels(class_label: &str, course_label: &str) -> Self {
        Self {
            class_filter: label_to_filter(class_label, ALL_CLASSES_LABEL),
            course_filter: label_to_filter(course_label, ALL_COURSES_LABEL),
        }
    }

    pub fn matches(&self, record: &ScoreRecord) -> bool {
        let class_ok = self
            .class_filter
            .as_deref()
            .map(|c| record.student_class == c)
            .unwrap_or(true);
        let course_ok = self
            .course_filter
            .as_deref()
            .map(|c| record.course_name == c)
            .unwrap_or(true);
        class_ok && course_ok
    }

    pub fn is_unconstrained(&self) -> bool {
        self.class_filter.is_none() && self.course_filter.is_none()
    }
}

/// Map a picker value to a filter value. Only empty text and the sentinel mean no constraint;
/// anything else is a real class or course name, "All" included.
pub fn label_to_filter(label: &str, sentinel: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed == sentinel {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Score tiers used for distribution reporting, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Fail,
    Pass,
    Good,
    Excellent,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Fail, Bucket::Pass, Bucket::Good, Bucket::Excellent];

    pub fn for_score(score: i64) -> Bucket {
        if score < 60 {
            Bucket::Fail
        } else if score < 70 {
            Bucket::Pass
        } else if score < 85 {
            Bucket::Good
        } else {
            Bucket::Excellent
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Bucket::Fail => "fail",
            Bucket::Pass => "pass",
            Bucket::Good => "good",
            Bucket::Excellent => "excellent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Fail => "不及格(<60分)",
            Bucket::Pass => "及格(60~69分)",
            Bucket::Good => "良好(70~84分)",
            Bucket::Excellent => "优秀(≥85分)",
        }
    }
}
