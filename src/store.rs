use crate::model::ScoreRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt stored value in {column} for record {id}: {value:?}")]
    Corrupt {
        id: String,
        column: &'static str,
        value: String,
    },
}

impl StoreError {
    /// Stable error code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::Invalid(_) => "bad_params",
            StoreError::Conflict(_) => "conflict",
            StoreError::Sqlite(_) => "db_query_failed",
            StoreError::Corrupt { .. } => "data_corrupt",
        }
    }
}

/// Read side of the record store. The analytics engine only ever sees snapshots.
pub trait RecordSource {
    /// Every record, in store iteration order.
    fn snapshot(&self) -> Result<Vec<ScoreRecord>, StoreError>;

    /// Records for one student/course pair, in store iteration order.
    fn snapshot_for_pair(
        &self,
        student_name: &str,
        course_name: &str,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut all = self.snapshot()?;
        all.retain(|r| r.student_name == student_name && r.course_name == course_name);
        Ok(all)
    }
}

impl RecordSource for [ScoreRecord] {
    fn snapshot(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.to_vec())
    }
}
