use super::ids::{CourseId, ProgressId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-student, per-course record of completed lectures.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub course: CourseId,
    pub student: UserId,
    #[serde(default)]
    pub completed_lectures: BTreeSet<String>,
}

impl ProgressRecord {
    /// A fresh record with a generated id and nothing completed.
    pub fn start(course: CourseId, student: UserId) -> Self {
        Self {
            id: ProgressId::generate(),
            course,
            student,
            completed_lectures: BTreeSet::new(),
        }
    }
}
