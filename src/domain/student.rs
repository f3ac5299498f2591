use super::ids::{CourseId, ProgressId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student account.
///
/// Each enrolled course maps to the progress record created with the
/// enrollment, so the two can never drift apart.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Student {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub enrollments: BTreeMap<CourseId, ProgressId>,
}

impl Student {
    pub fn new(
        id: impl Into<UserId>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            enrollments: BTreeMap::new(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn progress_for(&self, course: &CourseId) -> Option<&ProgressId> {
        self.enrollments.get(course)
    }

    /// Records an enrollment unless one already exists for `course`.
    ///
    /// Returns the progress id that is now associated with the course.
    pub fn record_enrollment(&mut self, course: CourseId, progress: ProgressId) -> &ProgressId {
        self.enrollments.entry(course).or_insert(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_enrollment_keeps_first_progress() {
        let mut student = Student::new("u1", "ada@example.com", "Ada", "Lovelace");
        let first = ProgressId::from("p1");
        let kept = student
            .record_enrollment(CourseId::from("c1"), first.clone())
            .clone();
        assert_eq!(kept, first);

        let kept = student
            .record_enrollment(CourseId::from("c1"), ProgressId::from("p2"))
            .clone();
        assert_eq!(kept, first);
        assert_eq!(student.enrollments.len(), 1);
    }

    #[test]
    fn test_display_name() {
        let student = Student::new("u1", "ada@example.com", "Ada", "Lovelace");
        assert_eq!(student.display_name(), "Ada Lovelace");
    }
}
