use super::course::Course;
use super::ids::{CourseId, ProgressId};
use super::progress::ProgressRecord;
use super::student::Student;
use serde::Serialize;
use std::fmt;

/// Contact details needed to notify a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub email: String,
    pub name: String,
}

/// A (student, course) enrollment as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub course_name: String,
    pub progress_id: ProgressId,
    pub student: Contact,
}

/// Result of the atomic per-course enrollment write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    /// The enrollment was created by this call.
    Enrolled(Enrollment),
    /// The enrollment already existed; nothing was written.
    AlreadyEnrolled(Enrollment),
}

impl EnrollmentOutcome {
    pub fn enrollment(&self) -> &Enrollment {
        match self {
            Self::Enrolled(e) | Self::AlreadyEnrolled(e) => e,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Enrolled(_))
    }
}

/// Applies an enrollment to in-memory copies of the course and student.
///
/// Returns the outcome and, for a new enrollment, the progress record the
/// caller must persist together with both documents. An existing entry in the
/// student's mapping makes this a no-op apart from repairing a missing
/// enrolled-set membership on the course.
pub fn apply_enrollment(
    course: &mut Course,
    student: &mut Student,
) -> (EnrollmentOutcome, Option<ProgressRecord>) {
    let contact = Contact {
        email: student.email.clone(),
        name: student.display_name(),
    };
    course.enroll(&student.id);

    if let Some(progress_id) = student.progress_for(&course.id) {
        let enrollment = Enrollment {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            progress_id: progress_id.clone(),
            student: contact,
        };
        return (EnrollmentOutcome::AlreadyEnrolled(enrollment), None);
    }

    let progress = ProgressRecord::start(course.id.clone(), student.id.clone());
    student.record_enrollment(course.id.clone(), progress.id.clone());
    let enrollment = Enrollment {
        course_id: course.id.clone(),
        course_name: course.name.clone(),
        progress_id: progress.id.clone(),
        student: contact,
    };
    (EnrollmentOutcome::Enrolled(enrollment), Some(progress))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    CourseNotFound,
    StudentNotFound,
    Storage(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CourseNotFound => f.write_str("CourseNotFound"),
            Self::StudentNotFound => f.write_str("StudentNotFound"),
            Self::Storage(_) => f.write_str("StorageError"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub course_id: CourseId,
    pub course_name: String,
    pub progress_id: ProgressId,
    pub newly_enrolled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedCourse {
    pub course_id: CourseId,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: FailureReason,
}

fn serialize_reason<S>(reason: &FailureReason, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(reason)
}

/// Per-course result of an enrollment run.
///
/// Enrollment is not transactional across courses: a failure for one course
/// leaves the others enrolled, and the failed ids can be retried as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrollmentReport {
    pub enrolled: Vec<EnrolledCourse>,
    pub failed: Vec<FailedCourse>,
}

impl EnrollmentReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_course_ids(&self) -> Vec<CourseId> {
        self.failed.iter().map(|f| f.course_id.clone()).collect()
    }

    pub(crate) fn record_success(&mut self, outcome: &EnrollmentOutcome) {
        let enrollment = outcome.enrollment();
        self.enrolled.push(EnrolledCourse {
            course_id: enrollment.course_id.clone(),
            course_name: enrollment.course_name.clone(),
            progress_id: enrollment.progress_id.clone(),
            newly_enrolled: outcome.is_new(),
        });
    }

    pub(crate) fn record_failure(&mut self, course_id: CourseId, reason: FailureReason) {
        self.failed.push(FailedCourse { course_id, reason });
    }
}
