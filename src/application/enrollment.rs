use super::notification::NotificationDispatcher;
use crate::domain::enrollment::{EnrollmentReport, FailureReason};
use crate::domain::ids::{CourseId, UserId};
use crate::domain::ports::EnrollmentStoreRef;
use crate::error::PaymentError;
use tracing::{error, info, warn};

/// Enrolls a student in purchased courses after the payment was verified.
///
/// Courses are processed sequentially and a failure for one course never
/// stops the others. Every course is a single atomic, idempotent store
/// operation, so re-running with the failed ids is always safe.
pub struct EnrollmentProcessor {
    store: EnrollmentStoreRef,
    notifications: NotificationDispatcher,
}

impl EnrollmentProcessor {
    pub fn new(store: EnrollmentStoreRef, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    pub async fn enroll(&self, student: &UserId, course_ids: &[CourseId]) -> EnrollmentReport {
        let mut report = EnrollmentReport::default();

        for course_id in course_ids {
            match self.store.enroll(student, course_id).await {
                Ok(outcome) => {
                    if outcome.is_new() {
                        info!(%student, course = %course_id, "student enrolled");
                        self.notifications
                            .enrollment_confirmed(outcome.enrollment())
                            .await;
                    } else {
                        info!(%student, course = %course_id, "enrollment already present");
                    }
                    report.record_success(&outcome);
                }
                Err(e) => {
                    let reason = match e {
                        PaymentError::CourseNotFound(_) => FailureReason::CourseNotFound,
                        PaymentError::StudentNotFound(_) => FailureReason::StudentNotFound,
                        other => {
                            error!(%student, course = %course_id, error = %other, "enrollment write failed");
                            FailureReason::Storage(other.to_string())
                        }
                    };
                    warn!(%student, course = %course_id, %reason, "course not enrolled");
                    report.record_failure(course_id.clone(), reason);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Course;
    use crate::domain::money::Price;
    use crate::domain::ports::{CourseStore, EnrollmentStore, StudentStore};
    use crate::domain::student::Student;
    use crate::infrastructure::in_memory::{InMemoryCatalog, InMemoryMailer};
    use std::sync::Arc;

    async fn setup() -> (EnrollmentProcessor, InMemoryCatalog, InMemoryMailer) {
        let catalog = InMemoryCatalog::new();
        CourseStore::store(&catalog, Course::new("c1", "Rust 101", Price(500)).published())
            .await
            .unwrap();
        CourseStore::store(&catalog, Course::new("c2", "Async Rust", Price(1500)).published())
            .await
            .unwrap();
        StudentStore::store(
            &catalog,
            Student::new("u1", "ada@example.com", "Ada", "Lovelace"),
        )
        .await
        .unwrap();
        let mailer = InMemoryMailer::new();
        let processor = EnrollmentProcessor::new(
            Arc::new(catalog.clone()),
            NotificationDispatcher::new(Arc::new(mailer.clone())),
        );
        (processor, catalog, mailer)
    }

    #[tokio::test]
    async fn test_enrolls_every_course() {
        let (processor, catalog, mailer) = setup().await;
        let report = processor
            .enroll(&UserId::from("u1"), &[CourseId::from("c1"), CourseId::from("c2")])
            .await;

        assert!(report.is_complete());
        assert_eq!(report.enrolled.len(), 2);
        assert!(report.enrolled.iter().all(|e| e.newly_enrolled));
        assert_eq!(mailer.outbox().await.len(), 2);

        for course in &report.enrolled {
            let progress = catalog.progress(&course.progress_id).await.unwrap().unwrap();
            assert!(progress.completed_lectures.is_empty());
        }
    }

    #[tokio::test]
    async fn test_continues_past_missing_course() {
        let (processor, _catalog, _mailer) = setup().await;
        let report = processor
            .enroll(
                &UserId::from("u1"),
                &[
                    CourseId::from("gone"),
                    CourseId::from("c1"),
                    CourseId::from("c2"),
                ],
            )
            .await;

        assert_eq!(report.enrolled.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].course_id, CourseId::from("gone"));
        assert_eq!(report.failed[0].reason, FailureReason::CourseNotFound);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_and_silent() {
        let (processor, catalog, mailer) = setup().await;
        let student = UserId::from("u1");
        let courses = [CourseId::from("c1"), CourseId::from("c2")];

        processor.enroll(&student, &courses).await;
        let second = processor.enroll(&student, &courses).await;

        assert!(second.is_complete());
        assert!(second.enrolled.iter().all(|e| !e.newly_enrolled));
        assert_eq!(mailer.outbox().await.len(), 2);

        let stored = StudentStore::get(&catalog, &student).await.unwrap().unwrap();
        assert_eq!(stored.enrollments.len(), 2);
        let c1 = CourseStore::get(&catalog, &courses[0]).await.unwrap().unwrap();
        assert_eq!(c1.students_enrolled.len(), 1);
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_fail_enrollment() {
        let (processor, _catalog, mailer) = setup().await;
        mailer.set_failing(true);
        let report = processor
            .enroll(&UserId::from("u1"), &[CourseId::from("c1")])
            .await;
        assert!(report.is_complete());
        assert_eq!(report.enrolled.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_student_fails_every_course() {
        let (processor, _catalog, mailer) = setup().await;
        let report = processor
            .enroll(&UserId::from("ghost"), &[CourseId::from("c1"), CourseId::from("c2")])
            .await;
        assert!(report.enrolled.is_empty());
        assert!(
            report
                .failed
                .iter()
                .all(|f| f.reason == FailureReason::StudentNotFound)
        );
        assert!(mailer.outbox().await.is_empty());
    }
}
