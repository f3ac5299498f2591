use super::course::Course;
use super::enrollment::EnrollmentOutcome;
use super::ids::{CourseId, ProgressId, UserId};
use super::order::{GatewayOrder, OrderRequest};
use super::progress::ProgressRecord;
use super::student::Student;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn store(&self, course: Course) -> Result<()>;
    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>>;
    async fn remove(&self, course_id: &CourseId) -> Result<Option<Course>>;
    async fn all_courses(&self) -> Result<Vec<Course>>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn store(&self, student: Student) -> Result<()>;
    async fn get(&self, student_id: &UserId) -> Result<Option<Student>>;
}

/// Storage side of enrollment.
///
/// `enroll` must apply all of its writes (course enrolled set, progress
/// record, student mapping) atomically and be keyed by (student, course):
/// a second call for the same pair returns `AlreadyEnrolled` and writes
/// nothing.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn enroll(&self, student_id: &UserId, course_id: &CourseId)
    -> Result<EnrollmentOutcome>;
    async fn progress(&self, progress_id: &ProgressId) -> Result<Option<ProgressRecord>>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder>;
    /// Publishable key handed to clients to open checkout.
    fn key_id(&self) -> &str;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

pub type CourseStoreRef = Arc<dyn CourseStore>;
pub type StudentStoreRef = Arc<dyn StudentStore>;
pub type EnrollmentStoreRef = Arc<dyn EnrollmentStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type MailerRef = Arc<dyn Mailer>;
