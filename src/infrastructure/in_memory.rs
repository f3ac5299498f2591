use crate::domain::course::Course;
use crate::domain::enrollment::{EnrollmentOutcome, apply_enrollment};
use crate::domain::ids::{CourseId, ProgressId, UserId};
use crate::domain::order::{GatewayOrder, OrderRequest};
use crate::domain::ports::{CourseStore, EnrollmentStore, Mailer, PaymentGateway, StudentStore};
use crate::domain::progress::ProgressRecord;
use crate::domain::student::Student;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// How many gateway requests or outbox messages are kept; older ones are dropped.
pub const MAX_RECORDED: usize = 256;

fn record<T>(log: &mut VecDeque<T>, item: T) {
    if log.len() == MAX_RECORDED {
        log.pop_front();
    }
    log.push_back(item);
}

#[derive(Default)]
struct CatalogState {
    courses: HashMap<CourseId, Course>,
    students: HashMap<UserId, Student>,
    progress: HashMap<ProgressId, ProgressRecord>,
}

/// A thread-safe in-memory document store for courses, students and progress.
///
/// All three collections sit behind a single `RwLock`, so an enrollment's
/// writes are applied under one write guard and are atomic with respect to
/// other requests. Ideal for tests and offline runs.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCatalog {
    async fn store(&self, course: Course) -> Result<()> {
        let mut state = self.state.write().await;
        state.courses.insert(course.id.clone(), course);
        Ok(())
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let state = self.state.read().await;
        Ok(state.courses.get(course_id).cloned())
    }

    async fn remove(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let mut state = self.state.write().await;
        Ok(state.courses.remove(course_id))
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        let state = self.state.read().await;
        Ok(state.courses.values().cloned().collect())
    }
}

#[async_trait]
impl StudentStore for InMemoryCatalog {
    async fn store(&self, student: Student) -> Result<()> {
        let mut state = self.state.write().await;
        state.students.insert(student.id.clone(), student);
        Ok(())
    }

    async fn get(&self, student_id: &UserId) -> Result<Option<Student>> {
        let state = self.state.read().await;
        Ok(state.students.get(student_id).cloned())
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryCatalog {
    async fn enroll(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let student = state
            .students
            .get_mut(student_id)
            .ok_or_else(|| PaymentError::StudentNotFound(student_id.clone()))?;
        let course = state
            .courses
            .get_mut(course_id)
            .ok_or_else(|| PaymentError::CourseNotFound(course_id.clone()))?;

        let (outcome, progress) = apply_enrollment(course, student);
        if let Some(progress) = progress {
            state.progress.insert(progress.id.clone(), progress);
        }
        Ok(outcome)
    }

    async fn progress(&self, progress_id: &ProgressId) -> Result<Option<ProgressRecord>> {
        let state = self.state.read().await;
        Ok(state.progress.get(progress_id).cloned())
    }
}

/// A local stand-in for the payment gateway.
///
/// Issues sequential order ids and remembers every request it accepted.
/// Used for offline runs and tests; it can be switched into a failing mode
/// to simulate an unreachable gateway.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    key_id: String,
    next_order: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
    requests: Arc<Mutex<VecDeque<OrderRequest>>>,
}

impl InMemoryGateway {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent accepted requests, oldest first.
    pub async fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PaymentError::GatewayUnavailable(
                "offline gateway is failing".to_string(),
            ));
        }
        let n = self.next_order.fetch_add(1, Ordering::SeqCst) + 1;
        record(&mut *self.requests.lock().await, request.clone());
        Ok(GatewayOrder {
            id: format!("order_{n:014}"),
            amount: request.amount.value(),
            currency: request.currency.clone(),
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// A sent (or attempted) message held by [`InMemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mailer that keeps every message in an outbox instead of delivering it.
#[derive(Default, Clone)]
pub struct InMemoryMailer {
    outbox: Arc<Mutex<VecDeque<OutboxMessage>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail after recording the attempt.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent messages, oldest first.
    pub async fn outbox(&self) -> Vec<OutboxMessage> {
        self.outbox.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        record(
            &mut *self.outbox.lock().await,
            OutboxMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                html: html.to_string(),
            },
        );
        if self.failing.load(Ordering::SeqCst) {
            return Err(PaymentError::NotificationFailed(format!(
                "outbox rejected message to {to}"
            )));
        }
        info!(%to, %subject, "message queued in outbox");
        Ok(())
    }
}
