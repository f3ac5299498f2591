use crate::domain::ids::{CourseId, UserId};
use crate::domain::money::{MinorAmount, Price};
use crate::domain::order::{CheckoutOrder, CourseLine, OrderRequest, Receipt};
use crate::domain::ports::{CourseStoreRef, PaymentGatewayRef, StudentStoreRef};
use crate::error::{PaymentError, Result};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Prices a cart of courses for a student and opens a gateway order for it.
///
/// Read-only with respect to courses and students: nothing is enrolled here.
/// Every check, including that the student exists, runs before the gateway
/// is called.
pub struct OrderAggregator {
    courses: CourseStoreRef,
    students: StudentStoreRef,
    gateway: PaymentGatewayRef,
    currency: String,
}

impl OrderAggregator {
    pub fn new(
        courses: CourseStoreRef,
        students: StudentStoreRef,
        gateway: PaymentGatewayRef,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            courses,
            students,
            gateway,
            currency: currency.into(),
        }
    }

    pub fn key_id(&self) -> &str {
        self.gateway.key_id()
    }

    pub async fn create_order(
        &self,
        student: &UserId,
        course_ids: &[CourseId],
    ) -> Result<CheckoutOrder> {
        self.create_order_at(student, course_ids, unix_millis()).await
    }

    /// Same as [`create_order`](Self::create_order) with an explicit clock
    /// reading, which only feeds the receipt token.
    pub async fn create_order_at(
        &self,
        student: &UserId,
        course_ids: &[CourseId],
        now_millis: u128,
    ) -> Result<CheckoutOrder> {
        let lines = self.price_courses(student, course_ids).await?;
        if self.students.get(student).await?.is_none() {
            return Err(PaymentError::StudentNotFound(student.clone()));
        }

        let total = lines
            .iter()
            .try_fold(Price::ZERO, |acc, line| acc.checked_add(line.price))
            .ok_or(PaymentError::InvalidAmount(u64::MAX))?;
        let amount = MinorAmount::from_total(total)?;

        let request = OrderRequest::new(
            amount,
            self.currency.clone(),
            Receipt::derive(now_millis, student),
            student,
            course_ids,
        );
        let order = self.gateway.create_order(&request).await.map_err(|e| {
            warn!(%student, error = %e, "gateway order creation failed");
            match e {
                PaymentError::GatewayUnavailable(_) => e,
                other => PaymentError::GatewayUnavailable(other.to_string()),
            }
        })?;

        info!(
            %student,
            order_id = %order.id,
            amount = order.amount,
            courses = lines.len(),
            "checkout order created"
        );

        Ok(CheckoutOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.gateway.key_id().to_string(),
            courses: lines,
            total_amount: total,
        })
    }

    /// Validates every course in order, stopping at the first problem.
    async fn price_courses(
        &self,
        student: &UserId,
        course_ids: &[CourseId],
    ) -> Result<Vec<CourseLine>> {
        if course_ids.is_empty() {
            return Err(PaymentError::ValidationError(
                "Please provide at least one course id".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            if course_id.is_blank() {
                return Err(PaymentError::ValidationError(
                    "Course id must not be blank".to_string(),
                ));
            }
            if !seen.insert(course_id) {
                return Err(PaymentError::ValidationError(format!(
                    "Course {course_id} is listed more than once"
                )));
            }
            let course = self
                .courses
                .get(course_id)
                .await?
                .ok_or_else(|| PaymentError::CourseNotFound(course_id.clone()))?;
            course.ensure_purchasable_by(student)?;
            lines.push(CourseLine {
                id: course.id,
                name: course.name,
                price: course.price,
            });
        }
        Ok(lines)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Course;
    use crate::domain::ports::{CourseStore, StudentStore};
    use crate::domain::student::Student;
    use crate::infrastructure::in_memory::{InMemoryCatalog, InMemoryGateway};
    use std::sync::Arc;

    async fn setup(courses: Vec<Course>) -> (OrderAggregator, InMemoryGateway) {
        let catalog = InMemoryCatalog::new();
        for course in courses {
            CourseStore::store(&catalog, course).await.unwrap();
        }
        for id in ["u1", "student42"] {
            let student = Student::new(id, format!("{id}@example.com"), "Test", "Student");
            StudentStore::store(&catalog, student).await.unwrap();
        }
        let gateway = InMemoryGateway::new("rzp_test_key");
        let aggregator = OrderAggregator::new(
            Arc::new(catalog.clone()),
            Arc::new(catalog),
            Arc::new(gateway.clone()),
            "INR",
        );
        (aggregator, gateway)
    }

    fn ids(raw: &[&str]) -> Vec<CourseId> {
        raw.iter().map(|s| CourseId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_total_and_minor_amount() {
        let (aggregator, gateway) = setup(vec![
            Course::new("c1", "Rust 101", Price(500)).published(),
            Course::new("c2", "Async Rust", Price(1500)).published(),
        ])
        .await;

        let order = aggregator
            .create_order(&UserId::from("u1"), &ids(&["c1", "c2"]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, Price(2000));
        assert_eq!(order.amount, 200_000);
        assert_eq!(order.currency, "INR");
        assert_eq!(order.key, "rzp_test_key");
        assert_eq!(order.courses.len(), 2);

        let requests = gateway.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount.value(), 200_000);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_duplicate_lists() {
        let (aggregator, gateway) =
            setup(vec![Course::new("c1", "Rust 101", Price(500)).published()]).await;
        let student = UserId::from("u1");

        assert!(matches!(
            aggregator.create_order(&student, &[]).await,
            Err(PaymentError::ValidationError(_))
        ));
        assert!(matches!(
            aggregator.create_order(&student, &ids(&["c1", "c1"])).await,
            Err(PaymentError::ValidationError(_))
        ));
        assert!(gateway.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_missing_enrolled_and_draft_courses() {
        let mut owned = Course::new("owned", "Owned", Price(100)).published();
        owned.enroll(&UserId::from("u1"));
        let (aggregator, gateway) = setup(vec![
            Course::new("c1", "Rust 101", Price(500)).published(),
            owned,
            Course::new("draft", "Draft", Price(100)),
        ])
        .await;
        let student = UserId::from("u1");

        assert!(matches!(
            aggregator.create_order(&student, &ids(&["c1", "nope"])).await,
            Err(PaymentError::CourseNotFound(id)) if id.as_str() == "nope"
        ));
        assert!(matches!(
            aggregator.create_order(&student, &ids(&["c1", "owned"])).await,
            Err(PaymentError::AlreadyEnrolled(_))
        ));
        assert!(matches!(
            aggregator.create_order(&student, &ids(&["c1", "draft"])).await,
            Err(PaymentError::NotPurchasable(_))
        ));
        assert!(gateway.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_student_never_reaches_gateway() {
        let (aggregator, gateway) = setup(vec![
            Course::new("c1", "Rust 101", Price(500)).published(),
            Course::new("c2", "Async Rust", Price(1500)).published(),
        ])
        .await;

        assert!(matches!(
            aggregator
                .create_order(&UserId::from("ghost"), &ids(&["c1", "c2"]))
                .await,
            Err(PaymentError::StudentNotFound(id)) if id.as_str() == "ghost"
        ));
        assert!(gateway.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_zero_total() {
        let (aggregator, _) =
            setup(vec![Course::new("free", "Free", Price::ZERO).published()]).await;
        assert!(matches!(
            aggregator
                .create_order(&UserId::from("u1"), &ids(&["free"]))
                .await,
            Err(PaymentError::InvalidAmount(0))
        ));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_unavailable() {
        let (aggregator, gateway) =
            setup(vec![Course::new("c1", "Rust 101", Price(500)).published()]).await;
        gateway.set_failing(true);
        assert!(matches!(
            aggregator
                .create_order(&UserId::from("u1"), &ids(&["c1"]))
                .await,
            Err(PaymentError::GatewayUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_receipt_is_derived_from_clock_and_student() {
        let (aggregator, gateway) =
            setup(vec![Course::new("c1", "Rust 101", Price(500)).published()]).await;
        aggregator
            .create_order_at(&UserId::from("student42"), &ids(&["c1"]), 1_718_000_123_456)
            .await
            .unwrap();
        let requests = gateway.requests().await;
        assert_eq!(requests[0].receipt.as_str(), "rcpt_8000123456_student42");
    }
}
