use super::enrollment::EnrollmentProcessor;
use super::notification::NotificationDispatcher;
use super::order::OrderAggregator;
use crate::domain::enrollment::EnrollmentReport;
use crate::domain::ids::{CourseId, UserId};
use crate::domain::money::MinorAmount;
use crate::domain::order::CheckoutOrder;
use crate::domain::ports::{
    CourseStoreRef, EnrollmentStoreRef, MailerRef, PaymentGatewayRef, StudentStoreRef,
};
use crate::domain::signature::{PaymentConfirmation, SignatureVerifier};
use crate::error::{PaymentError, Result};
use tracing::{info, warn};

/// Outcome of a verified payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub payment_id: String,
    pub order_id: String,
    pub report: EnrollmentReport,
}

/// Entry point of the purchase workflow used by the HTTP layer.
///
/// Owns the order aggregator, the signature verifier and the enrollment
/// processor, all constructed by the process entry point and injected here.
pub struct CheckoutService {
    orders: OrderAggregator,
    verifier: SignatureVerifier,
    enrollments: EnrollmentProcessor,
    notifications: NotificationDispatcher,
    students: StudentStoreRef,
}

impl CheckoutService {
    pub fn new(
        orders: OrderAggregator,
        verifier: SignatureVerifier,
        enrollments: EnrollmentProcessor,
        notifications: NotificationDispatcher,
        students: StudentStoreRef,
    ) -> Self {
        Self {
            orders,
            verifier,
            enrollments,
            notifications,
            students,
        }
    }

    /// Wires the workflow from storage and collaborator handles.
    pub fn assemble(
        courses: CourseStoreRef,
        students: StudentStoreRef,
        enrollments: EnrollmentStoreRef,
        gateway: PaymentGatewayRef,
        mailer: MailerRef,
        gateway_secret: &str,
        currency: &str,
    ) -> Self {
        let notifications = NotificationDispatcher::new(mailer);
        Self::new(
            OrderAggregator::new(courses, students.clone(), gateway, currency),
            SignatureVerifier::new(gateway_secret),
            EnrollmentProcessor::new(enrollments, notifications.clone()),
            notifications,
            students,
        )
    }

    /// Publishable gateway key for clients. Never the secret.
    pub fn public_key(&self) -> &str {
        self.orders.key_id()
    }

    pub async fn create_order(
        &self,
        student: &UserId,
        course_ids: &[CourseId],
    ) -> Result<CheckoutOrder> {
        self.orders.create_order(student, course_ids).await
    }

    /// Verifies the gateway confirmation and, only if it is genuine, enrolls
    /// the student in the listed courses.
    ///
    /// A bad or incomplete confirmation yields `SignatureMismatch` with no
    /// writes. Per-course enrollment failures are returned in the report.
    pub async fn verify_payment(
        &self,
        student: &UserId,
        confirmation: PaymentConfirmation,
    ) -> Result<VerifiedPayment> {
        if !self.verifier.check(&confirmation).is_valid() {
            warn!(%student, order_id = ?confirmation.order_id, "payment signature rejected");
            return Err(PaymentError::SignatureMismatch);
        }
        let PaymentConfirmation {
            order_id,
            payment_id,
            courses,
            ..
        } = confirmation;
        let (Some(order_id), Some(payment_id)) = (order_id, payment_id) else {
            return Err(PaymentError::SignatureMismatch);
        };
        if courses.is_empty() {
            return Err(PaymentError::ValidationError(
                "Please provide the purchased course ids".to_string(),
            ));
        }

        info!(%student, %order_id, %payment_id, "payment signature verified");
        let report = self.enrollments.enroll(student, &dedup(courses)).await;
        if !report.is_complete() {
            warn!(
                %student,
                %order_id,
                %payment_id,
                failed = ?report.failed_course_ids(),
                "payment captured but some courses were not enrolled"
            );
        }

        Ok(VerifiedPayment {
            payment_id,
            order_id,
            report,
        })
    }

    /// Sends the payment receipt email. Delivery problems are only logged.
    pub async fn send_payment_receipt(
        &self,
        student_id: &UserId,
        order_id: &str,
        payment_id: &str,
        amount: u64,
    ) -> Result<()> {
        if order_id.trim().is_empty() || payment_id.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Please provide all the details".to_string(),
            ));
        }
        let amount = MinorAmount::new(amount)?;
        let student = self
            .students
            .get(student_id)
            .await?
            .ok_or_else(|| PaymentError::StudentNotFound(student_id.clone()))?;

        self.notifications
            .payment_received(&student, amount, order_id, payment_id)
            .await;
        Ok(())
    }
}

/// Drops repeated ids while keeping the submitted order.
fn dedup(course_ids: Vec<CourseId>) -> Vec<CourseId> {
    let mut seen = std::collections::HashSet::new();
    course_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let ids = vec![
            CourseId::from("c2"),
            CourseId::from("c1"),
            CourseId::from("c2"),
        ];
        assert_eq!(dedup(ids), vec![CourseId::from("c2"), CourseId::from("c1")]);
    }
}
