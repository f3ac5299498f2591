use crate::domain::enrollment::Enrollment;
use crate::domain::money::MinorAmount;
use crate::domain::ports::MailerRef;
use crate::domain::student::Student;
use tracing::{info, warn};

/// Sends transactional emails as a best-effort side effect.
///
/// Delivery failures are logged and swallowed; they never reach the
/// payment or enrollment result. The return value only reports whether the
/// mailer accepted the message.
#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: MailerRef,
}

impl NotificationDispatcher {
    pub fn new(mailer: MailerRef) -> Self {
        Self { mailer }
    }

    pub async fn enrollment_confirmed(&self, enrollment: &Enrollment) -> bool {
        let subject = format!("Successfully Enrolled into {}", enrollment.course_name);
        let body = templates::course_enrollment(&enrollment.course_name, &enrollment.student.name);
        self.dispatch(&enrollment.student.email, &subject, &body)
            .await
    }

    pub async fn payment_received(
        &self,
        student: &Student,
        amount: MinorAmount,
        order_id: &str,
        payment_id: &str,
    ) -> bool {
        let body = templates::payment_success(
            &student.display_name(),
            amount,
            order_id,
            payment_id,
        );
        self.dispatch(&student.email, "Payment Received", &body).await
    }

    async fn dispatch(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.mailer.send(to, subject, body).await {
            Ok(()) => {
                info!(%to, %subject, "notification sent");
                true
            }
            Err(e) => {
                warn!(%to, %subject, error = %e, "notification failed");
                false
            }
        }
    }
}

mod templates {
    use crate::domain::money::MinorAmount;

    pub(super) fn course_enrollment(course_name: &str, student_name: &str) -> String {
        format!(
            "<!DOCTYPE html><html><body>\
             <h2>Course Registration Confirmation</h2>\
             <p>Dear {student},</p>\
             <p>You have successfully registered for the course <strong>\"{course}\"</strong>. \
             Please log in to your dashboard to access the course materials and start learning.</p>\
             </body></html>",
            student = escape(student_name),
            course = escape(course_name),
        )
    }

    pub(super) fn payment_success(
        student_name: &str,
        amount: MinorAmount,
        order_id: &str,
        payment_id: &str,
    ) -> String {
        format!(
            "<!DOCTYPE html><html><body>\
             <h2>Course Payment Confirmation</h2>\
             <p>Dear {student},</p>\
             <p>We have received a payment of <strong>\u{20b9}{amount}</strong>.</p>\
             <p>Your Payment ID is <strong>{payment}</strong></p>\
             <p>Your Order ID is <strong>{order}</strong></p>\
             </body></html>",
            student = escape(student_name),
            amount = amount.to_major(),
            payment = escape(payment_id),
            order = escape(order_id),
        )
    }

    fn escape(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }

}
