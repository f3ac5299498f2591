#![allow(dead_code)]

use coursepay::application::checkout::CheckoutService;
use coursepay::domain::course::Course;
use coursepay::domain::ids::{CourseId, UserId};
use coursepay::domain::money::Price;
use coursepay::domain::ports::{CourseStore, StudentStore};
use coursepay::domain::signature::{PaymentConfirmation, sign};
use coursepay::domain::student::Student;
use coursepay::infrastructure::in_memory::{InMemoryCatalog, InMemoryGateway, InMemoryMailer};
use std::sync::Arc;

pub const SECRET: &str = "test_gateway_secret";
pub const KEY_ID: &str = "rzp_test_key";
pub const JWT_SECRET: &str = "test_jwt_secret";

/// A checkout wired to in-process stores, gateway and outbox.
pub struct Harness {
    pub catalog: InMemoryCatalog,
    pub gateway: InMemoryGateway,
    pub mailer: InMemoryMailer,
    pub checkout: CheckoutService,
}

/// Catalog with students `u1`, `u2` and published courses `c1` (500) and
/// `c2` (1500), plus the draft course `c3`.
pub async fn harness() -> Harness {
    let catalog = InMemoryCatalog::new();
    CourseStore::store(
        &catalog,
        Course::new("c1", "Rust Fundamentals", Price(500)).published(),
    )
    .await
    .unwrap();
    CourseStore::store(
        &catalog,
        Course::new("c2", "Async Rust in Production", Price(1500)).published(),
    )
    .await
    .unwrap();
    CourseStore::store(&catalog, Course::new("c3", "Unreleased Workshop", Price(900)))
        .await
        .unwrap();
    StudentStore::store(&catalog, Student::new("u1", "asha@example.com", "Asha", "Rao"))
        .await
        .unwrap();
    StudentStore::store(&catalog, Student::new("u2", "dev@example.com", "Dev", "Mehta"))
        .await
        .unwrap();

    let gateway = InMemoryGateway::new(KEY_ID);
    let mailer = InMemoryMailer::new();
    let checkout = CheckoutService::assemble(
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(gateway.clone()),
        Arc::new(mailer.clone()),
        SECRET,
        "INR",
    );

    Harness {
        catalog,
        gateway,
        mailer,
        checkout,
    }
}

pub fn ids(raw: &[&str]) -> Vec<CourseId> {
    raw.iter().map(|id| CourseId::from(*id)).collect()
}

pub fn student(id: &str) -> UserId {
    UserId::from(id)
}

/// A confirmation signed the way the gateway signs it.
pub fn signed_confirmation(order_id: &str, payment_id: &str, courses: &[&str]) -> PaymentConfirmation {
    PaymentConfirmation {
        order_id: Some(order_id.to_string()),
        payment_id: Some(payment_id.to_string()),
        signature: sign(order_id, payment_id, SECRET),
        courses: ids(courses),
    }
}
