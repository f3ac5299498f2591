use super::ids::{CourseId, UserId};
use super::money::Price;
use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

/// A course as seen by the checkout flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub price: Price,
    pub status: CourseStatus,
    pub instructor: UserId,
    /// Students enrolled in the course. Membership is unique per student.
    #[serde(default)]
    pub students_enrolled: BTreeSet<UserId>,
}

impl Course {
    pub fn new(id: impl Into<CourseId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            status: CourseStatus::Draft,
            instructor: UserId::from(""),
            students_enrolled: BTreeSet::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.status = CourseStatus::Published;
        self
    }

    pub fn is_enrolled(&self, student: &UserId) -> bool {
        self.students_enrolled.contains(student)
    }

    /// Checks that `student` may buy this course.
    pub fn ensure_purchasable_by(&self, student: &UserId) -> Result<(), PaymentError> {
        if self.is_enrolled(student) {
            return Err(PaymentError::AlreadyEnrolled(self.id.clone()));
        }
        if self.status != CourseStatus::Published {
            return Err(PaymentError::NotPurchasable(self.id.clone()));
        }
        Ok(())
    }

    /// Adds the student to the enrolled set. Returns `false` if already present.
    pub fn enroll(&mut self, student: &UserId) -> bool {
        self.students_enrolled.insert(student.clone())
    }
}
