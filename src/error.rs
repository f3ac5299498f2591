use crate::domain::ids::{CourseId, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid order amount: {0}")]
    InvalidAmount(u64),
    #[error("Could not find the course {0}")]
    CourseNotFound(CourseId),
    #[error("Could not find the student {0}")]
    StudentNotFound(UserId),
    #[error("Student is already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),
    #[error("Course {0} is not available for purchase")]
    NotPurchasable(CourseId),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Payment verification failed")]
    SignatureMismatch,
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("Notification failed: {0}")]
    NotificationFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of [`PaymentError`], used by the HTTP layer to pick
/// a status code and by callers to decide whether a failure is retriable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    AuthFailure,
    Upstream,
    Internal,
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) | Self::InvalidAmount(_) => ErrorKind::Validation,
            Self::CourseNotFound(_) | Self::StudentNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyEnrolled(_) | Self::NotPurchasable(_) => ErrorKind::Conflict,
            Self::Unauthorized(_) | Self::SignatureMismatch => ErrorKind::AuthFailure,
            Self::GatewayUnavailable(_) | Self::NotificationFailed(_) => ErrorKind::Upstream,
            _ => ErrorKind::Internal,
        }
    }

    #[cfg(feature = "storage-rocksdb")]
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(e: serde_json::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
