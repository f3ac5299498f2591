use super::ids::{CourseId, UserId};
use super::money::{MinorAmount, Price};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gateway-imposed upper bound on the receipt length.
pub const MAX_RECEIPT_LEN: usize = 40;

const RECEIPT_PREFIX: &str = "rcpt_";
const TIMESTAMP_DIGITS: usize = 10;
const STUDENT_SUFFIX_CHARS: usize = 12;

/// Caller-supplied reconciliation token attached to a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    /// Builds `rcpt_<millis suffix>_<student suffix>`.
    ///
    /// Only the trailing digits of the timestamp and the trailing alphanumeric
    /// characters of the student id are kept, which keeps the token well
    /// under [`MAX_RECEIPT_LEN`] whatever the id format.
    pub fn derive(unix_millis: u128, student: &UserId) -> Self {
        let millis = unix_millis.to_string();
        let ts = &millis[millis.len().saturating_sub(TIMESTAMP_DIGITS)..];

        let alnum: Vec<char> = student
            .as_str()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        let tail: String = alnum[alnum.len().saturating_sub(STUDENT_SUFFIX_CHARS)..]
            .iter()
            .collect();

        Self(format!("{RECEIPT_PREFIX}{ts}_{tail}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order creation request sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub amount: MinorAmount,
    pub currency: String,
    pub receipt: Receipt,
    pub notes: BTreeMap<String, String>,
}

impl OrderRequest {
    pub fn new(
        amount: MinorAmount,
        currency: impl Into<String>,
        receipt: Receipt,
        student: &UserId,
        courses: &[CourseId],
    ) -> Self {
        let mut notes = BTreeMap::new();
        notes.insert("studentId".to_string(), student.to_string());
        notes.insert(
            "courses".to_string(),
            courses
                .iter()
                .map(CourseId::as_str)
                .collect::<Vec<_>>()
                .join(","),
        );
        Self {
            amount,
            currency: currency.into(),
            receipt,
            notes,
        }
    }
}

/// Order as acknowledged by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// One validated line of a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseLine {
    pub id: CourseId,
    pub name: String,
    pub price: Price,
}

/// Everything a client needs to open the gateway checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub key: String,
    pub courses: Vec<CourseLine>,
    pub total_amount: Price,
}
