use super::AppState;
use super::auth::AuthenticatedStudent;
use super::response::{ApiError, ok, ok_message};
use crate::application::checkout::VerifiedPayment;
use crate::domain::enrollment::{EnrolledCourse, FailedCourse};
use crate::domain::ids::CourseId;
use crate::domain::signature::PaymentConfirmation;
use crate::error::PaymentError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

type HandlerResult = Result<Response, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| PaymentError::ValidationError(e.body_text()).into())
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptureRequest {
    #[serde(default)]
    courses: Vec<CourseId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReceiptRequest {
    order_id: Option<String>,
    payment_id: Option<String>,
    amount: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    payment_id: String,
    order_id: String,
    enrolled_courses: Vec<EnrolledCourse>,
    failed_courses: Vec<FailedCourse>,
}

impl From<VerifiedPayment> for VerifyResponse {
    fn from(v: VerifiedPayment) -> Self {
        Self {
            payment_id: v.payment_id,
            order_id: v.order_id,
            enrolled_courses: v.report.enrolled,
            failed_courses: v.report.failed,
        }
    }
}

pub(crate) async fn capture_payment_handler(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    payload: Result<Json<CaptureRequest>, JsonRejection>,
) -> HandlerResult {
    let request = body(payload)?;
    let order = state
        .checkout
        .create_order(student.id(), &request.courses)
        .await?;
    Ok(ok(order))
}

pub(crate) async fn verify_payment_handler(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    payload: Result<Json<PaymentConfirmation>, JsonRejection>,
) -> HandlerResult {
    // A payload that does not parse is handled like a bad signature.
    let confirmation = payload
        .map(|Json(c)| c)
        .map_err(|_| ApiError(PaymentError::SignatureMismatch))?;
    let verified = state
        .checkout
        .verify_payment(student.id(), confirmation)
        .await?;
    Ok(ok(VerifyResponse::from(verified)))
}

pub(crate) async fn payment_success_email_handler(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    payload: Result<Json<ReceiptRequest>, JsonRejection>,
) -> HandlerResult {
    let request = body(payload)?;
    let (Some(order_id), Some(payment_id), Some(amount)) =
        (request.order_id, request.payment_id, request.amount)
    else {
        return Err(
            PaymentError::ValidationError("Please provide all the details".to_string()).into(),
        );
    };
    state
        .checkout
        .send_payment_receipt(student.id(), &order_id, &payment_id, amount)
        .await?;
    Ok(ok_message("Payment receipt queued"))
}

pub(crate) async fn gateway_key_handler(State(state): State<AppState>) -> Response {
    Json(json!({ "success": true, "key": state.checkout.public_key() })).into_response()
}

pub(crate) async fn healthz_handler() -> Response {
    ok_message("ok")
}
