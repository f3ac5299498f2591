//! HTTP API of the payment service.
//!
//! | method | path | auth |
//! |---|---|---|
//! | `POST` | `/api/v1/payment/capturePayment` | student bearer |
//! | `POST` | `/api/v1/payment/verifyPayment` | student bearer |
//! | `POST` | `/api/v1/payment/sendPaymentSuccessEmail` | student bearer |
//! | `GET` | `/api/v1/payment/key` | none |
//! | `GET` | `/healthz` | none |

pub mod auth;
mod handlers;
mod response;

use crate::application::checkout::CheckoutService;
use auth::TokenKeys;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use response::ApiError;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(checkout: CheckoutService, tokens: TokenKeys) -> Self {
        Self {
            checkout: Arc::new(checkout),
            tokens,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let payment = Router::new()
        .route("/key", get(handlers::gateway_key_handler))
        .route("/capturePayment", post(handlers::capture_payment_handler))
        .route("/verifyPayment", post(handlers::verify_payment_handler))
        .route(
            "/sendPaymentSuccessEmail",
            post(handlers::payment_success_email_handler),
        );

    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .nest("/api/v1/payment", payment)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
