use crate::config::GatewayConfig;
use crate::domain::order::{GatewayOrder, OrderRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a BTreeMap<String, String>,
}

/// REST client for a Razorpay-compatible orders API.
///
/// Authenticates with HTTP basic auth (`key_id:key_secret`). The client is
/// built once at startup and shared; reqwest pools connections internally.
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("gateway client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(name = "gateway_create_order", skip(self, request), fields(receipt = %request.receipt.as_str()))]
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder> {
        let body = CreateOrderBody {
            amount: request.amount.value(),
            currency: &request.currency,
            receipt: request.receipt.as_str(),
            notes: &request.notes,
        };
        let resp = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(format!("order request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            warn!(%status, %detail, "gateway rejected order");
            return Err(PaymentError::GatewayUnavailable(format!(
                "gateway returned status {status}"
            )));
        }

        let order: GatewayOrder = resp
            .json()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(format!("invalid order response: {e}")))?;
        debug!(order_id = %order.id, "gateway order created");
        Ok(order)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
