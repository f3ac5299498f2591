use crate::config::MailConfig;
use crate::domain::ports::Mailer;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct MailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivers mail through a JSON HTTP API (`POST {url}` with a bearer token).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("mail client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let mut req = self.client.post(&self.config.url).json(&MailBody {
            from: &self.config.from,
            to,
            subject,
            html,
        });
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| PaymentError::NotificationFailed(format!("mail request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PaymentError::NotificationFailed(format!(
                "mail api returned status {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Mailer used when no mail API is configured: logs instead of sending.
#[derive(Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<()> {
        info!(%to, %subject, "mail delivery disabled, message logged only");
        Ok(())
    }
}
