//! Outbound email. Every message the service sends goes through a `Mailer`.
//!
//! `ResendMailer` posts to the Resend HTTP API; `LogMailer` is used when no
//! API key is configured and only writes the message to the log.
//! Delivery is a single attempt with no retry.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

pub mod templates;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::Email(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryReceipt {
    /// Provider message id; `None` when the message was only logged.
    pub message_id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError>;
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: ResendResponse = response.json().await?;
        debug!("Email to {} accepted as {}", email.to, sent.id);
        Ok(DeliveryReceipt {
            message_id: Some(sent.id),
        })
    }
}

/// Writes messages to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
        info!(to = %email.to, subject = %email.subject, "Email delivery disabled; message logged");
        debug!("{}", email.html);
        Ok(DeliveryReceipt { message_id: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_has_no_message_id() {
        let receipt = LogMailer
            .send(&OutgoingEmail {
                to: "a@b.c".into(),
                subject: "s".into(),
                html: "<p>hi</p>".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt, DeliveryReceipt { message_id: None });
    }

    #[test]
    fn test_resend_payload_shape() {
        let v = serde_json::to_value(ResendRequest {
            from: "noreply@x.io",
            to: "s@x.io",
            subject: "Hi",
            html: "<b>x</b>",
        })
        .unwrap();
        assert_eq!(v["from"], "noreply@x.io");
        assert_eq!(v["to"], "s@x.io");
    }

    #[test]
    fn test_mail_error_maps_to_email_error() {
        let err: AppError = MailError::Api {
            status: 422,
            message: "bad sender".into(),
        }
        .into();
        assert!(matches!(err, AppError::Email(ref m) if m.contains("bad sender")));
    }
}
