//! WhatsApp delivery through the messaging gateway's REST API.

use std::time::Duration;

use async_trait::async_trait;
use chairfit_core::config::MessagingConfig;
use chairfit_core::phone::normalize_whatsapp_number;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{send_expecting_success, GatewayError};

const SERVICE: &str = "messaging";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Normalized number the gateway was asked to deliver to.
    pub number: String,
    pub message_id: Option<String>,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, number: &str, message: &str)
        -> Result<DeliveryReceipt, GatewayError>;
    async fn check_connection(&self) -> Result<(), GatewayError>;
}

#[derive(Default)]
pub struct NoopMessagingGateway;

#[async_trait]
impl MessagingGateway for NoopMessagingGateway {
    async fn send_text(
        &self,
        number: &str,
        _message: &str,
    ) -> Result<DeliveryReceipt, GatewayError> {
        Ok(DeliveryReceipt { number: normalize_whatsapp_number(number), message_id: None })
    }

    async fn check_connection(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

pub struct HttpMessagingGateway {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl HttpMessagingGateway {
    pub fn new(
        base_url: impl Into<String>,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::transport(SERVICE, error))?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), token })
    }

    pub fn from_config(config: &MessagingConfig) -> Result<Self, GatewayError> {
        let token = config.api_token.clone().ok_or_else(|| GatewayError::NotConfigured {
            service: SERVICE,
            detail: "messaging.api_token is missing".to_string(),
        })?;
        Self::new(config.base_url.clone(), token, Duration::from_secs(config.timeout_secs))
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, GatewayError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(event_name = "messaging.request", url = %url, "posting to messaging gateway");

        let request = self.client.post(&url).bearer_auth(self.token.expose_secret()).json(body);
        let (_, text) = send_expecting_success(SERVICE, request).await?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|error| GatewayError::Decode { service: SERVICE, message: error.to_string() })
    }
}

#[async_trait]
impl MessagingGateway for HttpMessagingGateway {
    async fn send_text(
        &self,
        number: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, GatewayError> {
        let normalized = normalize_whatsapp_number(number);
        if normalized.is_empty() {
            return Err(GatewayError::InvalidNumber(number.to_string()));
        }

        let payload = json!({ "number": normalized, "message": message });
        let body = self.post("/sendMessage", &payload).await?;
        let message_id = message_id(&body);

        info!(
            event_name = "messaging.sent",
            number = %normalized,
            message_id = message_id.as_deref().unwrap_or("-"),
            "whatsapp message accepted by gateway"
        );
        Ok(DeliveryReceipt { number: normalized, message_id })
    }

    async fn check_connection(&self) -> Result<(), GatewayError> {
        self.post("/health", &json!({})).await.map(|_| ())
    }
}

fn message_id(body: &Value) -> Option<String> {
    let candidates = [body.get("id"), body.get("messageId"), body.pointer("/data/id")];
    candidates.into_iter().flatten().find_map(|value| match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
