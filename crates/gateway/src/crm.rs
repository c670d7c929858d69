//! Lead creation in the sales CRM (Kommo v4 leads API).

use std::time::Duration;

use async_trait::async_trait;
use chairfit_core::config::CrmConfig;
use chairfit_core::domain::lead::LeadContact;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{send_expecting_success, GatewayError};

const SERVICE: &str = "crm";
pub const LEAD_NAME_PREFIX: &str = "Lead ChairFit - ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmLeadRef {
    pub id: Option<i64>,
}

#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn create_lead(&self, contact: &LeadContact) -> Result<CrmLeadRef, GatewayError>;
}

#[derive(Default)]
pub struct NoopCrmClient;

#[async_trait]
impl CrmClient for NoopCrmClient {
    async fn create_lead(&self, _contact: &LeadContact) -> Result<CrmLeadRef, GatewayError> {
        Ok(CrmLeadRef { id: None })
    }
}

pub struct HttpCrmClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl HttpCrmClient {
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

    pub fn from_config(config: &CrmConfig) -> Result<Self, GatewayError> {
        let base_url = config.base_url.clone().ok_or_else(|| GatewayError::NotConfigured {
            service: SERVICE,
            detail: "crm.base_url is missing".to_string(),
        })?;
        let token = config.access_token.clone().ok_or_else(|| GatewayError::NotConfigured {
            service: SERVICE,
            detail: "crm.access_token is missing".to_string(),
        })?;
        Self::new(base_url, token, Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl CrmClient for HttpCrmClient {
    async fn create_lead(&self, contact: &LeadContact) -> Result<CrmLeadRef, GatewayError> {
        let name = contact.name.trim();
        if name.is_empty() {
            return Err(GatewayError::Rejected {
                service: SERVICE,
                status: 400,
                message: "lead name is required".to_string(),
            });
        }

        let payload = lead_payload(name);
        let request = self
            .client
            .post(format!("{}/api/v4/leads", self.base_url))
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload);
        let (_, text) = send_expecting_success(SERVICE, request).await?;

        // The CRM answers with HAL; an unparseable body still means the lead exists.
        let id = serde_json::from_str::<Value>(&text).ok().as_ref().and_then(first_lead_id);
        info!(
            event_name = "crm.lead_created",
            crm_lead_id = id.unwrap_or_default(),
            "crm lead created"
        );
        Ok(CrmLeadRef { id })
    }
}

pub(crate) fn lead_payload(name: &str) -> Value {
    json!([{ "name": format!("{LEAD_NAME_PREFIX}{name}") }])
}

fn first_lead_id(body: &Value) -> Option<i64> {
    body.pointer("/_embedded/leads/0/id").and_then(Value::as_i64)
}
