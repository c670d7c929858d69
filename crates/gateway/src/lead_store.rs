use std::time::Duration;

use async_trait::async_trait;
use chairfit_core::config::LeadStoreConfig;
use chairfit_core::domain::lead::ConsultationRecord;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{send_expecting_success, GatewayError};

const SERVICE: &str = "lead_store";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadStoreReceipt {
    pub id: Option<String>,
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save(&self, record: &ConsultationRecord) -> Result<LeadStoreReceipt, GatewayError>;
}

#[derive(Default)]
pub struct NoopLeadStore;

#[async_trait]
impl LeadStore for NoopLeadStore {
    async fn save(&self, _record: &ConsultationRecord) -> Result<LeadStoreReceipt, GatewayError> {
        Ok(LeadStoreReceipt { id: None })
    }
}

#[derive(Default)]
pub struct InMemoryLeadStore {
    records: Mutex<Vec<ConsultationRecord>>,
}

impl InMemoryLeadStore {
    pub async fn records(&self) -> Vec<ConsultationRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn save(&self, record: &ConsultationRecord) -> Result<LeadStoreReceipt, GatewayError> {
        self.records.lock().await.push(record.clone());
        Ok(LeadStoreReceipt { id: Some(record.lead_id.to_string()) })
    }
}

/// Posts consultation records to the persistence function endpoint.
pub struct HttpLeadStore {
    client: Client,
    url: String,
    service_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpLeadStore {
    pub fn new(
        url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::transport(SERVICE, error))?;
        Ok(Self { client, url: url.into(), service_key })
    }

    pub fn from_config(config: &LeadStoreConfig) -> Result<Self, GatewayError> {
        let url = config.url.clone().ok_or_else(|| GatewayError::NotConfigured {
            service: SERVICE,
            detail: "lead_store.url is missing".to_string(),
        })?;
        let service_key = config.service_key.clone().ok_or_else(|| {
            GatewayError::NotConfigured {
                service: SERVICE,
                detail: "lead_store.service_key is missing".to_string(),
            }
        })?;
        Self::new(url, service_key, Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl LeadStore for HttpLeadStore {
    async fn save(&self, record: &ConsultationRecord) -> Result<LeadStoreReceipt, GatewayError> {
        let request =
            self.client.post(&self.url).bearer_auth(self.service_key.expose_secret()).json(record);
        let (status, text) = send_expecting_success(SERVICE, request).await?;

        let decoded: SaveResponse = serde_json::from_str(&text)
            .map_err(|error| GatewayError::Decode { service: SERVICE, message: error.to_string() })?;
        if !decoded.success {
            return Err(GatewayError::Rejected {
                service: SERVICE,
                status,
                message: decoded.error.unwrap_or_else(|| "success flag was false".to_string()),
            });
        }

        let id = decoded.id.and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });
        info!(
            event_name = "lead_store.saved",
            lead_id = %record.lead_id,
            stored_id = id.as_deref().unwrap_or("-"),
            "consultation record stored"
        );
        Ok(LeadStoreReceipt { id })
    }
}
