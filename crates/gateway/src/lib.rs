pub mod crm;
pub mod dispatch;
pub mod error;
pub mod lead_store;
pub mod messaging;

use std::sync::Arc;

use chairfit_core::config::AppConfig;
use tracing::info;

pub use crm::{CrmClient, CrmLeadRef, HttpCrmClient, NoopCrmClient};
pub use dispatch::{DispatchError, DispatchOutcome, DispatchSettings, LeadDispatcher, StepStatus};
pub use error::GatewayError;
pub use lead_store::{HttpLeadStore, InMemoryLeadStore, LeadStore, LeadStoreReceipt, NoopLeadStore};
pub use messaging::{DeliveryReceipt, HttpMessagingGateway, MessagingGateway, NoopMessagingGateway};

/// The three outbound collaborators, with disabled ones replaced by no-ops.
#[derive(Clone)]
pub struct Collaborators {
    pub messaging: Arc<dyn MessagingGateway>,
    pub crm: Arc<dyn CrmClient>,
    pub lead_store: Arc<dyn LeadStore>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            messaging: Arc::new(NoopMessagingGateway),
            crm: Arc::new(NoopCrmClient),
            lead_store: Arc::new(NoopLeadStore),
        }
    }
}

impl Collaborators {
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let mut collaborators = Self::default();

        if config.messaging.enabled {
            collaborators.messaging = Arc::new(HttpMessagingGateway::from_config(&config.messaging)?);
        }
        if config.crm.enabled {
            collaborators.crm = Arc::new(HttpCrmClient::from_config(&config.crm)?);
        }
        if config.lead_store.enabled {
            collaborators.lead_store = Arc::new(HttpLeadStore::from_config(&config.lead_store)?);
        }

        info!(
            event_name = "gateway.collaborators_ready",
            messaging = config.messaging.enabled,
            crm = config.crm.enabled,
            lead_store = config.lead_store.enabled,
            "outbound collaborators configured"
        );
        Ok(collaborators)
    }
}
