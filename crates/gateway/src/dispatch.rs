//! Post-submission flow: validate, recommend, persist, register the CRM lead
//! and notify the customer and the sales team.

use std::sync::Arc;
use std::time::Duration;

use chairfit_core::catalog::Catalog;
use chairfit_core::config::AppConfig;
use chairfit_core::domain::lead::{ConsultationRecord, LeadId, LeadSubmission};
use chairfit_core::domain::recommendation::RecommendationSummary;
use chairfit_core::errors::{ApplicationError, DomainError};
use chairfit_core::messaging::{customer_message, team_summary, Branding};
use chairfit_core::recommendation::RecommendationEngine;
use chairfit_core::validation::{validate_submission, ValidationReport};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::crm::CrmClient;
use crate::lead_store::LeadStore;
use crate::messaging::MessagingGateway;

#[derive(Clone, Debug)]
pub struct DispatchSettings {
    pub team_number: Option<String>,
    /// Pause between the customer message and the team summary.
    pub message_interval: Duration,
    pub branding: Branding,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            team_number: None,
            message_interval: Duration::from_millis(1_500),
            branding: Branding::default(),
        }
    }
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            team_number: config
                .messaging
                .team_number
                .as_ref()
                .map(|number| number.trim().to_string())
                .filter(|number| !number.is_empty()),
            message_interval: Duration::from_millis(config.messaging.message_interval_ms),
            branding: config.contact.branding(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Completed {
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    Skipped,
    Failed {
        error: String,
    },
}

impl StepStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub lead_id: LeadId,
    pub primary: RecommendationSummary,
    pub recommendations: Vec<RecommendationSummary>,
    pub lead_store: StepStatus,
    pub crm: StepStatus,
    pub customer_message: StepStatus,
    pub team_summary: StepStatus,
}

impl DispatchOutcome {
    pub fn customer_notified(&self) -> bool {
        self.customer_message.is_completed()
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("lead submission is invalid: {0}")]
    Invalid(ValidationReport),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<DispatchError> for ApplicationError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Invalid(report) => report.into(),
            DispatchError::Domain(error) => error.into(),
        }
    }
}

pub struct LeadDispatcher {
    catalog: Arc<Catalog>,
    engine: RecommendationEngine,
    messaging: Arc<dyn MessagingGateway>,
    crm: Arc<dyn CrmClient>,
    store: Arc<dyn LeadStore>,
    settings: DispatchSettings,
}

impl LeadDispatcher {
    pub fn new(
        catalog: Arc<Catalog>,
        messaging: Arc<dyn MessagingGateway>,
        crm: Arc<dyn CrmClient>,
        store: Arc<dyn LeadStore>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            catalog,
            engine: RecommendationEngine::new(),
            messaging,
            crm,
            store,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Collaborator failures after validation are recorded in the outcome and
    /// never abort the flow. Nothing is retried.
    pub async fn submit(
        &self,
        submission: &LeadSubmission,
    ) -> Result<DispatchOutcome, DispatchError> {
        validate_submission(submission).map_err(DispatchError::Invalid)?;

        let lead_id = LeadId::generate();
        let recommendations = self.engine.generate(&submission.profile, &self.catalog)?;
        let primary = recommendations.primary();
        info!(
            event_name = "lead.recommended",
            lead_id = %lead_id,
            primary = %primary.category_id(),
            count = recommendations.len(),
            "recommendations generated for lead"
        );

        let record =
            ConsultationRecord::new(lead_id.clone(), submission, &recommendations, Utc::now());
        let lead_store = match self.store.save(&record).await {
            Ok(receipt) => StepStatus::Completed { reference: receipt.id },
            Err(error) => {
                warn!(
                    event_name = "lead.store_failed",
                    lead_id = %lead_id,
                    error = %error,
                    remote = error.is_remote(),
                    "could not persist consultation"
                );
                StepStatus::Failed { error: error.to_string() }
            }
        };

        let crm = match self.crm.create_lead(&submission.contact).await {
            Ok(lead) => StepStatus::Completed { reference: lead.id.map(|id| id.to_string()) },
            Err(error) => {
                warn!(
                    event_name = "lead.crm_failed",
                    lead_id = %lead_id,
                    error = %error,
                    remote = error.is_remote(),
                    "could not create crm lead"
                );
                StepStatus::Failed { error: error.to_string() }
            }
        };

        let text = customer_message(&submission.contact, primary, &self.settings.branding);
        let delivery = self.messaging.send_text(&submission.contact.phone, &text).await;
        let customer_step = match delivery {
            Ok(receipt) => StepStatus::Completed { reference: receipt.message_id },
            Err(error) => {
                warn!(
                    event_name = "lead.customer_message_failed",
                    lead_id = %lead_id,
                    error = %error,
                    remote = error.is_remote(),
                    "could not message customer"
                );
                StepStatus::Failed { error: error.to_string() }
            }
        };

        let team_step = match &self.settings.team_number {
            None => StepStatus::Skipped,
            Some(team_number) => {
                if !self.settings.message_interval.is_zero() {
                    tokio::time::sleep(self.settings.message_interval).await;
                }
                let summary = team_summary(
                    &submission.contact,
                    &submission.profile,
                    &recommendations,
                    &self.settings.branding,
                );
                match self.messaging.send_text(team_number, &summary).await {
                    Ok(receipt) => StepStatus::Completed { reference: receipt.message_id },
                    Err(error) => {
                        warn!(
                            event_name = "lead.team_summary_failed",
                            lead_id = %lead_id,
                            error = %error,
                            remote = error.is_remote(),
                            "could not notify sales team"
                        );
                        StepStatus::Failed { error: error.to_string() }
                    }
                }
            }
        };

        let outcome = DispatchOutcome {
            lead_id,
            primary: RecommendationSummary::from(primary),
            recommendations: recommendations.iter().map(RecommendationSummary::from).collect(),
            lead_store,
            crm,
            customer_message: customer_step,
            team_summary: team_step,
        };
        info!(
            event_name = "lead.dispatched",
            lead_id = %outcome.lead_id,
            customer_notified = outcome.customer_notified(),
            "lead dispatch finished"
        );
        Ok(outcome)
    }
}
