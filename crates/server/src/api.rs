//! JSON routes for the questionnaire front end.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chairfit_core::domain::category::ProductCategory;
use chairfit_core::domain::lead::LeadSubmission;
use chairfit_core::domain::profile::UserProfile;
use chairfit_core::domain::recommendation::RecommendationSummary;
use chairfit_core::errors::{ApplicationError, InterfaceError};
use chairfit_core::validation::FieldError;
use chairfit_gateway::{DispatchError, DispatchOutcome, LeadDispatcher};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::health::health;

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<LeadDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: LeadDispatcher) -> Self {
        Self { dispatcher: Arc::new(dispatcher) }
    }

    pub fn dispatcher(&self) -> &LeadDispatcher {
        &self.dispatcher
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/recommendations", post(recommendations))
        .route("/api/leads", post(submit_lead))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse<'a> {
    pub categories: &'a [ProductCategory],
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub correlation_id: String,
    pub primary: RecommendationSummary,
    pub recommendations: Vec<RecommendationSummary>,
}

#[derive(Debug, Serialize)]
pub struct LeadResponse {
    pub correlation_id: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

pub struct ApiError {
    interface: InterfaceError,
    field_errors: Vec<FieldError>,
}

impl ApiError {
    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self { interface: error.into_interface(correlation_id), field_errors: Vec::new() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.interface {
            InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            InterfaceError::ServiceUnavailable { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            }
            // Internal details stay in the logs.
            InterfaceError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.interface.user_message().to_string())
            }
        };

        let body = ErrorBody {
            error: self.interface.user_message(),
            message,
            correlation_id: self.interface.correlation_id().to_string(),
            field_errors: self.field_errors,
        };
        (status, Json(body)).into_response()
    }
}

async fn catalog(State(state): State<AppState>) -> Response {
    let categories = state.dispatcher().catalog().categories();
    Json(CatalogResponse { categories }).into_response()
}

async fn recommendations(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let dispatcher = state.dispatcher();

    let set = dispatcher.engine().generate(&profile, dispatcher.catalog()).map_err(|domain| {
        error!(
            event_name = "api.recommendations.failed",
            correlation_id = %correlation_id,
            error = %domain,
            "recommendation engine failed"
        );
        ApiError::from_application(domain.into(), &correlation_id)
    })?;

    info!(
        event_name = "api.recommendations.generated",
        correlation_id = %correlation_id,
        primary = %set.primary().category_id(),
        count = set.len(),
        profile_recognized = profile.postural_profile.is_recognized(),
        "recommendations generated"
    );

    Ok(Json(RecommendationResponse {
        primary: RecommendationSummary::from(set.primary()),
        recommendations: set.iter().map(RecommendationSummary::from).collect(),
        correlation_id,
    }))
}

async fn submit_lead(
    State(state): State<AppState>,
    Json(submission): Json<LeadSubmission>,
) -> Result<Json<LeadResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    match state.dispatcher().submit(&submission).await {
        Ok(outcome) => Ok(Json(LeadResponse { correlation_id, outcome })),
        Err(DispatchError::Invalid(report)) => {
            info!(
                event_name = "api.leads.rejected",
                correlation_id = %correlation_id,
                field_count = report.errors.len(),
                "lead submission failed validation"
            );
            let field_errors = report.errors.clone();
            let mut api_error =
                ApiError::from_application(ApplicationError::from(report), &correlation_id);
            api_error.field_errors = field_errors;
            Err(api_error)
        }
        Err(other) => {
            error!(
                event_name = "api.leads.failed",
                correlation_id = %correlation_id,
                error = %other,
                "lead dispatch failed"
            );
            Err(ApiError::from_application(other.into(), &correlation_id))
        }
    }
}
