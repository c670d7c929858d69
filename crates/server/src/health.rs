use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::api::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state);
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "chairfit-server runtime initialized".to_string(),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(state: &AppState) -> HealthCheck {
    let dispatcher = state.dispatcher();
    match dispatcher.catalog().verify_rules(dispatcher.engine().rules()) {
        Ok(()) => HealthCheck {
            status: "ready",
            detail: format!(
                "{} categories loaded, every rule category resolved",
                dispatcher.catalog().len()
            ),
        },
        Err(error) => HealthCheck { status: "degraded", detail: error.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use chairfit_core::catalog::Catalog;
    use chairfit_gateway::{Collaborators, DispatchSettings, LeadDispatcher};

    use crate::api::AppState;
    use crate::health::health;

    const MESH_ONLY: &str = r#"
[[categories]]
id = "executive-mesh"
label = "Executive Mesh Chair"
description = "Mesh backrest"
"#;

    fn state(catalog: Catalog) -> AppState {
        let collaborators = Collaborators::default();
        AppState::new(LeadDispatcher::new(
            Arc::new(catalog),
            collaborators.messaging,
            collaborators.crm,
            collaborators.lead_store,
            DispatchSettings::default(),
        ))
    }

    #[tokio::test]
    async fn health_returns_ready_when_catalog_covers_the_rules() {
        let catalog = Catalog::builtin().expect("builtin catalog");

        let (status, Json(payload)) = health(State(state(catalog))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_rule_category_is_missing() {
        let catalog = Catalog::from_toml_str(MESH_ONLY).expect("catalog parses");

        let (status, Json(payload)) = health(State(state(catalog))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert!(payload.catalog.detail.contains("director-president"));
        assert_eq!(payload.service.status, "ready");
    }
}
